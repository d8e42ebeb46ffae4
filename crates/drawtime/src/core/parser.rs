//! Core parser trait for diagram descriptions
//!
//! A parser turns description text into an immutable diagram model in one
//! pass. It either returns the complete model or the first syntax error.

use super::SyntaxError;

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use drawtime::core::Parser;
/// use drawtime::timing::TimingParser;
///
/// let parser = TimingParser::new();
/// let diagram = parser.parse("line A:\n  start = 0\n").unwrap();
/// assert_eq!(diagram.signals().len(), 1);
/// ```
pub trait Parser: Send + Sync {
    /// The model produced by this parser
    type Output;

    /// Parse description text into a model
    fn parse(&self, input: &str) -> Result<Self::Output, SyntaxError>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;
}
