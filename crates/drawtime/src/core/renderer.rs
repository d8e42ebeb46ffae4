//! Core renderer trait for diagram output
//!
//! This trait defines the interface for rendering a diagram model into an
//! output format (PNG, SVG, a recorded display list).

use super::RenderError;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use drawtime::core::Renderer;
/// use drawtime::timing::{CommandRenderer, TimingDiagram};
///
/// let diagram: TimingDiagram = drawtime::parse("bus D:\n  start = \"idle\"\n").unwrap();
/// let renderer = CommandRenderer::new();
/// let commands = renderer.render(&diagram).unwrap();
/// assert!(!commands.is_empty());
/// ```
pub trait Renderer<D>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram into the output format
    fn render(&self, diagram: &D) -> Result<Self::Output, RenderError>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
