//! DrawTime - Timing diagrams from plain text
//!
//! A library for parsing a small block language describing digital signals
//! (lines, buses and clocks) and drawing it as a timing diagram.
//!
//! # Quick Start
//!
//! ```rust
//! use drawtime::{render_with_fonts, FontLibrary};
//!
//! let input = "time:\n  end = 10\nline A:\n  start = 0\n  2 -> 1\n  6 -> 0\n";
//! let image = render_with_fonts(input, FontLibrary::fixed()).unwrap();
//! assert_eq!(image.dimensions(), (800, 600));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use drawtime::prelude::*;
//!
//! let input = "bus D:\n  start = 'idle'\n  20 -> \"busy\"\n";
//!
//! // Parse into a diagram model
//! let parser = TimingParser::new();
//! let diagram = parser.parse(input).unwrap();
//! assert_eq!(diagram.signals()[0].kind(), SignalKind::Bus);
//!
//! // Draw onto any surface
//! let mut canvas = RecordingCanvas::new();
//! render_onto(&diagram, &mut canvas).unwrap();
//! assert!(canvas.texts().any(|(_, text)| text == "busy"));
//! ```

pub mod core;
pub mod timing;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;
pub use image::RgbaImage;
pub use timing::render_onto;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Color, FontLibrary, FontSpec, Parser, RecordingCanvas, RenderError, Renderer, Surface,
        SyntaxError, SyntaxErrorKind, TextMetrics,
    };
    pub use crate::timing::{
        render_onto, Bus, BusValue, Changes, Clock, CommandRenderer, Line, LineValue,
        RasterRenderer, Signal, SignalKind, Style, SvgRenderer, Timeline, TimingDiagram,
        TimingParser,
    };
}

/// Parse a timing description into a diagram model
///
/// Fails with the first offending line.
///
/// # Example
/// ```rust
/// use drawtime::{parse, SyntaxErrorKind};
///
/// let diagram = parse("line A:\n  start = 1\n").unwrap();
/// assert_eq!(diagram.signals()[0].name(), "A");
///
/// let error = parse("clock:\n0->1\n").unwrap_err();
/// assert_eq!(error.kind, SyntaxErrorKind::ClockChange);
/// assert_eq!(error.line_number, 2);
/// ```
pub fn parse(input: &str) -> Result<timing::TimingDiagram, SyntaxError> {
    use crate::core::Parser as _;

    timing::TimingParser::new().parse(input)
}

/// Render a timing description to an RGBA image using the system fonts
///
/// This is the simplest way to turn a description into pixels. Fonts are
/// looked up on every call; keep a [`timing::RasterRenderer`] around to
/// render many diagrams.
///
/// # Returns
/// * `Ok(RgbaImage)` - The diagram, `width` x `height` pixels
/// * `Err` - If parsing or rendering fails
#[cfg(not(target_arch = "wasm32"))]
pub fn render(input: &str) -> anyhow::Result<RgbaImage> {
    render_with_fonts(input, FontLibrary::system())
}

/// Render a timing description to an RGBA image using the given fonts
pub fn render_with_fonts(input: &str, fonts: FontLibrary) -> anyhow::Result<RgbaImage> {
    use crate::core::Renderer as _;

    let diagram = parse(input)?;
    let image = timing::RasterRenderer::with_fonts(fonts).render(&diagram)?;
    Ok(image)
}

/// Render a timing description to a standalone SVG document
///
/// # Example
/// ```rust
/// let svg = drawtime::render_svg("line A:\n  start = 0\n").unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
pub fn render_svg(input: &str) -> anyhow::Result<String> {
    use crate::core::Renderer as _;

    let diagram = parse(input)?;
    let svg = timing::SvgRenderer::new().render(&diagram)?;
    Ok(svg)
}
