//! Output renderers
//!
//! Each renderer owns a [`FontLibrary`], runs [`render_onto`] against one
//! surface backend and hands back what that backend produced.

use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use super::model::TimingDiagram;
use super::renderer::render_onto;
use crate::core::{
    DrawCommand, FontLibrary, RasterSurface, RecordingCanvas, RenderError, Renderer, SvgSurface,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fonts used when the caller does not choose any
fn default_fonts() -> FontLibrary {
    #[cfg(not(target_arch = "wasm32"))]
    {
        FontLibrary::system()
    }
    #[cfg(target_arch = "wasm32")]
    {
        FontLibrary::fixed()
    }
}

/// Renders diagrams into RGBA pixel buffers
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    fonts: FontLibrary,
}

impl RasterRenderer {
    /// Renderer using the system fonts
    pub fn new() -> Self {
        Self::with_fonts(default_fonts())
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self { fonts }
    }

    fn draw(&self, diagram: &TimingDiagram) -> Result<RasterSurface, RenderError> {
        let mut surface = RasterSurface::new(self.fonts.clone());
        render_onto(diagram, &mut surface)?;
        Ok(surface)
    }

    /// Render straight to PNG bytes
    pub fn render_png(&self, diagram: &TimingDiagram) -> Result<Vec<u8>, RenderError> {
        let bytes = self.draw(diagram)?.to_png()?;
        debug!(byte_count = bytes.len(), "Encoded PNG");
        Ok(bytes)
    }

    /// Render and write an image file; the format follows the extension
    pub fn save(&self, diagram: &TimingDiagram, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        self.draw(diagram)?.save(path)?;
        debug!(path = %path.display(), "Saved diagram image");
        Ok(())
    }
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<TimingDiagram> for RasterRenderer {
    type Output = RgbaImage;

    fn render(&self, diagram: &TimingDiagram) -> Result<RgbaImage, RenderError> {
        self.draw(diagram)?
            .into_image()
            .ok_or_else(|| RenderError::surface("no image was produced"))
    }

    fn name(&self) -> &'static str {
        "raster"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn format(&self) -> &'static str {
        "png"
    }
}

/// Renders diagrams into standalone SVG documents
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    fonts: FontLibrary,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::with_fonts(default_fonts())
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self { fonts }
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<TimingDiagram> for SvgRenderer {
    type Output = String;

    fn render(&self, diagram: &TimingDiagram) -> Result<String, RenderError> {
        let mut surface = SvgSurface::new(self.fonts.clone());
        render_onto(diagram, &mut surface)?;
        surface
            .into_document()
            .ok_or_else(|| RenderError::surface("no document was produced"))
    }

    fn name(&self) -> &'static str {
        "svg"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn format(&self) -> &'static str {
        "svg"
    }
}

/// Records the drawing commands of a render
///
/// Uses fixed font metrics unless given a library, so its output does not
/// depend on the fonts installed.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    fonts: FontLibrary,
}

impl CommandRenderer {
    pub fn new() -> Self {
        Self::with_fonts(FontLibrary::fixed())
    }

    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self { fonts }
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<TimingDiagram> for CommandRenderer {
    type Output = Vec<DrawCommand>;

    fn render(&self, diagram: &TimingDiagram) -> Result<Vec<DrawCommand>, RenderError> {
        let mut canvas = RecordingCanvas::with_fonts(self.fonts.clone());
        render_onto(diagram, &mut canvas)?;
        Ok(canvas.into_commands())
    }

    fn name(&self) -> &'static str {
        "commands"
    }

    fn version(&self) -> &'static str {
        VERSION
    }

    fn format(&self) -> &'static str {
        "json"
    }
}
