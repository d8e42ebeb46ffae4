//! Recording canvas shared by tests and tooling
//!
//! [`RecordingCanvas`] keeps every drawing command as a [`DrawCommand`]
//! instead of painting pixels. It answers text metrics from a resolved
//! [`Font`], so layouts match the raster output when both are given the
//! same [`FontLibrary`].

use serde::Serialize;

use super::{
    Color, Font, FontLibrary, FontSpec, Point, Rect, RenderError, Stroke, Surface, TextMetrics,
};

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Begin {
        width: u32,
        height: u32,
        font: FontSpec,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Text {
        origin: Point,
        text: String,
        color: Color,
    },
    End,
}

/// A display list surface
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    fonts: FontLibrary,
    font: Font,
    commands: Vec<DrawCommand>,
    open: bool,
}

impl RecordingCanvas {
    /// Create a canvas measuring text with fixed metrics
    pub fn new() -> Self {
        Self::with_fonts(FontLibrary::fixed())
    }

    /// Create a canvas measuring text with fonts from `fonts`
    pub fn with_fonts(fonts: FontLibrary) -> Self {
        let font = fonts.resolve(&FontSpec::new("serif", 12));
        Self {
            fonts,
            font,
            commands: Vec::new(),
            open: false,
        }
    }

    /// Everything recorded by the last pass
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Recorded line segments as `(from, to, stroke)`
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, Stroke)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, stroke } => Some((*from, *to, *stroke)),
            _ => None,
        })
    }

    /// Recorded polygons as `(points, fill)`
    pub fn polygons(&self) -> impl Iterator<Item = (&[Point], Color)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Polygon { points, color } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }

    /// Recorded text runs as `(origin, text)`
    pub fn texts(&self) -> impl Iterator<Item = (Point, &str)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { origin, text, .. } => Some((*origin, text.as_str())),
            _ => None,
        })
    }

    fn record(&mut self, command: DrawCommand) {
        if self.open {
            self.commands.push(command);
        }
    }
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMetrics for RecordingCanvas {
    fn text_width(&self, text: &str) -> f64 {
        self.font.text_width(text)
    }

    fn text_height(&self) -> f64 {
        self.font.text_height()
    }
}

impl Surface for RecordingCanvas {
    fn begin(&mut self, width: u32, height: u32, font: &FontSpec) -> Result<(), RenderError> {
        if self.open {
            return Err(RenderError::surface("canvas is already drawing"));
        }
        self.font = self.fonts.resolve(font);
        self.commands.clear();
        self.open = true;
        self.record(DrawCommand::Begin {
            width,
            height,
            font: font.clone(),
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.record(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.record(DrawCommand::StrokeRect { rect, stroke });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.record(DrawCommand::Line { from, to, stroke });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.record(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        self.record(DrawCommand::Text {
            origin,
            text: text.to_string(),
            color,
        });
    }

    fn end(&mut self) -> Result<(), RenderError> {
        if !self.open {
            return Err(RenderError::surface("canvas was never started"));
        }
        self.record(DrawCommand::End);
        self.open = false;
        Ok(())
    }
}
