//! SVG document surface

use std::fmt::Write as _;

use super::{
    Color, Font, FontLibrary, FontSpec, Point, Rect, RenderError, Stroke, Surface, TextMetrics,
};

/// Builds a standalone SVG document
#[derive(Debug, Clone)]
pub struct SvgSurface {
    fonts: FontLibrary,
    font: Font,
    font_css: String,
    body: String,
    document: Option<String>,
    open: bool,
}

impl SvgSurface {
    pub fn new(fonts: FontLibrary) -> Self {
        let font = fonts.resolve(&FontSpec::new("serif", 12));
        Self {
            fonts,
            font,
            font_css: String::new(),
            body: String::new(),
            document: None,
            open: false,
        }
    }

    /// The document produced by the last finished pass
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn into_document(self) -> Option<String> {
        self.document
    }

    fn stroke_attrs(stroke: Stroke) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{}" stroke-linecap="square""#,
            stroke.color,
            num(stroke.width)
        );
        if stroke.dashed {
            let dash = num(stroke.width * 4.0);
            let _ = write!(attrs, r#" stroke-dasharray="{dash} {dash}""#);
        }
        attrs
    }
}

impl TextMetrics for SvgSurface {
    fn text_width(&self, text: &str) -> f64 {
        self.font.text_width(text)
    }

    fn text_height(&self) -> f64 {
        self.font.text_height()
    }
}

impl Surface for SvgSurface {
    fn begin(&mut self, width: u32, height: u32, font: &FontSpec) -> Result<(), RenderError> {
        if self.open {
            return Err(RenderError::surface("document is already being drawn"));
        }
        self.font = self.fonts.resolve(font);
        self.font_css = format!(
            r#"font-family="{}, serif" font-size="{}""#,
            escape(&font.family),
            num(font.pixel_size())
        );
        self.body.clear();
        let _ = writeln!(
            self.body,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        self.open = true;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"/>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height)
        );
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" {}/>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            Self::stroke_attrs(stroke)
        );
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            Self::stroke_attrs(stroke)
        );
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        let points: Vec<String> = points
            .iter()
            .map(|p| format!("{},{}", num(p.x), num(p.y)))
            .collect();
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" fill="{color}"/>"#,
            points.join(" ")
        );
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" {} fill="{color}" xml:space="preserve">{}</text>"#,
            num(origin.x),
            num(origin.y + self.font.ascent()),
            self.font_css,
            escape(text)
        );
    }

    fn end(&mut self) -> Result<(), RenderError> {
        if !self.open {
            return Err(RenderError::surface("document was never started"));
        }
        self.body.push_str("</svg>\n");
        self.document = Some(std::mem::take(&mut self.body));
        self.open = false;
        Ok(())
    }
}

/// Format a coordinate with at most two decimals
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => {
                let _ = write!(escaped, "&#x{:x};", u32::from(c));
            }
            // Not representable in XML 1.0, even as references.
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => escaped.push('\u{fffd}'),
            c => escaped.push(c),
        }
    }
    escaped
}
