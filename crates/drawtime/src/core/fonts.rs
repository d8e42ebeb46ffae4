//! Font resolution and measurement
//!
//! Fonts are resolved once per render from a [`FontLibrary`]. The library is
//! either the system font database (`fontdb`), a single font file, or a
//! deterministic fixed-advance stand-in that needs no font files at all.

use std::fmt;
use std::sync::Arc;

use tiny_skia::PathBuilder;
use ttf_parser::{Face, OutlineBuilder};
use unicode_width::UnicodeWidthChar;

use super::{FontSpec, Point, RenderError};

/// Where fonts come from
#[derive(Clone)]
pub struct FontLibrary {
    source: FontSource,
}

#[derive(Clone)]
enum FontSource {
    #[cfg(not(target_arch = "wasm32"))]
    System(Arc<fontdb::Database>),
    Data { data: Arc<Vec<u8>>, index: u32 },
    Fixed,
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            #[cfg(not(target_arch = "wasm32"))]
            FontSource::System(db) => format!("system ({} faces)", db.len()),
            FontSource::Data { data, index } => format!("data ({} bytes, face {index})", data.len()),
            FontSource::Fixed => "fixed".to_string(),
        };
        f.debug_struct("FontLibrary").field("source", &source).finish()
    }
}

impl FontLibrary {
    /// Fonts installed on this machine
    #[cfg(not(target_arch = "wasm32"))]
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(face_count = db.len(), "Loaded system fonts");
        Self {
            source: FontSource::System(Arc::new(db)),
        }
    }

    /// A single font face from raw TrueType/OpenType bytes
    pub fn from_data(data: Vec<u8>) -> Result<Self, RenderError> {
        Face::parse(&data, 0)
            .map_err(|e| RenderError::surface(format!("invalid font data: {e}")))?;
        Ok(Self {
            source: FontSource::Data {
                data: Arc::new(data),
                index: 0,
            },
        })
    }

    /// A single font face read from `path`
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RenderError> {
        let data = std::fs::read(path)?;
        Self::from_data(data)
    }

    /// Fixed-advance metrics: half an em per display column, no glyphs
    pub fn fixed() -> Self {
        Self {
            source: FontSource::Fixed,
        }
    }

    /// Pick the face for `spec`
    ///
    /// System lookups try the named family, then generic serif, then
    /// sans-serif, then any face at all. When nothing usable is installed
    /// the fixed metrics are used.
    pub fn resolve(&self, spec: &FontSpec) -> Font {
        let pixel_size = spec.pixel_size();
        match &self.source {
            #[cfg(not(target_arch = "wasm32"))]
            FontSource::System(db) => match query_system(db, &spec.family) {
                Some((data, index)) => OutlineFont::new(Arc::new(data), index, pixel_size)
                    .map(Font::Outline)
                    .unwrap_or_else(|| Font::Fixed(FixedFont::new(pixel_size))),
                None => {
                    tracing::warn!(family = %spec.family, "No system font found, using fixed metrics");
                    Font::Fixed(FixedFont::new(pixel_size))
                }
            },
            FontSource::Data { data, index } => OutlineFont::new(data.clone(), *index, pixel_size)
                .map(Font::Outline)
                .unwrap_or_else(|| Font::Fixed(FixedFont::new(pixel_size))),
            FontSource::Fixed => Font::Fixed(FixedFont::new(pixel_size)),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn query_system(db: &fontdb::Database, family: &str) -> Option<(Vec<u8>, u32)> {
    let families = [
        vec![fontdb::Family::Name(family), fontdb::Family::Serif],
        vec![fontdb::Family::SansSerif],
    ];
    let id = families
        .iter()
        .find_map(|families| {
            db.query(&fontdb::Query {
                families,
                weight: fontdb::Weight::NORMAL,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            })
        })
        .or_else(|| db.faces().next().map(|face| face.id))?;

    if let Some(face) = db.face(id) {
        tracing::debug!(requested = %family, matched = ?face.families, "Resolved font face");
    }
    db.with_face_data(id, |data, index| (data.to_vec(), index))
}

/// A resolved font at a fixed pixel size
#[derive(Debug, Clone)]
pub enum Font {
    Outline(OutlineFont),
    Fixed(FixedFont),
}

impl Font {
    pub fn text_width(&self, text: &str) -> f64 {
        match self {
            Font::Outline(font) => font.text_width(text),
            Font::Fixed(font) => font.text_width(text),
        }
    }

    pub fn text_height(&self) -> f64 {
        match self {
            Font::Outline(font) => font.height,
            Font::Fixed(font) => font.height,
        }
    }

    /// Distance from the top of the line box to the baseline
    pub fn ascent(&self) -> f64 {
        match self {
            Font::Outline(font) => font.ascent,
            Font::Fixed(font) => font.ascent,
        }
    }

    /// Append the glyph outlines of `text`, line box at `origin`, to `path`
    ///
    /// Fixed metrics have no glyphs and add nothing.
    pub fn outline(&self, text: &str, origin: Point, path: &mut PathBuilder) {
        if let Font::Outline(font) = self {
            font.outline(text, origin, path);
        }
    }
}

/// A TrueType/OpenType face scaled to a pixel size
#[derive(Clone)]
pub struct OutlineFont {
    data: Arc<Vec<u8>>,
    index: u32,
    scale: f64,
    ascent: f64,
    height: f64,
}

impl fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFont")
            .field("index", &self.index)
            .field("scale", &self.scale)
            .field("ascent", &self.ascent)
            .field("height", &self.height)
            .finish()
    }
}

impl OutlineFont {
    fn new(data: Arc<Vec<u8>>, index: u32, pixel_size: f64) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let scale = pixel_size / f64::from(face.units_per_em());
        let ascent = f64::from(face.ascender()) * scale;
        let descent = -f64::from(face.descender()) * scale;
        Some(Self {
            data,
            index,
            scale,
            ascent: ascent.ceil(),
            height: (ascent + descent).ceil(),
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.index).ok()
    }

    fn text_width(&self, text: &str) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        text.chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|glyph| face.glyph_hor_advance(glyph))
            .map(|advance| f64::from(advance) * self.scale)
            .sum()
    }

    fn outline(&self, text: &str, origin: Point, path: &mut PathBuilder) {
        let Some(face) = self.face() else {
            return;
        };
        let mut glyphs = GlyphPath {
            builder: path,
            x: origin.x,
            baseline: origin.y + self.ascent,
            scale: self.scale,
        };
        for c in text.chars() {
            let Some(glyph) = face.glyph_index(c) else {
                continue;
            };
            face.outline_glyph(glyph, &mut glyphs);
            glyphs.x += face
                .glyph_hor_advance(glyph)
                .map(|advance| f64::from(advance) * self.scale)
                .unwrap_or(0.0);
        }
    }
}

/// Deterministic metrics independent of installed fonts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFont {
    advance: f64,
    ascent: f64,
    height: f64,
}

impl FixedFont {
    pub fn new(pixel_size: f64) -> Self {
        Self {
            advance: pixel_size / 2.0,
            ascent: (pixel_size * 0.9).ceil(),
            height: (pixel_size * 1.2).ceil(),
        }
    }

    fn text_width(&self, text: &str) -> f64 {
        let columns: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
        columns as f64 * self.advance
    }
}

/// Feeds glyph outlines into a path in pixel space
struct GlyphPath<'a> {
    builder: &'a mut PathBuilder,
    x: f64,
    baseline: f64,
    scale: f64,
}

impl GlyphPath<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        // Font units grow upwards, pixels downwards.
        (
            (self.x + f64::from(x) * self.scale) as f32,
            (self.baseline - f64::from(y) * self.scale) as f32,
        )
    }
}

impl OutlineBuilder for GlyphPath<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
