//! Pixel buffer surface
//!
//! Paints into a [`tiny_skia::Pixmap`] with antialiased fills and strokes.
//! The finished pixmap is handed out as an [`image::RgbaImage`] so it can be
//! encoded or saved in any format `image` knows.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tiny_skia::{FillRule, LineCap, Paint, PathBuilder, Pixmap, StrokeDash, Transform};

use super::{
    Color, Font, FontLibrary, FontSpec, Point, Rect, RenderError, Stroke, Surface, TextMetrics,
};

/// On and off length of a dash, in multiples of the pen width
const DASH_PATTERN: [f32; 2] = [4.0, 4.0];

/// RGBA raster surface
#[derive(Debug, Clone)]
pub struct RasterSurface {
    fonts: FontLibrary,
    font: Font,
    pixmap: Option<Pixmap>,
    open: bool,
}

impl RasterSurface {
    pub fn new(fonts: FontLibrary) -> Self {
        let font = fonts.resolve(&FontSpec::new("serif", 12));
        Self {
            fonts,
            font,
            pixmap: None,
            open: false,
        }
    }

    /// The image painted by the last finished pass
    pub fn image(&self) -> Option<RgbaImage> {
        self.finished_image().ok()
    }

    pub fn into_image(self) -> Option<RgbaImage> {
        self.image()
    }

    /// Encode the last image as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        let image = self.finished_image()?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Save the last image; the format follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.finished_image()?.save(path)?;
        Ok(())
    }

    fn finished_image(&self) -> Result<RgbaImage, RenderError> {
        match (&self.pixmap, self.open) {
            (Some(pixmap), false) => to_rgba(pixmap),
            (Some(_), true) => Err(RenderError::surface("image is still being drawn")),
            (None, _) => Err(RenderError::surface("no diagram has been drawn")),
        }
    }

    fn fill(&mut self, builder: PathBuilder, color: Color) {
        let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), builder.finish()) else {
            return;
        };
        pixmap.fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
    }
}

/// Un-premultiply the pixmap into a straight-alpha image
fn to_rgba(pixmap: &Pixmap) -> Result<RgbaImage, RenderError> {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| RenderError::surface("pixel buffer does not match the image size"))
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.red(), color.green(), color.blue(), 0xff);
    paint.anti_alias = true;
    paint
}

fn polygon(points: &[Point]) -> PathBuilder {
    let mut builder = PathBuilder::new();
    for (i, point) in points.iter().enumerate() {
        let (x, y) = (point.x as f32, point.y as f32);
        if i == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }
    builder.close();
    builder
}

impl TextMetrics for RasterSurface {
    fn text_width(&self, text: &str) -> f64 {
        self.font.text_width(text)
    }

    fn text_height(&self) -> f64 {
        self.font.text_height()
    }
}

impl Surface for RasterSurface {
    fn begin(&mut self, width: u32, height: u32, font: &FontSpec) -> Result<(), RenderError> {
        if self.open {
            return Err(RenderError::surface("surface is already drawing"));
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::surface(format!("cannot allocate a {width}x{height} image"))
        })?;
        self.font = self.fonts.resolve(font);
        self.pixmap = Some(pixmap);
        self.open = true;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let corners = [
            Point::new(rect.left(), rect.top()),
            Point::new(rect.right(), rect.top()),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.left(), rect.bottom()),
        ];
        self.fill(polygon(&corners), color);
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        let (left, top, right, bottom) = (rect.left(), rect.top(), rect.right(), rect.bottom());
        self.draw_line(Point::new(left, top), Point::new(right, top), stroke);
        self.draw_line(Point::new(right, top), Point::new(right, bottom), stroke);
        self.draw_line(Point::new(right, bottom), Point::new(left, bottom), stroke);
        self.draw_line(Point::new(left, bottom), Point::new(left, top), stroke);
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        // Pens are centred on pixel centres.
        let mut builder = PathBuilder::new();
        builder.move_to(from.x as f32 + 0.5, from.y as f32 + 0.5);
        builder.line_to(to.x as f32 + 0.5, to.y as f32 + 0.5);
        let Some(path) = builder.finish() else {
            return;
        };

        let width = stroke.width.max(1.0) as f32;
        let pen = if stroke.dashed {
            tiny_skia::Stroke {
                width,
                line_cap: LineCap::Butt,
                dash: StrokeDash::new(DASH_PATTERN.iter().map(|length| length * width).collect(), 0.0),
                ..tiny_skia::Stroke::default()
            }
        } else {
            tiny_skia::Stroke {
                width,
                line_cap: LineCap::Square,
                ..tiny_skia::Stroke::default()
            }
        };
        pixmap.stroke_path(&path, &paint(stroke.color), &pen, Transform::identity(), None);
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        self.fill(polygon(points), color);
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        let mut builder = PathBuilder::new();
        self.font.outline(text, origin, &mut builder);
        self.fill(builder, color);
    }

    fn end(&mut self) -> Result<(), RenderError> {
        if !self.open {
            return Err(RenderError::surface("surface was never started"));
        }
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(width: u32, height: u32) -> RasterSurface {
        let mut surface = RasterSurface::new(FontLibrary::fixed());
        surface
            .begin(width, height, &FontSpec::new("serif", 12))
            .unwrap();
        surface
    }

    #[test]
    fn test_fill_rect_covers_exact_pixels() {
        let mut surface = surface(10, 10);
        surface.fill_rect(Rect::new(2.0, 3.0, 4.0, 2.0), Color::from_rgb(0xff0000));
        surface.end().unwrap();
        let image = surface.image().unwrap();
        assert_eq!(image.get_pixel(2, 3).0, [0xff, 0, 0, 0xff]);
        assert_eq!(image.get_pixel(5, 4).0, [0xff, 0, 0, 0xff]);
        assert_eq!(image.get_pixel(6, 4)[3], 0);
        assert_eq!(image.get_pixel(2, 5)[3], 0);
    }

    #[test]
    fn test_horizontal_line_paints_its_row() {
        let mut surface = surface(20, 10);
        surface.draw_line(
            Point::new(2.0, 4.0),
            Point::new(12.0, 4.0),
            Stroke::solid(Color::BLACK, 1.0),
        );
        surface.end().unwrap();
        let image = surface.image().unwrap();
        assert_eq!(image.get_pixel(2, 4)[3], 0xff);
        assert_eq!(image.get_pixel(7, 4).0, [0, 0, 0, 0xff]);
        assert_eq!(image.get_pixel(12, 4)[3], 0xff);
        assert_eq!(image.get_pixel(7, 3)[3], 0);
        assert_eq!(image.get_pixel(7, 5)[3], 0);
    }

    #[test]
    fn test_dashed_line_has_gaps() {
        let mut surface = surface(40, 4);
        surface.draw_line(
            Point::new(0.0, 1.0),
            Point::new(39.0, 1.0),
            Stroke::dashed(Color::BLACK, 1.0),
        );
        surface.end().unwrap();
        let image = surface.image().unwrap();
        let alpha: Vec<u8> = (0..40).map(|x| image.get_pixel(x, 1)[3]).collect();
        assert_eq!(alpha[2], 0xff);
        assert_eq!(alpha[6], 0);
        assert_eq!(alpha[10], 0xff);
        assert_eq!(alpha[14], 0);
    }

    #[test]
    fn test_slanted_edges_are_antialiased() {
        let mut surface = surface(20, 20);
        surface.draw_line(
            Point::new(0.0, 0.0),
            Point::new(19.0, 9.0),
            Stroke::solid(Color::BLACK, 2.0),
        );
        surface.end().unwrap();
        let image = surface.image().unwrap();
        let partial = image
            .pixels()
            .filter(|pixel| pixel[3] > 0 && pixel[3] < 0xff)
            .count();
        assert!(partial > 0);
    }

    #[test]
    fn test_triangle_fill() {
        let mut surface = surface(10, 10);
        surface.fill_polygon(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
            Color::BLACK,
        );
        surface.end().unwrap();
        let image = surface.image().unwrap();
        assert_eq!(image.get_pixel(1, 1)[3], 0xff);
        assert_eq!(image.get_pixel(8, 8)[3], 0);
    }

    #[test]
    fn test_png_requires_finished_pass() {
        let mut surface = surface(4, 4);
        assert!(surface.to_png().is_err());
        assert!(surface.image().is_none());
        surface.end().unwrap();
        let bytes = surface.to_png().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        let mut surface = RasterSurface::new(FontLibrary::fixed());
        assert!(surface.begin(0, 10, &FontSpec::new("serif", 12)).is_err());
    }
}
