//! Painting surface abstraction
//!
//! The layout engine never rasterizes anything itself. It issues immediate
//! mode drawing commands against a [`Surface`] and asks it for text metrics
//! through the [`TextMetrics`] supertrait.

use std::ops::{Deref, DerefMut};

use serde::Serialize;

use super::{Color, Point, Rect, RenderError, Stroke};

/// Font requested by a diagram: a family name and a point size
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Em size in pixels at 96 dpi
    pub fn pixel_size(&self) -> f64 {
        f64::from(self.size) * 96.0 / 72.0
    }
}

/// Text measurement for the font configured by [`Surface::begin`]
pub trait TextMetrics {
    /// Advance width of `text` in pixels
    fn text_width(&self, text: &str) -> f64;

    /// Height of one line of text in pixels
    fn text_height(&self) -> f64;
}

/// A 2D immediate-mode drawing surface
///
/// A render pass calls [`begin`](Surface::begin) once, any number of
/// drawing methods, then [`end`](Surface::end). Coordinates are pixels with
/// the origin at the top-left corner.
pub trait Surface: TextMetrics {
    /// Allocate a `width` x `height` drawing area and select `font`
    fn begin(&mut self, width: u32, height: u32, font: &FontSpec) -> Result<(), RenderError>;

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Outline `rect` with a pen of `stroke.width`
    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke);

    /// Fill a convex polygon without outlining it
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Draw a single line of text whose line box starts at `origin` (top-left)
    fn draw_text(&mut self, origin: Point, text: &str, color: Color);

    /// Finish the pass. Called exactly once per successful [`begin`](Surface::begin).
    fn end(&mut self) -> Result<(), RenderError>;
}

/// Holds a surface between `begin` and `end`
///
/// Dropping the guard without calling [`finish`](SurfaceGuard::finish)
/// still ends the pass, so an error or a panic part-way through drawing
/// leaves the surface closed.
pub struct SurfaceGuard<'s, S: Surface + ?Sized> {
    surface: &'s mut S,
    open: bool,
}

impl<'s, S: Surface + ?Sized> SurfaceGuard<'s, S> {
    /// Begin a pass on `surface`
    pub fn begin(
        surface: &'s mut S,
        width: u32,
        height: u32,
        font: &FontSpec,
    ) -> Result<Self, RenderError> {
        surface.begin(width, height, font)?;
        Ok(Self {
            surface,
            open: true,
        })
    }

    /// End the pass and report the surface's result
    pub fn finish(mut self) -> Result<(), RenderError> {
        self.open = false;
        self.surface.end()
    }
}

impl<S: Surface + ?Sized> Deref for SurfaceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SurfaceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SurfaceGuard<'_, S> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(error) = self.surface.end() {
                tracing::warn!(%error, "Surface failed to close after an aborted render");
            }
        }
    }
}
