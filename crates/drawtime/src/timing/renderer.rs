//! Timing diagram painter
//!
//! Draws a [`TimingDiagram`] onto any [`Surface`]: the frames, the column
//! grid, then each signal in declaration order with its name.

use tracing::{info, span, trace, Level};

use super::layout::{DiagramLayout, Levels};
use super::model::{Line, Signal, Style, Timeline, TimingDiagram};
use super::waveform::{bus_shapes, clock_to_line, line_strokes, BusShape};
use crate::core::{markup, Color, Point, Rect, RenderError, Stroke, Surface, SurfaceGuard};

/// Pen width of waveforms
const SIGNAL_PEN: f64 = 2.0;
/// Pen width of frames, rules and overlines
const THIN_PEN: f64 = 1.0;

/// Draw `diagram` onto `surface`
///
/// The surface is begun with the diagram's size and font and is always
/// ended again, also when drawing fails part-way.
pub fn render_onto<S: Surface + ?Sized>(
    diagram: &TimingDiagram,
    surface: &mut S,
) -> Result<(), RenderError> {
    let render_span = span!(
        Level::INFO,
        "render_timing",
        signal_count = diagram.signals().len()
    );
    let _enter = render_span.enter();

    if diagram.signals().is_empty() {
        return Err(RenderError::NoSignals);
    }

    let style = diagram.style();
    let mut guard = SurfaceGuard::begin(surface, style.width, style.height, &style.font())?;
    let layout = DiagramLayout::compute(diagram, &*guard)?;

    let mut painter = Painter {
        surface: &mut *guard,
        layout: &layout,
        style,
    };
    painter.background();
    painter.frames();
    painter.grid(diagram.timeline());
    for (index, signal) in diagram.signals().iter().enumerate() {
        painter.signal(index, signal, diagram.timeline());
    }

    guard.finish()?;
    info!("Rendering completed");
    Ok(())
}

struct Painter<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    layout: &'a DiagramLayout,
    style: &'a Style,
}

impl<S: Surface + ?Sized> Painter<'_, S> {
    fn pen(&self, width: f64) -> Stroke {
        Stroke::solid(self.style.foreground, width)
    }

    fn background(&mut self) {
        self.surface
            .fill_rect(self.layout.canvas, self.style.background);
    }

    fn frames(&mut self) {
        let pen = self.pen(THIN_PEN);
        self.surface.stroke_rect(self.layout.outer, pen);
        self.surface.stroke_rect(self.layout.inner, pen);
    }

    fn grid(&mut self, timeline: &Timeline) {
        let inner = self.layout.inner;
        let pen = Stroke::dashed(self.style.foreground, THIN_PEN);
        for x in self.layout.rules(timeline) {
            self.surface.draw_line(
                Point::new(x, inner.top() + 1.0),
                Point::new(x, inner.bottom()),
                pen,
            );
        }
        for column in self.layout.columns(timeline) {
            self.centered_text(column.center, &column.label, self.style.foreground);
        }
    }

    fn signal(&mut self, index: usize, signal: &Signal, timeline: &Timeline) {
        let band = self.layout.band(index);
        trace!(signal = signal.name(), kind = signal.kind().keyword(), index, "Drawing signal");
        match signal {
            Signal::Line(line) => self.line(line, band, timeline),
            Signal::Clock(clock) => self.line(&clock_to_line(clock, timeline), band, timeline),
            Signal::Bus(bus) => {
                let shapes = bus_shapes(
                    bus,
                    timeline,
                    &self.layout.scale,
                    band,
                    self.style.background,
                    self.layout.text_height,
                );
                for shape in shapes {
                    self.bus_shape(shape);
                }
            }
        }

        let name_left = self.layout.outer.left();
        self.text_at(name_left, band.center().y, signal.name(), self.style.foreground);
    }

    fn line(&mut self, line: &Line, band: Rect, timeline: &Timeline) {
        let pen = self.pen(SIGNAL_PEN);
        for (from, to) in line_strokes(line, timeline, &self.layout.scale, &Levels::of(band)) {
            self.surface.draw_line(from, to, pen);
        }
    }

    fn bus_shape(&mut self, shape: BusShape) {
        let pen = self.pen(SIGNAL_PEN);
        match shape {
            BusShape::Floating { from, to } => self.surface.draw_line(from, to, pen),
            BusShape::Filled {
                polygon,
                fill,
                outline,
                label,
            } => {
                self.surface.fill_polygon(&polygon, fill);
                for (from, to) in outline {
                    self.surface.draw_line(from, to, pen);
                }
                if let Some((text, center)) = label {
                    self.centered_text(center, &text, self.style.foreground);
                }
            }
        }
    }

    fn centered_text(&mut self, center: Point, label: &str, color: Color) {
        let width = self.surface.text_width(&markup::strip_markup(label));
        self.text_at(center.x - width / 2.0, center.y, label, color);
    }

    /// Lay out markup segments left to right, vertically centred on `center_y`
    fn text_at(&mut self, left: f64, center_y: f64, label: &str, color: Color) {
        let top = center_y - self.surface.text_height() / 2.0;
        let overline = Stroke::solid(color, THIN_PEN);
        let mut x = left;
        for segment in markup::parse_markup(label) {
            let width = self.surface.text_width(segment.text);
            self.surface.draw_text(Point::new(x, top), segment.text, color);
            if segment.overline {
                self.surface
                    .draw_line(Point::new(x, top), Point::new(x + width, top), overline);
            }
            x += width;
        }
    }
}
