//! Diagram geometry
//!
//! Computes, once per render, the frames, the time to pixel mapping and the
//! horizontal band each signal is drawn in.

use tracing::{debug, span, warn, Level};

use super::model::{LineValue, Timeline, TimingDiagram};
use crate::core::{markup, Point, Rect, RenderError, TextMetrics};

/// Height of a line of text relative to the font height
pub const TEXT_HEIGHT: f64 = 1.2;

/// Rules closer together than this many pixels are not drawn
pub const MIN_RULE_SPACING: f64 = 1.0;

/// Maps times to x coordinates inside the plot frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: f64,
    left: f64,
    right: f64,
    pixels_per_unit: f64,
}

impl TimeScale {
    pub fn new(timeline: &Timeline, frame: Rect) -> Self {
        Self {
            start: timeline.start as f64,
            left: frame.left(),
            right: frame.right(),
            pixels_per_unit: frame.width / timeline.span(),
        }
    }

    /// X coordinate of `time`, clamped to the plot frame
    pub fn x(&self, time: f64) -> f64 {
        let offset = self.dx(time - self.start).max(0.0);
        (self.left + offset).min(self.right - 1.0)
    }

    /// Horizontal distance covered by a duration
    pub fn dx(&self, duration: f64) -> f64 {
        duration * self.pixels_per_unit
    }

    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }
}

/// The three signal levels of a band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub high: f64,
    pub middle: f64,
    pub low: f64,
}

impl Levels {
    pub fn of(band: Rect) -> Self {
        Self {
            high: band.top() + band.height * 0.3,
            middle: band.top() + band.height * 0.5,
            low: band.top() + band.height * 0.7,
        }
    }

    /// Level of a defined line value; an unknown value has two rails instead
    pub fn y(&self, value: LineValue) -> Option<f64> {
        match value {
            LineValue::High => Some(self.high),
            LineValue::Floating => Some(self.middle),
            LineValue::Low => Some(self.low),
            LineValue::Unknown => None,
        }
    }
}

/// A labelled column between two dashed rules
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub center: Point,
}

/// Geometry shared by every drawing step of one render
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLayout {
    /// Whole image
    pub canvas: Rect,
    /// Image less the margins
    pub outer: Rect,
    /// Plot area right of the labels and below the column titles
    pub inner: Rect,
    pub label_width: f64,
    pub text_height: f64,
    pub scale: TimeScale,
    band_height: f64,
    band_count: usize,
}

impl DiagramLayout {
    pub fn compute(
        diagram: &TimingDiagram,
        metrics: &(impl TextMetrics + ?Sized),
    ) -> Result<Self, RenderError> {
        let layout_span = span!(
            Level::DEBUG,
            "layout_timing",
            signal_count = diagram.signals().len()
        );
        let _enter = layout_span.enter();

        let signals = diagram.signals();
        if signals.is_empty() {
            return Err(RenderError::NoSignals);
        }

        let style = diagram.style();
        let margin = f64::from(style.margin);
        let canvas = Rect::new(0.0, 0.0, f64::from(style.width), f64::from(style.height));
        let outer = canvas.inset(margin);

        let label_width = signals
            .iter()
            .map(|signal| metrics.text_width(&markup::strip_markup(&format!("{}  ", signal.name()))))
            .fold(0.0, f64::max);
        let text_height = metrics.text_height();
        let title_height = text_height * TEXT_HEIGHT;

        let inner = Rect::new(
            outer.left() + label_width,
            outer.top() + title_height,
            outer.width - label_width,
            outer.height - title_height,
        );
        if inner.width <= 0.0 || inner.height <= 0.0 {
            return Err(RenderError::surface(format!(
                "no room left to plot signals ({:.0}x{:.0} pixels)",
                inner.width, inner.height
            )));
        }

        let scale = TimeScale::new(diagram.timeline(), inner);
        debug!(
            label_width,
            text_height,
            pixels_per_unit = scale.pixels_per_unit(),
            "Computed diagram frames"
        );

        Ok(Self {
            canvas,
            outer,
            inner,
            label_width,
            text_height,
            scale,
            band_height: inner.height / signals.len() as f64,
            band_count: signals.len(),
        })
    }

    /// Band of the `index`-th signal, counted from the top
    pub fn band(&self, index: usize) -> Rect {
        Rect::new(
            self.inner.left(),
            self.inner.top() + self.band_height * index as f64,
            self.inner.width,
            self.band_height,
        )
    }

    pub fn bands(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.band_count).map(|index| self.band(index))
    }

    /// X coordinates of the dashed rules at every multiple of `step`
    ///
    /// The grid is left out when neighbouring rules would be less than
    /// [`MIN_RULE_SPACING`] apart, so the rule count never exceeds the plot
    /// width in pixels.
    pub fn rules(&self, timeline: &Timeline) -> Vec<f64> {
        if let Some(step) = timeline.step {
            if self.scale.dx(step as f64) < MIN_RULE_SPACING {
                warn!(
                    step,
                    spacing = self.scale.dx(step as f64),
                    "Grid step is narrower than a pixel, skipping rules"
                );
            }
        }
        self.rule_positions(timeline)
    }

    fn rule_positions(&self, timeline: &Timeline) -> Vec<f64> {
        let Some(step) = timeline.step else {
            return Vec::new();
        };
        if self.scale.dx(step as f64) < MIN_RULE_SPACING {
            return Vec::new();
        }
        let first = timeline.start.div_euclid(step) + i64::from(timeline.start.rem_euclid(step) != 0);
        let last = timeline.end.div_euclid(step);
        (first..=last)
            .map(|k| self.scale.x((k * step) as f64))
            .collect()
    }

    /// Titles `T1, T2, ...` centred between consecutive rules
    pub fn columns(&self, timeline: &Timeline) -> Vec<Column> {
        let y = self.inner.top() - self.text_height * 0.5;
        self.rule_positions(timeline)
            .windows(2)
            .enumerate()
            .map(|(index, pair)| Column {
                label: format!("T{}", index + 1),
                center: Point::new((pair[0] + pair[1]) / 2.0, y),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FontLibrary, FontSpec, RecordingCanvas, Surface};
    use crate::timing::parse_description;

    fn layout_for(input: &str) -> DiagramLayout {
        let diagram = parse_description(input).unwrap();
        let mut canvas = RecordingCanvas::with_fonts(FontLibrary::fixed());
        canvas
            .begin(diagram.style().width, diagram.style().height, &diagram.style().font())
            .unwrap();
        DiagramLayout::compute(&diagram, &canvas).unwrap()
    }

    #[test]
    fn test_frames() {
        let layout = layout_for("line AB:\n  start = 0\n");
        // "AB  " is four columns of 8px; text height is 20px.
        assert_eq!(layout.outer, Rect::new(20.0, 20.0, 760.0, 560.0));
        assert_eq!(layout.label_width, 32.0);
        assert_eq!(layout.inner, Rect::new(52.0, 44.0, 728.0, 536.0));
    }

    #[test]
    fn test_label_width_ignores_markup() {
        let plain = layout_for("line RW:\n  start = 0\n");
        let marked = layout_for("line !R/!W:\n  start = 0\n");
        assert_eq!(plain.label_width + 8.0, marked.label_width);
    }

    #[test]
    fn test_time_scale_clamps() {
        let timeline = Timeline {
            start: 10,
            end: 20,
            ..Timeline::default()
        };
        let scale = TimeScale::new(&timeline, Rect::new(100.0, 0.0, 200.0, 50.0));
        assert_eq!(scale.x(10.0), 100.0);
        assert_eq!(scale.x(15.0), 200.0);
        assert_eq!(scale.x(0.0), 100.0);
        assert_eq!(scale.x(25.0), 299.0);
        assert_eq!(scale.dx(2.5), 50.0);
    }

    #[test]
    fn test_bands_split_plot_evenly() {
        let layout = layout_for("line A:\n  start = 0\nline B:\n  start = 1\n");
        let bands: Vec<Rect> = layout.bands().collect();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].height, bands[1].height);
        assert_eq!(bands[0].bottom(), bands[1].top());
        assert_eq!(bands[1].bottom(), layout.inner.bottom());
    }

    #[test]
    fn test_levels() {
        let levels = Levels::of(Rect::new(0.0, 100.0, 10.0, 100.0));
        assert_eq!(levels.y(LineValue::High), Some(130.0));
        assert_eq!(levels.y(LineValue::Floating), Some(150.0));
        assert_eq!(levels.y(LineValue::Low), Some(170.0));
        assert_eq!(levels.y(LineValue::Unknown), None);
    }

    #[test]
    fn test_rules_and_columns() {
        let layout = layout_for("time:\n  start = 5\n  end = 45\n  step = 10\nline A:\n  start = 0\n");
        let timeline = Timeline {
            start: 5,
            end: 45,
            step: Some(10),
            delay: 10,
        };
        let rules = layout.rules(&timeline);
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0], layout.scale.x(10.0));
        assert_eq!(rules[3], layout.scale.x(40.0));
        let columns = layout.columns(&timeline);
        let labels: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_sub_pixel_steps_draw_no_grid() {
        let layout = layout_for("time:\n  end = 5000000\n  step = 1\nline A:\n  start = 0\n");
        let timeline = Timeline {
            start: 0,
            end: 5_000_000,
            step: Some(1),
            delay: 10,
        };
        assert!(layout.rules(&timeline).is_empty());
        assert!(layout.columns(&timeline).is_empty());

        let layout = layout_for("time:\n  end = 1000000000000\n  step = 7\nline A:\n  start = 0\n");
        let huge = Timeline {
            end: 1_000_000_000_000,
            step: Some(7),
            ..timeline
        };
        assert!(layout.rules(&huge).is_empty());
    }

    #[test]
    fn test_no_signals() {
        let diagram = parse_description("time:\n  end = 5\n").unwrap();
        let canvas = RecordingCanvas::new();
        assert!(matches!(
            DiagramLayout::compute(&diagram, &canvas),
            Err(RenderError::NoSignals)
        ));
    }

    #[test]
    fn test_font_spec_drives_label_width() {
        let diagram = parse_description("style:\n  font_size = 24\nline AB:\n  start = 0\n").unwrap();
        let mut canvas = RecordingCanvas::new();
        canvas
            .begin(800, 600, &FontSpec::new("serif", diagram.style().font_size))
            .unwrap();
        let layout = DiagramLayout::compute(&diagram, &canvas).unwrap();
        assert_eq!(layout.label_width, 64.0);
    }
}
