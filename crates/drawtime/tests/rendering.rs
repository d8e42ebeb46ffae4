//! Structural tests for rendered diagrams
//!
//! Rendering is checked through the recorded drawing commands, which use
//! fixed font metrics and so do not depend on installed fonts.

use drawtime::prelude::*;
use drawtime::timing::waveform::clock_to_line;
use drawtime::{DrawCommand, Point, Rect, Stroke};

const SCENARIO: &str = "time:\n  start = 0\n  end = 10\nline A:\n  start = 0\n  2 -> 1\n  6 -> 0\n";

fn commands(input: &str) -> Vec<DrawCommand> {
    let diagram = drawtime::parse(input).unwrap();
    CommandRenderer::new().render(&diagram).unwrap()
}

fn frames(commands: &[DrawCommand]) -> Vec<Rect> {
    commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::StrokeRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect()
}

fn signal_lines(commands: &[DrawCommand]) -> Vec<(Point, Point)> {
    commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Line { from, to, stroke } if stroke.width == 2.0 => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

fn texts(commands: &[DrawCommand]) -> Vec<(Point, &str)> {
    commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { origin, text, .. } => Some((*origin, text.as_str())),
            _ => None,
        })
        .collect()
}

#[test]
fn test_scenario_model() {
    let diagram = drawtime::parse(SCENARIO).unwrap();
    assert_eq!(diagram.timeline().start, 0);
    assert_eq!(diagram.timeline().end, 10);
    match &diagram.signals()[0] {
        Signal::Line(line) => {
            assert_eq!(line.name(), "A");
            assert_eq!(line.start(), LineValue::Low);
            let changes: Vec<(f64, LineValue)> = line.changes().iter().map(|(t, v)| (t, *v)).collect();
            assert_eq!(changes, vec![(2.0, LineValue::High), (6.0, LineValue::Low)]);
        }
        other => panic!("expected a line, got {other:?}"),
    }
}

#[test]
fn test_scenario_transitions_are_centred_on_changes() {
    let input = SCENARIO.replace("end = 10\n", "end = 10\n  delay = 2\n");
    let commands = commands(&input);
    let inner = frames(&commands)[1];
    let x = |t: f64| inner.left() + t * inner.width / 10.0;

    let slants: Vec<(Point, Point)> = signal_lines(&commands)
        .into_iter()
        .filter(|(from, to)| from.y != to.y)
        .collect();
    assert_eq!(slants.len(), 2);

    let (rise_from, rise_to) = slants[0];
    assert!(rise_to.y < rise_from.y);
    assert!(((rise_from.x + rise_to.x) / 2.0 - x(2.0)).abs() < 1e-6);
    assert!((rise_to.x - rise_from.x - x(2.0) + x(0.0)).abs() < 1e-6);

    let (fall_from, fall_to) = slants[1];
    assert!(fall_to.y > fall_from.y);
    assert!(((fall_from.x + fall_to.x) / 2.0 - x(6.0)).abs() < 1e-6);
}

#[test]
fn test_line_levels() {
    let commands = commands("time:\n  end = 10\n  delay = 2\nline A:\n  start = 0\n  2 -> 1\n  6 -> Z\n");
    let inner = frames(&commands)[1];
    let mut levels: Vec<f64> = signal_lines(&commands)
        .into_iter()
        .filter(|(from, to)| from.y == to.y)
        .map(|(from, _)| from.y)
        .collect();
    levels.sort_by(f64::total_cmp);
    levels.dedup();
    let expected = [0.3, 0.5, 0.7].map(|f| inner.top() + inner.height * f);
    assert_eq!(levels.len(), 3);
    for (level, expected) in levels.iter().zip(expected) {
        assert!((level - expected).abs() < 1e-9);
    }
}

#[test]
fn test_frames_and_label_column() {
    let commands = commands(SCENARIO);
    let frames = frames(&commands);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], Rect::new(20.0, 20.0, 760.0, 560.0));
    // "A  " takes three 8px columns; one 20px text line sits above the plot.
    assert_eq!(frames[1].left(), 44.0);
    assert_eq!(frames[1].top(), 44.0);
    assert_eq!(frames[1].right(), 780.0);
    assert_eq!(frames[1].bottom(), 580.0);
}

#[test]
fn test_signal_order_follows_declaration() {
    let input = "clock zeta:\n  offset = 0\n  length = 10\n  duty = 0.5\nbus alpha:\n  start = Z\nline mid:\n  start = 1\n";
    let commands = commands(input);
    let names: Vec<(Point, &str)> = texts(&commands)
        .into_iter()
        .filter(|(_, text)| matches!(*text, "zeta" | "alpha" | "mid"))
        .collect();
    assert_eq!(
        names.iter().map(|(_, text)| *text).collect::<Vec<_>>(),
        vec!["zeta", "alpha", "mid"]
    );
    assert!(names[0].0.y < names[1].0.y && names[1].0.y < names[2].0.y);
}

#[test]
fn test_bus_chevrons_and_labels() {
    let commands = commands("time:\n  end = 30\n  delay = 2\nbus D:\n  start = 'idle'\n  10 -> ?\n  20 -> \"!RW\"\n");
    let polygons: Vec<(&Vec<Point>, Color)> = commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Polygon { points, color } => Some((points, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(polygons.len(), 3);
    // Flat at the frame edges, pointed where values change.
    assert_eq!(polygons[0].0.len(), 5);
    assert_eq!(polygons[1].0.len(), 6);
    assert_eq!(polygons[2].0.len(), 5);
    assert_eq!(polygons[1].1, Color::UNKNOWN_FILL);

    let inner = frames(&commands)[1];
    let xs: Vec<f64> = polygons[1].0.iter().map(|p| p.x).collect();
    let x = |t: f64| inner.left() + t * inner.width / 30.0;
    assert!((xs.iter().cloned().fold(f64::INFINITY, f64::min) - x(10.0)).abs() < 1e-6);
    assert!((xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max) - x(20.0)).abs() < 1e-6);

    let labels: Vec<&str> = texts(&commands).into_iter().map(|(_, text)| text).collect();
    assert!(labels.contains(&"idle"));
    assert!(labels.contains(&"RW"));
}

#[test]
fn test_floating_bus_draws_middle_line() {
    let commands = commands("bus D:\n  start = Z\n");
    assert!(commands
        .iter()
        .all(|command| !matches!(command, DrawCommand::Polygon { .. })));
    let lines = signal_lines(&commands);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0.y, lines[0].1.y);
}

#[test]
fn test_colors_come_from_style() {
    let commands = commands("style:\n  background = 000000\n  foreground = 00ff00\nline A:\n  start = 1\n");
    assert!(matches!(
        commands[1],
        DrawCommand::FillRect { color, .. } if color == Color::BLACK
    ));
    let green = Color::from_hex("00ff00").unwrap();
    assert!(commands.iter().all(|command| match command {
        DrawCommand::Line { stroke, .. } | DrawCommand::StrokeRect { stroke, .. } => stroke.color == green,
        DrawCommand::Text { color, .. } => *color == green,
        _ => true,
    }));
}

#[test]
fn test_clock_expansion_matches_phase() {
    let diagram = drawtime::parse(
        "time:\n  end = 10\nclock clk:\n  offset = 0\n  length = 4\n  duty = 0.5\n",
    )
    .unwrap();
    let Signal::Clock(clock) = &diagram.signals()[0] else {
        panic!("expected a clock");
    };
    let line = clock_to_line(clock, diagram.timeline());
    assert_eq!(line.start(), LineValue::Low);
    let changes: Vec<(f64, LineValue)> = line.changes().iter().map(|(t, v)| (t, *v)).collect();
    assert_eq!(
        changes,
        vec![
            (2.0, LineValue::High),
            (4.0, LineValue::Low),
            (6.0, LineValue::High),
            (8.0, LineValue::Low),
        ]
    );
}

#[test]
fn test_clock_draws_like_its_line() {
    let clock = commands("time:\n  end = 10\n  delay = 1\nclock c:\n  offset = 0\n  length = 4\n  duty = 0.5\n");
    let line = commands("time:\n  end = 10\n  delay = 1\nline c:\n  start = 0\n  2 -> 1\n  4 -> 0\n  6 -> 1\n  8 -> 0\n");
    assert_eq!(clock, line);
}

#[test]
fn test_rendering_is_deterministic() {
    let diagram = drawtime::parse(SCENARIO).unwrap();
    let renderer = RasterRenderer::with_fonts(FontLibrary::fixed());
    assert_eq!(
        renderer.render_png(&diagram).unwrap(),
        renderer.render_png(&diagram).unwrap()
    );
    let svg = SvgRenderer::with_fonts(FontLibrary::fixed());
    assert_eq!(svg.render(&diagram).unwrap(), svg.render(&diagram).unwrap());
}

#[test]
fn test_raster_paints_waveform() {
    let diagram = drawtime::parse("style:\n  width = 200\n  height = 100\n  margin = 10\nline A:\n  start = 1\n").unwrap();
    let image = RasterRenderer::with_fonts(FontLibrary::fixed())
        .render(&diagram)
        .unwrap();
    assert_eq!(image.dimensions(), (200, 100));
    let black = image.pixels().filter(|pixel| pixel.0 == [0, 0, 0, 255]).count();
    assert!(black > 0);
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

/// A surface that refuses to lay anything out
#[derive(Default)]
struct CrampedSurface {
    begun: usize,
    ended: usize,
}

impl TextMetrics for CrampedSurface {
    fn text_width(&self, _: &str) -> f64 {
        10_000.0
    }

    fn text_height(&self) -> f64 {
        10.0
    }
}

impl Surface for CrampedSurface {
    fn begin(&mut self, _: u32, _: u32, _: &FontSpec) -> Result<(), RenderError> {
        self.begun += 1;
        Ok(())
    }
    fn fill_rect(&mut self, _: Rect, _: Color) {}
    fn stroke_rect(&mut self, _: Rect, _: Stroke) {}
    fn draw_line(&mut self, _: Point, _: Point, _: Stroke) {}
    fn fill_polygon(&mut self, _: &[Point], _: Color) {}
    fn draw_text(&mut self, _: Point, _: &str, _: Color) {}
    fn end(&mut self) -> Result<(), RenderError> {
        self.ended += 1;
        Ok(())
    }
}

#[test]
fn test_surface_released_on_failure() {
    let diagram = drawtime::parse(SCENARIO).unwrap();
    let mut surface = CrampedSurface::default();
    assert!(matches!(
        render_onto(&diagram, &mut surface),
        Err(RenderError::Surface { .. })
    ));
    assert_eq!((surface.begun, surface.ended), (1, 1));
}

#[test]
fn test_render_onto_trait_object() {
    let diagram = drawtime::parse(SCENARIO).unwrap();
    let mut canvas = RecordingCanvas::new();
    let surface: &mut dyn Surface = &mut canvas;
    render_onto(&diagram, surface).unwrap();
    assert!(matches!(canvas.commands().last(), Some(DrawCommand::End)));
}
