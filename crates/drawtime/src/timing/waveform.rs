//! Waveform geometry
//!
//! Turns signals into screen-space strokes and shapes. Nothing here touches a
//! surface; the renderer paints what these functions return.

use tracing::warn;

use super::layout::{Levels, TimeScale};
use super::model::{Bus, BusValue, Changes, Clock, Line, LineValue, Timeline};
use crate::core::{Color, Point, Rect};

/// Upper bound on generated clock edges
const MAX_CLOCK_EDGES: usize = 100_000;

/// A straight pen stroke
pub type Segment = (Point, Point);

/// Expand a clock into the equivalent line over the visible window
///
/// Cycles are aligned on `offset + k * length`. Each cycle starts low and
/// rises after `(1 - duty) * length`. Edges at or before the window start
/// only set the start value.
pub fn clock_to_line(clock: &Clock, timeline: &Timeline) -> Line {
    let (start, end) = (timeline.start as f64, timeline.end as f64);
    let length = clock.length();
    let off_length = length - clock.duty() * length;
    let first_cycle = ((start - clock.offset()) / length).floor();

    let mut start_value = LineValue::Low;
    let mut changes = Changes::new();
    let mut cycle = 0.0;
    let mut edges = 0;
    let mut past_end = false;
    'cycles: loop {
        let base = clock.offset() + (first_cycle + cycle) * length;
        for (time, value) in [(base + off_length, LineValue::High), (base + length, LineValue::Low)] {
            if time <= start {
                start_value = value;
            } else {
                changes.record(time, value);
            }
            edges += 1;
            if time >= end {
                past_end = true;
                break 'cycles;
            }
            if edges >= MAX_CLOCK_EDGES {
                warn!(clock = clock.name(), edges, "Clock has too many edges, truncating");
                break 'cycles;
            }
        }
        cycle += 1.0;
    }
    // The edge that ended the loop lies beyond the window.
    if past_end {
        changes.pop();
    }

    Line::from_parts(clock.name(), start_value, changes)
}

/// Strokes of a line signal
///
/// A change at `t` is drawn over `[t - delay/2, t + delay/2]`. The trace
/// starts half a delay before the window and runs past its end.
pub fn line_strokes(line: &Line, timeline: &Timeline, scale: &TimeScale, levels: &Levels) -> Vec<Segment> {
    let half_delay = timeline.delay as f64 / 2.0;
    let delay = timeline.delay as f64;

    let mut stops: Vec<(f64, LineValue)> = line.changes().iter().map(|(t, v)| (t, *v)).collect();
    match stops.last() {
        Some(&(time, value)) if time < timeline.end as f64 => {
            stops.push((timeline.end as f64 + half_delay, value))
        }
        Some(_) => {}
        None => stops.push((timeline.end as f64 + half_delay, line.start())),
    }

    let mut strokes = Vec::new();
    let (mut last_time, mut last_value) = (timeline.start as f64 - half_delay, line.start());
    for (time, value) in stops {
        let last_x = scale.x(last_time) + 1.0;
        let time = time + half_delay;
        let x = scale.x(time);
        let x_before = scale.x(time - delay);

        match (levels.y(last_value), levels.y(value)) {
            // Unknown: both rails, converging on the new level.
            (None, target) => {
                strokes.push((Point::new(last_x, levels.low), Point::new(x_before, levels.low)));
                strokes.push((Point::new(last_x, levels.high), Point::new(x_before, levels.high)));
                match target {
                    Some(y) => {
                        strokes.push((Point::new(x_before, levels.low), Point::new(x, y)));
                        strokes.push((Point::new(x_before, levels.high), Point::new(x, y)));
                    }
                    None => {
                        strokes.push((Point::new(x_before, levels.low), Point::new(x, levels.low)));
                        strokes.push((Point::new(x_before, levels.high), Point::new(x, levels.high)));
                    }
                }
            }
            (Some(from), Some(to)) if value == last_value => {
                strokes.push((Point::new(last_x, from), Point::new(x, to)));
            }
            (Some(from), target) => {
                let to = target.unwrap_or(from);
                strokes.push((Point::new(last_x, from), Point::new(x_before, from)));
                strokes.push((Point::new(x_before, from), Point::new(x, to)));
            }
        }
        last_time = time;
        last_value = value;
    }
    strokes
}

/// What a bus interval looks like
#[derive(Debug, Clone, PartialEq)]
pub enum BusShape {
    /// A floating value: a single line at the middle level
    Floating { from: Point, to: Point },
    /// A chevron polygon with its outline and optional centred label
    Filled {
        polygon: Vec<Point>,
        fill: Color,
        outline: Vec<Segment>,
        label: Option<(String, Point)>,
    },
}

/// Shapes of a bus signal, one per constant interval
///
/// Transitions are crossings centred on the change time, `delay` wide.
/// Intervals touching the frame edges end flat.
pub fn bus_shapes(
    bus: &Bus,
    timeline: &Timeline,
    scale: &TimeScale,
    band: Rect,
    background: Color,
    text_height: f64,
) -> Vec<BusShape> {
    let levels = Levels::of(band);
    let margin = scale.dx(timeline.delay as f64 / 2.0);
    let label_y = band.center().y - text_height * (super::layout::TEXT_HEIGHT - 1.0) / 2.0;

    let mut bounds: Vec<(f64, &BusValue)> = vec![(timeline.start as f64, bus.start())];
    bounds.extend(bus.changes().iter());
    let end = timeline.end as f64;
    let last_time = bounds.last().map(|(time, _)| *time).unwrap_or(end);
    let closing = if last_time < end { Some(end) } else { None };

    let mut shapes = Vec::new();
    for (index, &(from_time, value)) in bounds.iter().enumerate() {
        let Some(to_time) = bounds.get(index + 1).map(|(time, _)| *time).or(closing) else {
            break;
        };
        let (xa, xb) = (scale.x(from_time), scale.x(to_time));
        if xb <= xa {
            continue;
        }
        let pointed_left = xa > band.left();
        let pointed_right = xb < band.right() - 1.0;

        let fill = match value {
            BusValue::Floating => {
                shapes.push(BusShape::Floating {
                    from: Point::new(xa, levels.middle),
                    to: Point::new(xb, levels.middle),
                });
                continue;
            }
            BusValue::Unknown => Color::UNKNOWN_FILL,
            BusValue::Text(_) => background,
        };

        let center = (xa + xb) / 2.0;
        let left_shoulder = if pointed_left { (xa + margin).min(center) } else { xa };
        let right_shoulder = if pointed_right { (xb - margin).max(center) } else { xb };

        let mut polygon = Vec::with_capacity(6);
        let mut outline = Vec::with_capacity(6);
        if pointed_left {
            polygon.push(Point::new(xa, levels.middle));
            outline.push((Point::new(xa, levels.middle), Point::new(left_shoulder, levels.high)));
            outline.push((Point::new(xa, levels.middle), Point::new(left_shoulder, levels.low)));
        }
        polygon.push(Point::new(left_shoulder, levels.high));
        polygon.push(Point::new(right_shoulder, levels.high));
        if pointed_right {
            polygon.push(Point::new(xb, levels.middle));
            outline.push((Point::new(right_shoulder, levels.high), Point::new(xb, levels.middle)));
            outline.push((Point::new(right_shoulder, levels.low), Point::new(xb, levels.middle)));
        }
        polygon.push(Point::new(right_shoulder, levels.low));
        polygon.push(Point::new(left_shoulder, levels.low));
        outline.push((Point::new(left_shoulder, levels.high), Point::new(right_shoulder, levels.high)));
        outline.push((Point::new(left_shoulder, levels.low), Point::new(right_shoulder, levels.low)));

        let label = match value {
            BusValue::Text(text) => Some((text.clone(), Point::new(center, label_y))),
            _ => None,
        };
        shapes.push(BusShape::Filled {
            polygon,
            fill,
            outline,
            label,
        });
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(start: i64, end: i64, delay: i64) -> Timeline {
        Timeline {
            start,
            end,
            step: None,
            delay,
        }
    }

    fn scale(timeline: &Timeline) -> TimeScale {
        // Ten pixels per time unit.
        TimeScale::new(
            timeline,
            Rect::new(0.0, 0.0, timeline.span() * 10.0, 100.0),
        )
    }

    fn change_list(line: &Line) -> Vec<(f64, LineValue)> {
        line.changes().iter().map(|(t, v)| (t, *v)).collect()
    }

    #[test]
    fn test_clock_expansion_half_duty() {
        let clock = Clock::new("clk", 0.0, 4.0, 0.5).unwrap();
        let line = clock_to_line(&clock, &timeline(0, 10, 0));
        assert_eq!(line.name(), "clk");
        assert_eq!(line.start(), LineValue::Low);
        assert_eq!(
            change_list(&line),
            vec![
                (2.0, LineValue::High),
                (4.0, LineValue::Low),
                (6.0, LineValue::High),
                (8.0, LineValue::Low),
            ]
        );
    }

    #[test]
    fn test_clock_edge_cap_keeps_last_edge() {
        let clock = Clock::new("fast", 0.0, 1.0, 0.5).unwrap();
        let line = clock_to_line(&clock, &timeline(0, 1_000_000, 0));
        assert_eq!(line.changes().len(), MAX_CLOCK_EDGES);
        assert_eq!(line.changes().iter().last(), Some((50_000.0, &LineValue::Low)));
    }

    #[test]
    fn test_clock_phase_before_start() {
        // Cycles at ..., -1, 3, 7, ... rise one unit in.
        let clock = Clock::new("clk", 3.0, 4.0, 0.75).unwrap();
        let line = clock_to_line(&clock, &timeline(0, 8, 0));
        assert_eq!(line.start(), LineValue::High);
        assert_eq!(
            change_list(&line),
            vec![(3.0, LineValue::Low), (4.0, LineValue::High), (7.0, LineValue::Low)]
        );
    }

    #[test]
    fn test_line_strokes_flat_then_transition() {
        let timeline = timeline(0, 10, 2);
        let scale = scale(&timeline);
        let levels = Levels::of(Rect::new(0.0, 0.0, 100.0, 100.0));
        let changes = Changes::from_pairs([(5.0, LineValue::High)]).unwrap();
        let line = Line::new("A", LineValue::Low, changes).unwrap();

        let strokes = line_strokes(&line, &timeline, &scale, &levels);
        // Low run, rise, high run.
        assert_eq!(strokes.len(), 3);
        assert_eq!(strokes[0], (Point::new(1.0, 70.0), Point::new(40.0, 70.0)));
        assert_eq!(strokes[1], (Point::new(40.0, 70.0), Point::new(60.0, 30.0)));
        assert_eq!(strokes[2].0, Point::new(61.0, 30.0));
        assert_eq!(strokes[2].1, Point::new(99.0, 30.0));
    }

    #[test]
    fn test_unknown_line_without_changes_draws_rails() {
        let timeline = timeline(0, 10, 2);
        let scale = scale(&timeline);
        let levels = Levels::of(Rect::new(0.0, 0.0, 100.0, 100.0));
        let line = Line::new("A", LineValue::Unknown, Changes::new()).unwrap();

        let strokes = line_strokes(&line, &timeline, &scale, &levels);
        assert_eq!(strokes.len(), 4);
        assert!(strokes.iter().all(|(a, b)| a.y == b.y));
        assert!(strokes.iter().any(|(a, _)| a.y == levels.high));
        assert!(strokes.iter().any(|(a, _)| a.y == levels.low));
    }

    #[test]
    fn test_bus_chevrons() {
        let timeline = timeline(0, 10, 2);
        let scale = scale(&timeline);
        let band = Rect::new(0.0, 0.0, 100.0, 100.0);
        let changes = Changes::from_pairs([
            (4.0, BusValue::Unknown),
            (7.0, BusValue::Floating),
        ])
        .unwrap();
        let bus = Bus::new("D", BusValue::Text("A".to_string()), changes);

        let shapes = bus_shapes(&bus, &timeline, &scale, band, Color::WHITE, 20.0);
        assert_eq!(shapes.len(), 3);

        match &shapes[0] {
            BusShape::Filled { polygon, fill, label, .. } => {
                // Flat at the frame edge, pointed at the change.
                assert_eq!(polygon.len(), 5);
                assert_eq!(*fill, Color::WHITE);
                assert_eq!(polygon[0], Point::new(0.0, 30.0));
                assert_eq!(polygon[2], Point::new(40.0, 50.0));
                let (text, center) = label.clone().unwrap();
                assert_eq!(text, "A");
                assert_eq!(center, Point::new(20.0, 48.0));
            }
            other => panic!("unexpected shape {other:?}"),
        }
        match &shapes[1] {
            BusShape::Filled { polygon, fill, label, .. } => {
                assert_eq!(polygon.len(), 6);
                assert_eq!(*fill, Color::UNKNOWN_FILL);
                assert!(label.is_none());
                let xs: Vec<f64> = polygon.iter().map(|p| p.x).collect();
                assert_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 40.0);
                assert_eq!(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 70.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(
            shapes[2],
            BusShape::Floating {
                from: Point::new(70.0, 50.0),
                to: Point::new(99.0, 50.0),
            }
        );
    }

    #[test]
    fn test_bus_without_changes_is_one_interval() {
        let timeline = timeline(0, 10, 2);
        let scale = scale(&timeline);
        let bus = Bus::new("D", BusValue::Text("idle".to_string()), Changes::new());
        let shapes = bus_shapes(&bus, &timeline, &scale, Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE, 20.0);
        assert_eq!(shapes.len(), 1);
        match &shapes[0] {
            BusShape::Filled { polygon, .. } => assert_eq!(polygon.len(), 4),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_narrow_interval_shoulders_meet() {
        let timeline = timeline(0, 10, 4);
        let scale = scale(&timeline);
        let changes = Changes::from_pairs([
            (4.0, BusValue::Text("B".to_string())),
            (5.0, BusValue::Text("C".to_string())),
        ])
        .unwrap();
        let bus = Bus::new("D", BusValue::Text("A".to_string()), changes);
        let shapes = bus_shapes(&bus, &timeline, &scale, Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE, 20.0);
        match &shapes[1] {
            BusShape::Filled { polygon, .. } => {
                assert_eq!(polygon[1].x, 45.0);
                assert_eq!(polygon[2].x, 45.0);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }
}
