//! Description writer
//!
//! Formats a [`TimingDiagram`] back into description text. The output is
//! canonical: a full `style` block, a full `time` block, then the signals in
//! order, each change on its own line in ascending time.

use std::fmt::{self, Write};

use super::model::{Changes, Signal, Style, Timeline, TimingDiagram};

const INDENT: &str = "  ";

impl TimingDiagram {
    /// Description text that parses back to an equal diagram
    pub fn to_description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimingDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_style(f, self.style())?;
        write_timeline(f, self.timeline())?;
        for signal in self.signals() {
            write_signal(f, signal)?;
        }
        Ok(())
    }
}

fn property(f: &mut impl Write, name: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{INDENT}{name} = {value}")
}

fn write_style(f: &mut impl Write, style: &Style) -> fmt::Result {
    writeln!(f, "style:")?;
    property(f, "width", style.width)?;
    property(f, "height", style.height)?;
    property(f, "margin", style.margin)?;
    property(f, "font_size", style.font_size)?;
    property(f, "font_family", &style.font_family)?;
    property(f, "background", style.background.to_hex())?;
    property(f, "foreground", style.foreground.to_hex())
}

fn write_timeline(f: &mut impl Write, timeline: &Timeline) -> fmt::Result {
    writeln!(f, "time:")?;
    property(f, "start", timeline.start)?;
    property(f, "end", timeline.end)?;
    if let Some(step) = timeline.step {
        property(f, "step", step)?;
    }
    property(f, "delay", timeline.delay)
}

fn write_changes<V>(
    f: &mut impl Write,
    changes: &Changes<V>,
    token: impl Fn(&V) -> String,
) -> fmt::Result {
    for (time, value) in changes.iter() {
        writeln!(f, "{INDENT}{time} -> {}", token(value))?;
    }
    Ok(())
}

fn write_signal(f: &mut impl Write, signal: &Signal) -> fmt::Result {
    writeln!(f, "{} {}:", signal.kind().keyword(), signal.name())?;
    match signal {
        Signal::Line(line) => {
            property(f, "start", line.start().token())?;
            write_changes(f, line.changes(), |value| value.token().to_string())
        }
        Signal::Bus(bus) => {
            property(f, "start", bus.start().token())?;
            write_changes(f, bus.changes(), |value| value.token())
        }
        Signal::Clock(clock) => {
            property(f, "offset", clock.offset())?;
            property(f, "length", clock.length())?;
            property(f, "duty", clock.duty())
        }
    }
}
