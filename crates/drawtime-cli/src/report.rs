//! Terminal reports for descriptions
//!
//! Formats syntax errors with the offending source line highlighted and
//! summarises parsed diagrams. ANSI colours come from crossterm.

use std::fmt::Write as _;

use crossterm::style::{Color, Stylize};
use drawtime::timing::{Signal, TimingDiagram};
use drawtime::SyntaxError;

fn paint(text: &str, color: Color, colorize: bool) -> String {
    if colorize {
        format!("{}", text.with(color).bold())
    } else {
        text.to_string()
    }
}

/// Describe `error` with the source line it points at
///
/// The line is quoted as written, with carets under its non-blank part.
pub fn format_error(source: &str, error: &SyntaxError, colorize: bool) -> String {
    let mut report = String::new();
    let _ = writeln!(
        report,
        "{}: {}",
        paint(&format!("error[{}]", error.kind.code()), Color::Red, colorize),
        error.message()
    );

    let number = error.line_number.to_string();
    let gutter = " ".repeat(number.len());
    let _ = writeln!(report, "{gutter}{} line {}", paint("-->", Color::Blue, colorize), error.line_number);

    let raw = error
        .line_number
        .checked_sub(1)
        .and_then(|index| source.lines().nth(index))
        .unwrap_or(error.line_text.as_str());
    let indent = raw.len() - raw.trim_start().len();
    let marker = format!(
        "{}{}",
        " ".repeat(indent),
        "^".repeat(error.line_text.chars().count().max(1))
    );

    let bar = paint("|", Color::Blue, colorize);
    let _ = writeln!(report, "{gutter} {bar}");
    let _ = writeln!(report, "{} {bar} {}", paint(&number, Color::Blue, colorize), raw.trim_end());
    let _ = writeln!(report, "{gutter} {bar} {}", paint(&marker, Color::Red, colorize));
    report
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// A short human readable overview of a parsed diagram
pub fn summary(diagram: &TimingDiagram) -> String {
    let style = diagram.style();
    let timeline = diagram.timeline();
    let mut text = String::new();

    let _ = writeln!(
        text,
        "{}x{} px, margin {}, font \"{}\" {}pt, colours {} on {}",
        style.width,
        style.height,
        style.margin,
        style.font_family,
        style.font_size,
        style.foreground,
        style.background
    );
    let step = timeline
        .step
        .map_or_else(|| "none".to_string(), |step| step.to_string());
    let _ = writeln!(
        text,
        "time {}..{}, step {step}, delay {}",
        timeline.start, timeline.end, timeline.delay
    );

    let name_width = diagram
        .signals()
        .iter()
        .map(|signal| signal.name().chars().count())
        .max()
        .unwrap_or(0);
    let _ = writeln!(text, "{}:", plural(diagram.signals().len(), "signal"));
    for signal in diagram.signals() {
        let details = match signal {
            Signal::Line(line) => format!(
                "start {}, {}",
                line.start().token(),
                plural(line.changes().len(), "change")
            ),
            Signal::Bus(bus) => format!(
                "start {}, {}",
                bus.start().token(),
                plural(bus.changes().len(), "change")
            ),
            Signal::Clock(clock) => format!(
                "offset {}, length {}, duty {}",
                clock.offset(),
                clock.length(),
                clock.duty()
            ),
        };
        let _ = writeln!(
            text,
            "  {:<5} {:<name_width$}  {details}",
            signal.kind().keyword(),
            signal.name()
        );
    }
    text
}
