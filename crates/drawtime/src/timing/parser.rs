//! Timing description parser
//!
//! Parsing runs in two passes over the numbered, non-blank lines:
//!
//! 1. **Grouping** feeds every line through a small state machine that
//!    opens a block on each `kind [args]:` header and files body lines
//!    under the open block.
//! 2. **Assembly** interprets the `style`, `time` and signal blocks (in that
//!    order) and builds the [`TimingDiagram`].
//!
//! The first offending line aborts parsing with a [`SyntaxError`].

use tracing::{debug, info, span, trace, Level};

use super::model::{
    Bus, BusValue, Changes, Clock, Line, LineValue, Signal, SignalKind, Style, Timeline,
    TimingDiagram,
};
use crate::core::{Color, ModelError, Parser, SyntaxError, SyntaxErrorKind};

/// Parser for the timing description language
pub struct TimingParser;

impl TimingParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for TimingParser {
    type Output = TimingDiagram;

    fn parse(&self, input: &str) -> Result<TimingDiagram, SyntaxError> {
        let parse_span = span!(Level::INFO, "parse_timing", input_len = input.len());
        let _enter = parse_span.enter();

        let result = parse_description(input);
        match &result {
            Ok(diagram) => info!(signal_count = diagram.signals().len(), "Parsing completed"),
            Err(error) => debug!(
                kind = %error.kind,
                line_number = error.line_number,
                "Rejected description"
            ),
        }
        result
    }

    fn name(&self) -> &'static str {
        "timing"
    }

    fn version(&self) -> &'static str {
        "0.3.0"
    }
}

/// A trimmed source line with its 1-based number in the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceLine<'a> {
    number: usize,
    text: &'a str,
}

impl SourceLine<'_> {
    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.number, self.text)
    }

    fn model_error(&self, error: &ModelError) -> SyntaxError {
        self.error(error.syntax_kind())
    }
}

fn numbered_lines(input: &str) -> impl Iterator<Item = SourceLine<'_>> {
    input
        .lines()
        .enumerate()
        .map(|(index, text)| SourceLine {
            number: index + 1,
            text: text.trim(),
        })
        .filter(|line| !line.text.is_empty() && !line.text.starts_with('#'))
}

/// Parse a complete description
pub fn parse_description(input: &str) -> Result<TimingDiagram, SyntaxError> {
    let mut grouper = Grouper::new();
    let mut last_line = None;
    for line in numbered_lines(input) {
        grouper.feed(line)?;
        last_line = Some(line);
    }
    let blocks = grouper.finish()?;
    debug!(
        style_lines = blocks.style.len(),
        time_lines = blocks.time.len(),
        signal_blocks = blocks.signals.len(),
        "Grouped description into blocks"
    );

    let style = parse_style(&blocks.style)?;
    let timeline = parse_timeline(&blocks.time)?;
    let signals = blocks
        .signals
        .iter()
        .map(parse_signal)
        .collect::<Result<Vec<_>, _>>()?;

    TimingDiagram::new(style, timeline, signals).map_err(|error| {
        last_line
            .unwrap_or(SourceLine { number: 0, text: "" })
            .model_error(&error)
    })
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SignalBlock<'a> {
    kind: SignalKind,
    name: Option<&'a str>,
    header: SourceLine<'a>,
    lines: Vec<SourceLine<'a>>,
}

#[derive(Debug, Default)]
struct Blocks<'a> {
    time: Vec<SourceLine<'a>>,
    style: Vec<SourceLine<'a>>,
    signals: Vec<SignalBlock<'a>>,
}

/// Which block body lines currently belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState<'a> {
    NoBlock,
    InTime {
        header: SourceLine<'a>,
        collected: usize,
    },
    InStyle {
        header: SourceLine<'a>,
        collected: usize,
    },
    InSignal {
        header: SourceLine<'a>,
        collected: usize,
    },
}

impl<'a> GroupState<'a> {
    /// Header of the open block if it has no body lines yet
    fn empty_header(&self) -> Option<SourceLine<'a>> {
        match *self {
            GroupState::NoBlock => None,
            GroupState::InTime { header, collected }
            | GroupState::InStyle { header, collected }
            | GroupState::InSignal { header, collected } => (collected == 0).then_some(header),
        }
    }
}

struct Grouper<'a> {
    state: GroupState<'a>,
    blocks: Blocks<'a>,
}

impl<'a> Grouper<'a> {
    fn new() -> Self {
        Self {
            state: GroupState::NoBlock,
            blocks: Blocks::default(),
        }
    }

    fn feed(&mut self, line: SourceLine<'a>) -> Result<(), SyntaxError> {
        match line.text.strip_suffix(':') {
            Some(header) => self.open(line, header),
            None => self.collect(line),
        }
    }

    fn open(&mut self, line: SourceLine<'a>, header: &'a str) -> Result<(), SyntaxError> {
        self.ensure_not_empty(line)?;
        if header.is_empty() {
            return Err(line.error(SyntaxErrorKind::OrphanColon));
        }

        let (keyword, args) = match header.split_once(char::is_whitespace) {
            Some((keyword, args)) => (keyword, args.trim()),
            None => (header, ""),
        };
        trace!(keyword, line_number = line.number, "Opening block");

        self.state = match keyword {
            "time" if args.is_empty() => GroupState::InTime {
                header: line,
                collected: self.blocks.time.len(),
            },
            "time" => return Err(line.error(SyntaxErrorKind::TimeArgs)),
            "style" if args.is_empty() => GroupState::InStyle {
                header: line,
                collected: self.blocks.style.len(),
            },
            "style" => return Err(line.error(SyntaxErrorKind::StyleArgs)),
            other => {
                let kind = SignalKind::from_keyword(other)
                    .ok_or_else(|| line.error(SyntaxErrorKind::UnknownBlock))?;
                self.blocks.signals.push(SignalBlock {
                    kind,
                    name: (!args.is_empty()).then_some(args),
                    header: line,
                    lines: Vec::new(),
                });
                GroupState::InSignal {
                    header: line,
                    collected: 0,
                }
            }
        };
        Ok(())
    }

    fn collect(&mut self, line: SourceLine<'a>) -> Result<(), SyntaxError> {
        match &mut self.state {
            GroupState::NoBlock => return Err(line.error(SyntaxErrorKind::OrphanLine)),
            GroupState::InTime { collected, .. } => {
                *collected += 1;
                self.blocks.time.push(line);
            }
            GroupState::InStyle { collected, .. } => {
                *collected += 1;
                self.blocks.style.push(line);
            }
            GroupState::InSignal { collected, .. } => {
                *collected += 1;
                if let Some(block) = self.blocks.signals.last_mut() {
                    block.lines.push(line);
                }
            }
        }
        Ok(())
    }

    /// Fail on `at` if the open block has collected nothing
    fn ensure_not_empty(&self, at: SourceLine<'_>) -> Result<(), SyntaxError> {
        if self.state.empty_header().is_some() {
            return Err(at.error(SyntaxErrorKind::EmptyBlock));
        }
        Ok(())
    }

    fn finish(self) -> Result<Blocks<'a>, SyntaxError> {
        // An empty block at the end of input is the last line read.
        if let Some(header) = self.state.empty_header() {
            return Err(header.error(SyntaxErrorKind::EmptyBlock));
        }
        Ok(self.blocks)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Assign,
    Change,
}

/// Split a body line on `->` (when allowed and present) or on `=`
fn split_body<'a>(
    line: SourceLine<'a>,
    allow_change: bool,
) -> Result<(&'a str, Operator, &'a str), SyntaxError> {
    let (delimiter, operator) = if allow_change && line.text.contains("->") {
        ("->", Operator::Change)
    } else {
        ("=", Operator::Assign)
    };
    let (lhs, rhs) = line
        .text
        .split_once(delimiter)
        .ok_or_else(|| line.error(SyntaxErrorKind::MalformedLine))?;
    Ok((lhs.trim(), operator, rhs.trim()))
}

fn parse_int(raw: &str, line: SourceLine<'_>) -> Result<i64, SyntaxError> {
    raw.parse().map_err(|_| line.error(SyntaxErrorKind::BadInt))
}

fn parse_float(raw: &str, line: SourceLine<'_>) -> Result<f64, SyntaxError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(line.error(SyntaxErrorKind::BadFloat)),
    }
}

/// A size property as pixels; `allow_zero` only for the margin
fn parse_size(raw: &str, line: SourceLine<'_>, allow_zero: bool) -> Result<u32, SyntaxError> {
    let value = parse_int(raw, line)?;
    let minimum = if allow_zero { 0 } else { 1 };
    if value < minimum {
        return Err(line.error(SyntaxErrorKind::BadSize));
    }
    u32::try_from(value).map_err(|_| line.error(SyntaxErrorKind::BadSize))
}

fn parse_style(lines: &[SourceLine<'_>]) -> Result<Style, SyntaxError> {
    let mut style = Style::default();
    let mut size_line = None;

    for &line in lines {
        let (property, _, value) = split_body(line, false)?;
        match property {
            "width" => style.width = parse_size(value, line, false)?,
            "height" => style.height = parse_size(value, line, false)?,
            "margin" => style.margin = parse_size(value, line, true)?,
            "font_size" => style.font_size = parse_size(value, line, false)?,
            "font_family" => style.font_family = value.to_string(),
            "background" | "foreground" => {
                let color =
                    Color::from_hex(value).ok_or_else(|| line.error(SyntaxErrorKind::BadColor))?;
                if property == "background" {
                    style.background = color;
                } else {
                    style.foreground = color;
                }
            }
            _ => return Err(line.error(SyntaxErrorKind::StyleProp)),
        }
        if matches!(property, "width" | "height" | "margin") {
            size_line = Some(line);
        }
    }

    if let Err(error) = style.validate() {
        let line = size_line.or(lines.last().copied());
        return Err(line
            .unwrap_or(SourceLine { number: 0, text: "" })
            .model_error(&error));
    }
    debug!(width = style.width, height = style.height, "Parsed style block");
    Ok(style)
}

fn parse_timeline(lines: &[SourceLine<'_>]) -> Result<Timeline, SyntaxError> {
    let mut timeline = Timeline::default();
    let mut range_line = None;

    for &line in lines {
        let (property, _, value) = split_body(line, false)?;
        match property {
            "start" | "end" => {
                let value = parse_int(value, line)?;
                if property == "start" {
                    timeline.start = value;
                } else {
                    timeline.end = value;
                }
                range_line = Some(line);
            }
            "step" => {
                let step = parse_int(value, line)?;
                if step <= 0 {
                    return Err(line.error(SyntaxErrorKind::BadStep));
                }
                timeline.step = Some(step);
            }
            "delay" => {
                let delay = parse_int(value, line)?;
                if delay < 0 {
                    return Err(line.error(SyntaxErrorKind::BadDelay));
                }
                timeline.delay = delay;
            }
            _ => return Err(line.error(SyntaxErrorKind::TimeProp)),
        }
    }

    if let Err(error) = timeline.validate() {
        let line = range_line.or(lines.last().copied());
        return Err(line
            .unwrap_or(SourceLine { number: 0, text: "" })
            .model_error(&error));
    }
    debug!(
        start = timeline.start,
        end = timeline.end,
        step = ?timeline.step,
        delay = timeline.delay,
        "Parsed time block"
    );
    Ok(timeline)
}

/// Values a change-driven signal can take
trait SignalValue: Sized {
    /// Error reported for a token that is not a value of this signal
    const INVALID: SyntaxErrorKind;

    fn from_token(token: &str) -> Result<Self, ModelError>;

    /// Error reported when a signal may start at, but not change to, this value
    fn change_error(&self) -> Option<SyntaxErrorKind> {
        None
    }
}

impl SignalValue for LineValue {
    const INVALID: SyntaxErrorKind = SyntaxErrorKind::LineValue;

    fn from_token(token: &str) -> Result<Self, ModelError> {
        LineValue::from_token(token)
    }

    fn change_error(&self) -> Option<SyntaxErrorKind> {
        (*self == LineValue::Unknown).then_some(SyntaxErrorKind::LineUnknown)
    }
}

impl SignalValue for BusValue {
    const INVALID: SyntaxErrorKind = SyntaxErrorKind::BusValue;

    fn from_token(token: &str) -> Result<Self, ModelError> {
        BusValue::from_token(token)
    }
}

fn parse_value<V: SignalValue>(token: &str, line: SourceLine<'_>) -> Result<V, SyntaxError> {
    V::from_token(token).map_err(|_| line.error(V::INVALID))
}

/// Name of a signal block, checked once its body has been read
fn block_name<'a>(block: &SignalBlock<'a>) -> Result<&'a str, SyntaxError> {
    block
        .name
        .ok_or_else(|| block.header.error(SyntaxErrorKind::SignalArgs))
}

fn missing_property(block: &SignalBlock<'_>) -> SyntaxError {
    block
        .lines
        .last()
        .unwrap_or(&block.header)
        .error(SyntaxErrorKind::MissingProp)
}

fn parse_signal(block: &SignalBlock<'_>) -> Result<Signal, SyntaxError> {
    let signal = match block.kind {
        SignalKind::Line => {
            let (name, start, changes) = parse_driven::<LineValue>(block)?;
            let line = Line::new(name, start, changes)
                .map_err(|error| block.header.model_error(&error))?;
            Signal::Line(line)
        }
        SignalKind::Bus => {
            let (name, start, changes) = parse_driven::<BusValue>(block)?;
            Signal::Bus(Bus::new(name, start, changes))
        }
        SignalKind::Clock => Signal::Clock(parse_clock(block)?),
    };
    debug!(signal = signal.name(), kind = ?signal.kind(), "Parsed signal");
    Ok(signal)
}

/// Body of a `line` or `bus` block: a start value and timed changes
fn parse_driven<'a, V: SignalValue>(
    block: &SignalBlock<'a>,
) -> Result<(&'a str, V, Changes<V>), SyntaxError> {
    let mut start = None;
    let mut changes = Changes::new();

    for &line in &block.lines {
        match split_body(line, true)? {
            (time, Operator::Change, value) => {
                let time = parse_float(time, line)?;
                if changes.contains(time) {
                    return Err(line.error(SyntaxErrorKind::ChangeDupe));
                }
                let value: V = parse_value(value, line)?;
                if let Some(kind) = value.change_error() {
                    return Err(line.error(kind));
                }
                changes
                    .insert(time, value)
                    .map_err(|error| line.model_error(&error))?;
            }
            ("start", Operator::Assign, value) => start = Some(parse_value(value, line)?),
            (_, Operator::Assign, _) => return Err(line.error(SyntaxErrorKind::SignalProp)),
        }
    }

    let name = block_name(block)?;
    let start = start.ok_or_else(|| missing_property(block))?;
    trace!(signal = name, change_count = changes.len(), "Collected signal changes");
    Ok((name, start, changes))
}

fn parse_clock(block: &SignalBlock<'_>) -> Result<Clock, SyntaxError> {
    let (mut offset, mut length, mut duty) = (None, None, None);

    for &line in &block.lines {
        let (property, operator, value) = split_body(line, true)?;
        if operator == Operator::Change {
            return Err(line.error(SyntaxErrorKind::ClockChange));
        }
        match property {
            "offset" => offset = Some(parse_float(value, line)?),
            "length" => {
                let value = parse_float(value, line)?;
                if value <= 0.0 {
                    return Err(line.error(SyntaxErrorKind::BadLength));
                }
                length = Some(value);
            }
            "duty" => {
                let value = parse_float(value, line)?;
                if value <= 0.0 || value >= 1.0 {
                    return Err(line.error(SyntaxErrorKind::BadDuty));
                }
                duty = Some(value);
            }
            _ => return Err(line.error(SyntaxErrorKind::SignalProp)),
        }
    }

    let name = block_name(block)?;
    match (offset, length, duty) {
        (Some(offset), Some(length), Some(duty)) => {
            Clock::new(name, offset, length, duty).map_err(|error| block.header.model_error(&error))
        }
        _ => Err(missing_property(block)),
    }
}
