//! Timing diagram model
//!
//! Plain, immutable value types. Every constructor checks its invariants,
//! so a model that exists is a model the renderer can draw.

use serde::Serialize;
use tracing::trace;

use super::literal;
use crate::core::{Color, FontSpec, ModelError};

/// Image size, margins, font and colours
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Style {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub font_size: u32,
    pub font_family: String,
    pub background: Color,
    pub foreground: Color,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 20,
            font_size: 12,
            font_family: "Times New Roman".to_string(),
            background: Color::WHITE,
            foreground: Color::BLACK,
        }
    }
}

impl Style {
    pub fn validate(&self) -> Result<(), ModelError> {
        for (property, value) in [
            ("width", self.width),
            ("height", self.height),
            ("font_size", self.font_size),
        ] {
            if value == 0 {
                return Err(ModelError::ZeroSize { property });
            }
        }
        let margin = u64::from(self.margin) * 2;
        if margin >= u64::from(self.width) || margin >= u64::from(self.height) {
            return Err(ModelError::MarginTooLarge {
                margin: self.margin,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.font_family.clone(), self.font_size)
    }
}

/// The visible time window and transition timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub start: i64,
    pub end: i64,
    /// Width of the labelled columns, if any
    pub step: Option<i64>,
    /// Duration of a signal transition
    pub delay: i64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            start: 0,
            end: 100,
            step: None,
            delay: 10,
        }
    }
}

impl Timeline {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.end <= self.start {
            return Err(ModelError::EmptyTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if let Some(step) = self.step {
            if step <= 0 {
                return Err(ModelError::InvalidStep { step });
            }
        }
        if self.delay < 0 {
            return Err(ModelError::NegativeDelay { delay: self.delay });
        }
        Ok(())
    }

    /// Length of the window in time units
    pub fn span(&self) -> f64 {
        self.end as f64 - self.start as f64
    }
}

/// Value of a single-bit line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineValue {
    Low,
    High,
    Floating,
    Unknown,
}

impl LineValue {
    pub fn from_token(token: &str) -> Result<Self, ModelError> {
        match token {
            "0" => Ok(Self::Low),
            "1" => Ok(Self::High),
            "Z" => Ok(Self::Floating),
            "?" => Ok(Self::Unknown),
            _ => Err(ModelError::InvalidLineValue {
                token: token.to_string(),
            }),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Low => "0",
            Self::High => "1",
            Self::Floating => "Z",
            Self::Unknown => "?",
        }
    }
}

impl From<bool> for LineValue {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Value carried by a bus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusValue {
    Floating,
    Unknown,
    Text(String),
}

impl BusValue {
    /// Parse `Z`, `?` or a quoted string literal
    pub fn from_token(token: &str) -> Result<Self, ModelError> {
        match token {
            "Z" => Ok(Self::Floating),
            "?" => Ok(Self::Unknown),
            _ => literal::parse_string(token)
                .map(Self::Text)
                .ok_or_else(|| ModelError::InvalidBusValue {
                    token: token.to_string(),
                }),
        }
    }

    /// The token that parses back to this value
    pub fn token(&self) -> String {
        match self {
            Self::Floating => "Z".to_string(),
            Self::Unknown => "?".to_string(),
            Self::Text(text) => literal::quote(text),
        }
    }
}

/// Value changes of a signal, kept in ascending time order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Changes<V> {
    entries: Vec<(f64, V)>,
}

impl<V> Changes<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a change, rejecting non-finite and duplicate times
    pub fn insert(&mut self, time: f64, value: V) -> Result<(), ModelError> {
        if !time.is_finite() {
            return Err(ModelError::NonFiniteTime { time });
        }
        let time = normalize_zero(time);
        match self.position(time) {
            Ok(_) => Err(ModelError::DuplicateChangeTime { time }),
            Err(index) => {
                self.entries.insert(index, (time, value));
                Ok(())
            }
        }
    }

    pub fn contains(&self, time: f64) -> bool {
        self.position(normalize_zero(time)).is_ok()
    }

    fn position(&self, time: f64) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(existing, _)| existing.total_cmp(&time))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &V)> + '_ {
        self.entries.iter().map(|(time, value)| (*time, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<(f64, &V)> {
        self.entries.last().map(|(time, value)| (*time, value))
    }

    /// Drop the latest change
    pub fn pop(&mut self) -> Option<(f64, V)> {
        self.entries.pop()
    }

    /// Set the value at `time`, replacing any change already there
    pub(crate) fn record(&mut self, time: f64, value: V) {
        let time = normalize_zero(time);
        match self.position(time) {
            Ok(index) => self.entries[index].1 = value,
            Err(index) => self.entries.insert(index, (time, value)),
        }
    }
}

/// `-0.0` and `0.0` are the same instant
fn normalize_zero(time: f64) -> f64 {
    time + 0.0
}

impl<V> Default for Changes<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Changes<V> {
    /// Collect `(time, value)` pairs in any order
    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, V)>) -> Result<Self, ModelError> {
        let mut changes = Self::new();
        for (time, value) in pairs {
            changes.insert(time, value)?;
        }
        Ok(changes)
    }
}

/// A single-bit signal driven by explicit changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    name: String,
    start: LineValue,
    changes: Changes<LineValue>,
}

impl Line {
    /// Only the start value may be [`LineValue::Unknown`]
    pub fn new(
        name: impl Into<String>,
        start: LineValue,
        changes: Changes<LineValue>,
    ) -> Result<Self, ModelError> {
        if let Some((time, _)) = changes
            .iter()
            .find(|(_, value)| **value == LineValue::Unknown)
        {
            return Err(ModelError::LineChangeToUnknown { time });
        }
        Ok(Self {
            name: name.into(),
            start,
            changes,
        })
    }

    /// Changes generated internally are never unknown
    pub(crate) fn from_parts(
        name: impl Into<String>,
        start: LineValue,
        changes: Changes<LineValue>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            changes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> LineValue {
        self.start
    }

    pub fn changes(&self) -> &Changes<LineValue> {
        &self.changes
    }
}

/// A multi-bit signal whose values are labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bus {
    name: String,
    start: BusValue,
    changes: Changes<BusValue>,
}

impl Bus {
    pub fn new(name: impl Into<String>, start: BusValue, changes: Changes<BusValue>) -> Self {
        Self {
            name: name.into(),
            start,
            changes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> &BusValue {
        &self.start
    }

    pub fn changes(&self) -> &Changes<BusValue> {
        &self.changes
    }
}

/// A periodic signal generated from its phase, period and duty cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clock {
    name: String,
    offset: f64,
    length: f64,
    duty: f64,
}

impl Clock {
    pub fn new(
        name: impl Into<String>,
        offset: f64,
        length: f64,
        duty: f64,
    ) -> Result<Self, ModelError> {
        for (property, value) in [("offset", offset), ("length", length), ("duty", duty)] {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteClock { property, value });
            }
        }
        if length <= 0.0 {
            return Err(ModelError::InvalidClockLength { length });
        }
        if duty <= 0.0 || duty >= 1.0 {
            return Err(ModelError::InvalidDutyCycle { duty });
        }
        Ok(Self {
            name: name.into(),
            offset,
            length,
            duty,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn duty(&self) -> f64 {
        self.duty
    }
}

/// The three kinds of signal block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Line,
    Bus,
    Clock,
}

impl SignalKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "line" => Some(Self::Line),
            "bus" => Some(Self::Bus),
            "clock" => Some(Self::Clock),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bus => "bus",
            Self::Clock => "clock",
        }
    }

    /// Properties a block of this kind must define, in canonical order
    pub fn properties(&self) -> &'static [&'static str] {
        match self {
            Self::Line | Self::Bus => &["start"],
            Self::Clock => &["offset", "length", "duty"],
        }
    }
}

/// One horizontal track of the diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    Line(Line),
    Bus(Bus),
    Clock(Clock),
}

impl Signal {
    pub fn name(&self) -> &str {
        match self {
            Signal::Line(line) => line.name(),
            Signal::Bus(bus) => bus.name(),
            Signal::Clock(clock) => clock.name(),
        }
    }

    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Line(_) => SignalKind::Line,
            Signal::Bus(_) => SignalKind::Bus,
            Signal::Clock(_) => SignalKind::Clock,
        }
    }
}

impl From<Line> for Signal {
    fn from(line: Line) -> Self {
        Signal::Line(line)
    }
}

impl From<Bus> for Signal {
    fn from(bus: Bus) -> Self {
        Signal::Bus(bus)
    }
}

impl From<Clock> for Signal {
    fn from(clock: Clock) -> Self {
        Signal::Clock(clock)
    }
}

/// A complete timing diagram
///
/// Signals are drawn top to bottom in the order given here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingDiagram {
    style: Style,
    timeline: Timeline,
    signals: Vec<Signal>,
}

impl TimingDiagram {
    pub fn new(
        style: Style,
        timeline: Timeline,
        signals: Vec<Signal>,
    ) -> Result<Self, ModelError> {
        style.validate()?;
        timeline.validate()?;
        trace!(signal_count = signals.len(), "Built timing diagram");
        Ok(Self {
            style,
            timeline,
            signals,
        })
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

impl Default for TimingDiagram {
    fn default() -> Self {
        Self {
            style: Style::default(),
            timeline: Timeline::default(),
            signals: Vec::new(),
        }
    }
}
