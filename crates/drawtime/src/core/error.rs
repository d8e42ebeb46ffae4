//! Core error types for diagram processing
//!
//! Three disjoint families: [`SyntaxError`] for description text the parser
//! rejects, [`ModelError`] for model invariants violated at construction,
//! and [`RenderError`] for failures while drawing or exporting.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Every way a timing description can be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    UnknownBlock,
    EmptyBlock,
    OrphanColon,
    OrphanLine,
    TimeArgs,
    StyleArgs,
    SignalArgs,
    MalformedLine,
    TimeProp,
    StyleProp,
    SignalProp,
    BadInt,
    BadFloat,
    BadColor,
    ClockChange,
    LineValue,
    BusValue,
    LineUnknown,
    ChangeDupe,
    MissingProp,
    BadSize,
    BadMargin,
    TimeRange,
    BadStep,
    BadDelay,
    BadLength,
    BadDuty,
}

impl SyntaxErrorKind {
    /// Stable snake_case identifier of the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownBlock => "unknown_block",
            Self::EmptyBlock => "empty_block",
            Self::OrphanColon => "orphan_colon",
            Self::OrphanLine => "orphan_line",
            Self::TimeArgs => "time_args",
            Self::StyleArgs => "style_args",
            Self::SignalArgs => "signal_args",
            Self::MalformedLine => "malformed_line",
            Self::TimeProp => "time_prop",
            Self::StyleProp => "style_prop",
            Self::SignalProp => "signal_prop",
            Self::BadInt => "bad_int",
            Self::BadFloat => "bad_float",
            Self::BadColor => "bad_color",
            Self::ClockChange => "clock_change",
            Self::LineValue => "line_value",
            Self::BusValue => "bus_value",
            Self::LineUnknown => "line_unknown",
            Self::ChangeDupe => "change_dupe",
            Self::MissingProp => "missing_prop",
            Self::BadSize => "bad_size",
            Self::BadMargin => "bad_margin",
            Self::TimeRange => "time_range",
            Self::BadStep => "bad_step",
            Self::BadDelay => "bad_delay",
            Self::BadLength => "bad_length",
            Self::BadDuty => "bad_duty",
        }
    }

    /// Human readable explanation shown to the author of the description
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownBlock => {
                "Unknown block type. Valid types are \"time\", \"style\", \"clock X\", \"bus X\" and \"line X\"."
            }
            Self::EmptyBlock => "An empty block encountered.",
            Self::OrphanColon => "A colon encountered without a block keyword.",
            Self::OrphanLine => "A property or change line encountered outside of a block.",
            Self::TimeArgs => "A time block must have no arguments.",
            Self::StyleArgs => "A style block must have no arguments.",
            Self::SignalArgs => "A signal block must have a name argument.",
            Self::MalformedLine => "Malformed line.",
            Self::TimeProp => "Unknown time property.",
            Self::StyleProp => "Unknown style property.",
            Self::SignalProp => "Unknown signal property.",
            Self::BadInt => "The specified property value is not a valid integer.",
            Self::BadFloat => "The specified property value is not a valid number.",
            Self::BadColor => {
                "The specified property value is not a valid color. Colors must be in the RRGGBB format."
            }
            Self::ClockChange => "Clock signals do not support change commands.",
            Self::LineValue => {
                "Invalid signal value for a line signal. Accepted values are 0, 1, Z (float) and ? (unknown)."
            }
            Self::BusValue => {
                "Invalid signal value for a bus signal. Accepted values are Z (float), ? (unknown) or a quoted string."
            }
            Self::LineUnknown => "Line signals cannot change to the \"unknown\" state.",
            Self::ChangeDupe => "Duplicate signal change time.",
            Self::MissingProp => {
                "A signal does not have all its properties defined. Clock signals must have offset, length and duty specified. Bus and line signals must have a start value specified."
            }
            Self::BadSize => {
                "Diagram width, height and font size must be positive and the margin must not be negative."
            }
            Self::BadMargin => {
                "The diagram margin must be less than half the width and half the height of the diagram."
            }
            Self::TimeRange => "The diagram end time must be greater than its start time.",
            Self::BadStep => "The column step must be a positive number of time units.",
            Self::BadDelay => "The transition delay must not be negative.",
            Self::BadLength => "A clock cycle length must be a positive number.",
            Self::BadDuty => "A clock duty cycle must lie strictly between 0 and 1.",
        }
    }
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A description rejected on a specific source line
///
/// `line_number` is 1-based and counts every line of the input, including
/// blank and comment lines. `line_text` is the trimmed source line.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}\nLine {line_number}: {line_text}", .kind.message())]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line_number: usize,
    pub line_text: String,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, line_number: usize, line_text: impl Into<String>) -> Self {
        Self {
            kind,
            line_number,
            line_text: line_text.into(),
        }
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

/// Invariant violations raised while constructing the diagram model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("margin {margin} must be less than half of width {width} and half of height {height}")]
    MarginTooLarge { margin: u32, width: u32, height: u32 },

    #[error("{property} must be positive")]
    ZeroSize { property: &'static str },

    #[error("end time {end} must be greater than start time {start}")]
    EmptyTimeRange { start: i64, end: i64 },

    #[error("step {step} must be positive")]
    InvalidStep { step: i64 },

    #[error("delay {delay} must not be negative")]
    NegativeDelay { delay: i64 },

    #[error("invalid line value {token:?}: expected 0, 1, Z or ?")]
    InvalidLineValue { token: String },

    #[error("line cannot change to the unknown state at time {time}")]
    LineChangeToUnknown { time: f64 },

    #[error("invalid bus value {token:?}: expected Z, ? or a quoted string")]
    InvalidBusValue { token: String },

    #[error("duplicate change time {time}")]
    DuplicateChangeTime { time: f64 },

    #[error("change time {time} is not a finite number")]
    NonFiniteTime { time: f64 },

    #[error("clock {property} {value} is not a finite number")]
    NonFiniteClock { property: &'static str, value: f64 },

    #[error("clock cycle length {length} must be positive")]
    InvalidClockLength { length: f64 },

    #[error("clock duty cycle {duty} must lie strictly between 0 and 1")]
    InvalidDutyCycle { duty: f64 },
}

impl ModelError {
    /// The syntax error reported when a description breaks this invariant
    pub fn syntax_kind(&self) -> SyntaxErrorKind {
        match self {
            Self::MarginTooLarge { .. } => SyntaxErrorKind::BadMargin,
            Self::ZeroSize { .. } => SyntaxErrorKind::BadSize,
            Self::EmptyTimeRange { .. } => SyntaxErrorKind::TimeRange,
            Self::InvalidStep { .. } => SyntaxErrorKind::BadStep,
            Self::NegativeDelay { .. } => SyntaxErrorKind::BadDelay,
            Self::InvalidLineValue { .. } => SyntaxErrorKind::LineValue,
            Self::LineChangeToUnknown { .. } => SyntaxErrorKind::LineUnknown,
            Self::InvalidBusValue { .. } => SyntaxErrorKind::BusValue,
            Self::DuplicateChangeTime { .. } => SyntaxErrorKind::ChangeDupe,
            Self::NonFiniteTime { .. } | Self::NonFiniteClock { .. } => SyntaxErrorKind::BadFloat,
            Self::InvalidClockLength { .. } => SyntaxErrorKind::BadLength,
            Self::InvalidDutyCycle { .. } => SyntaxErrorKind::BadDuty,
        }
    }
}

/// Failures while rendering or exporting a diagram
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render error: a diagram must have at least one signal")]
    NoSignals,

    #[error("Render error: {message}")]
    Surface { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Encode error: {source}")]
    Encode {
        #[from]
        source: image::ImageError,
    },
}

impl RenderError {
    /// Create a new surface error
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let error = SyntaxError::new(SyntaxErrorKind::ClockChange, 2, "0->1");
        let error_msg = format!("{}", error);
        assert!(error_msg.starts_with("Clock signals do not support change commands."));
        assert!(error_msg.ends_with("\nLine 2: 0->1"));
    }

    #[test]
    fn test_kind_codes_are_snake_case() {
        assert_eq!(SyntaxErrorKind::ChangeDupe.code(), "change_dupe");
        assert_eq!(SyntaxErrorKind::MissingProp.to_string(), "missing_prop");
        assert_eq!(SyntaxErrorKind::BadColor.code(), "bad_color");
    }

    #[test]
    fn test_model_error_display() {
        let error = ModelError::MarginTooLarge {
            margin: 50,
            width: 100,
            height: 600,
        };
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("margin 50"));
        assert!(error_msg.contains("width 100"));
    }

    #[test]
    fn test_model_error_maps_to_syntax_kind() {
        let error = ModelError::EmptyTimeRange { start: 5, end: 5 };
        assert_eq!(error.syntax_kind(), SyntaxErrorKind::TimeRange);
        let error = ModelError::NonFiniteTime { time: f64::NAN };
        assert_eq!(error.syntax_kind(), SyntaxErrorKind::BadFloat);
    }

    #[test]
    fn test_render_error_display() {
        let error = RenderError::surface("canvas not started");
        assert_eq!(format!("{}", error), "Render error: canvas not started");
        assert!(format!("{}", RenderError::NoSignals).contains("at least one signal"));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: RenderError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
