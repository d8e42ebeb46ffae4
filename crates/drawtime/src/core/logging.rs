//! Logging infrastructure for diagram processing
//!
//! This module provides structured logging using the `tracing` crate.
//! It supports configurable log levels and formats for the library, the
//! `drawtime` binary and the browser bindings.
//!
//! # Usage
//!
//! ```rust,no_run
//! use drawtime::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).ok();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `DRAWTIME_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `DRAWTIME_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Full filter directives (tracing-subscriber standard)
//!
//! # Filtering Logs
//!
//! The parser and renderer emit spans named `parse_timing` and
//! `render_timing`. Filter by module with the usual directive syntax:
//!
//! ```bash
//! # Show only parser logs at debug level
//! RUST_LOG="drawtime::timing::parser=debug" drawtime render -i clock.td -o clock.png
//!
//! # Show all logs at info level, but per-signal drawing at trace level
//! RUST_LOG="info,drawtime::timing::renderer=trace" drawtime render -i clock.td -o clock.png
//! ```

use std::fmt;
use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self as subscriber_fmt, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

/// Environment variable consulted when no level is passed explicitly
pub const LEVEL_ENV: &str = "DRAWTIME_LOG_LEVEL";

/// Environment variable consulted when no format is passed explicitly
pub const FORMAT_ENV: &str = "DRAWTIME_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        })
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Pick the level directive: explicit argument, `DRAWTIME_LOG_LEVEL`, `RUST_LOG`, then `info`
pub fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var(LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

/// Pick the output format: explicit argument, `DRAWTIME_LOG_FORMAT`, then compact
pub fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    match format
        .map(str::to_string)
        .or_else(|| std::env::var(FORMAT_ENV).ok())
    {
        Some(name) => LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e)),
        None => Ok(LogFormat::default()),
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// # Arguments
///
/// * `level` - Optional level directive (trace|debug|info|warn|error|off).
///   Falls back to [`resolve_level`].
/// * `format` - Optional log format (compact|pretty|json).
///   Falls back to [`resolve_format`].
///
/// Returns an error for an unknown format or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // The browser console has a single format and no env filter.
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let format = resolve_format(format)?;
        let filter = build_filter(&resolve_level(level));

        match format {
            LogFormat::Compact => Registry::default()
                .with(filter)
                .with(
                    subscriber_fmt::Layer::default()
                        .with_target(false)
                        .with_level(true)
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?,
            LogFormat::Pretty => Registry::default()
                .with(filter)
                .with(
                    subscriber_fmt::Layer::default()
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?,
            LogFormat::Json => Registry::default()
                .with(filter)
                .with(
                    subscriber_fmt::Layer::default()
                        .with_target(true)
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE)
                        .json(),
                )
                .try_init()?,
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_filter(level: &str) -> EnvFilter {
    if level == "off" {
        return EnvFilter::new("off");
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
