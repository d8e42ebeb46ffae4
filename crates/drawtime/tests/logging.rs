//! Tests for logging functionality
//!
//! These tests verify that logging initialization works correctly
//! with different configurations.

use drawtime::core::logging::{init_logging, resolve_format, resolve_level, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("invalid").is_err());
}

#[test]
fn test_log_format_variants() {
    let variants = LogFormat::variants();
    assert_eq!(variants, &["compact", "pretty", "json"]);
    for variant in variants {
        assert_eq!(LogFormat::from_str(variant).unwrap().to_string(), *variant);
    }
}

#[test]
fn test_explicit_settings_win() {
    assert_eq!(resolve_level(Some("debug")), "debug");
    assert_eq!(resolve_format(Some("pretty")).unwrap(), LogFormat::Pretty);
    assert!(resolve_format(Some("xml")).is_err());
}

#[test]
fn test_init_logging_with_levels() {
    // Only the first call can install the global subscriber; none may panic.
    let _ = init_logging(Some("trace"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("compact"));
    let _ = init_logging(Some("off"), Some("compact"));
    let _ = init_logging(Some("drawtime::timing=trace"), Some("json"));
}

#[test]
fn test_init_logging_invalid_format() {
    let result = init_logging(Some("info"), Some("invalid_format"));
    assert!(result.is_err());
}

#[test]
fn test_parsing_and_rendering_with_subscriber() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let diagram = drawtime::parse("line A:\n  start = 0\n  5 -> 1\n").unwrap();
    let mut canvas = drawtime::RecordingCanvas::new();
    drawtime::render_onto(&diagram, &mut canvas).unwrap();
    assert!(!canvas.commands().is_empty());
}
