//! Integration tests for the public API

use drawtime::prelude::*;
use drawtime::{parse, render_svg, render_with_fonts};

const INPUT: &str = "time:\n  end = 40\n  step = 10\nclock clk:\n  offset = 0\n  length = 10\n  duty = 0.5\nbus D:\n  start = 'idle'\n  15 -> \"data\"\n  30 -> Z\n";

#[test]
fn test_parse_counts_signals() {
    let diagram = parse(INPUT).unwrap();
    assert_eq!(diagram.signals().len(), 2);
    assert_eq!(diagram.timeline().step, Some(10));
}

#[test]
fn test_parser_metadata() {
    let parser = TimingParser::new();
    assert_eq!(parser.name(), "timing");
    assert!(!parser.version().is_empty());
    assert_eq!(parser.parse(INPUT).unwrap(), parse(INPUT).unwrap());
}

#[test]
fn test_render_with_fixed_fonts() {
    let image = render_with_fonts(INPUT, FontLibrary::fixed()).unwrap();
    assert_eq!(image.dimensions(), (800, 600));
}

#[test]
fn test_render_with_custom_size() {
    let input = format!("style:\n  width = 320\n  height = 120\n  margin = 5\n{INPUT}");
    let image = render_with_fonts(&input, FontLibrary::fixed()).unwrap();
    assert_eq!(image.dimensions(), (320, 120));
}

#[test]
fn test_render_svg() {
    let svg = render_svg(INPUT).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("T1"));
    assert!(svg.contains("stroke-dasharray"));
}

#[test]
fn test_render_error_types() {
    let error = render_with_fonts("bus D:\n", FontLibrary::fixed()).unwrap_err();
    let syntax = error.downcast_ref::<SyntaxError>().unwrap();
    assert_eq!(syntax.kind, SyntaxErrorKind::EmptyBlock);

    let error = render_svg("time:\n  end = 5\n").unwrap_err();
    assert!(matches!(
        error.downcast_ref::<RenderError>(),
        Some(RenderError::NoSignals)
    ));
}

#[test]
fn test_renderer_metadata() {
    let raster = RasterRenderer::with_fonts(FontLibrary::fixed());
    assert_eq!((raster.name(), raster.format()), ("raster", "png"));
    let svg = SvgRenderer::with_fonts(FontLibrary::fixed());
    assert_eq!((svg.name(), svg.format()), ("svg", "svg"));
    let commands = CommandRenderer::new();
    assert_eq!((commands.name(), commands.format()), ("commands", "json"));
}

#[test]
fn test_save_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagram.png");
    let diagram = parse(INPUT).unwrap();
    RasterRenderer::with_fonts(FontLibrary::fixed())
        .save(&diagram, &path)
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_save_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let diagram = parse(INPUT).unwrap();
    let result = RasterRenderer::with_fonts(FontLibrary::fixed()).save(&diagram, dir.path().join("diagram.xyz"));
    assert!(matches!(result, Err(RenderError::Encode { .. })));
}

#[test]
fn test_font_library_errors() {
    assert!(matches!(
        FontLibrary::from_data(b"not a font".to_vec()),
        Err(RenderError::Surface { .. })
    ));
    assert!(matches!(
        FontLibrary::from_file("/definitely/not/here.ttf"),
        Err(RenderError::Io { .. })
    ));
}

#[test]
fn test_description_round_trip() {
    let diagram = parse(INPUT).unwrap();
    let text = diagram.to_description();
    assert!(text.contains("clock clk:\n  offset = 0\n  length = 10\n  duty = 0.5\n"));
    assert_eq!(parse(&text).unwrap(), diagram);
    assert_eq!(diagram.to_string(), text);
}
