//! WebAssembly bindings for DrawTime
//!
//! Browser-friendly wrappers for an editor: render a description to SVG and
//! validate it, reporting the offending line as JSON.

use wasm_bindgen::prelude::*;

use crate::core::{FontLibrary, Renderer};
use crate::timing::SvgRenderer;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Render a timing description to an SVG document
///
/// Text is measured with fixed metrics; the browser lays out the glyphs.
/// Throws a JavaScript error if parsing or rendering fails.
#[wasm_bindgen]
pub fn render_svg(input: &str) -> Result<String, JsValue> {
    let diagram = crate::parse(input).map_err(|e| JsValue::from_str(&e.to_string()))?;
    SvgRenderer::with_fonts(FontLibrary::fixed())
        .render(&diagram)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check a timing description
///
/// # Returns
/// * JSON string with fields: valid, signal_count, error
///   (`error` holds kind, message, line_number and line_text)
#[wasm_bindgen]
pub fn validate(input: &str) -> String {
    match crate::parse(input) {
        Ok(diagram) => serde_json::json!({
            "valid": true,
            "signal_count": diagram.signals().len(),
            "error": null,
        }),
        Err(error) => serde_json::json!({
            "valid": false,
            "signal_count": 0,
            "error": {
                "kind": error.kind.code(),
                "message": error.message(),
                "line_number": error.line_number,
                "line_text": error.line_text,
            },
        }),
    }
    .to_string()
}
