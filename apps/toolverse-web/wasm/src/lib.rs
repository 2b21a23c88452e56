//! WASM bindings for the browser tools
//!
//! All document state is held in Rust; JavaScript handles DOM events, file
//! I/O and page rendering through pdf.js.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PageWorkflow, loadPdf } from './pkg/toolverse_wasm.js';
//!
//! await init();
//!
//! const workflow = new PageWorkflow();
//! workflow.setProgressCallback((percent, stage) => updateUI(percent, stage));
//!
//! // throws, leaving the current document in place, when the file is not a PDF
//! const ticket = workflow.beginLoad(file.name, file.type, bytes);
//! const loaded = await loadPdf(file.name, file.type, bytes, renderPage, onProgress);
//! workflow.commitLoad(ticket, loaded);
//!
//! workflow.runRange("1-3, 5", false);
//! const file = workflow.download();
//! saveBlob(file.bytes(), file.fileName, file.mime);
//! ```

pub mod dates;
pub mod download;
pub mod images;
pub mod preview;
pub mod session;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use download::DownloadFile;
pub use images::{ImageConvertSession, ImagePdfSession};
pub use session::{LoadedDocument, PageWorkflow};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// PDF info without creating a session, for showing file details early
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let (_, info) =
        toolverse_core::parse_pdf(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Parse a `"1-3, 5"` expression against a page count into 1-based pages,
/// for previewing the selection before running
#[wasm_bindgen(js_name = previewRange)]
pub fn preview_range(expression: &str, page_count: usize) -> Result<Vec<u32>, JsValue> {
    toolverse_core::parse_range_flat(expression, page_count)
        .map(|indices| indices.into_iter().map(|i| i as u32 + 1).collect())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
