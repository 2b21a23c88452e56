//! Stateful page workflow session
//!
//! Holds the loaded document, the manual checkbox state, the reorder board
//! and the last run's outputs in Rust memory. JavaScript only forwards DOM
//! events and saves the final file.
//!
//! Loading is asynchronous because previews come from pdf.js:
//!
//! ```javascript
//! const ticket = session.beginLoad(file.name, file.type, bytes);
//! try {
//!     const loaded = await loadPdf(file.name, file.type, bytes, renderPage, onProgress);
//!     session.commitLoad(ticket, loaded);
//! } catch (err) {
//!     session.failLoad(ticket, String(err));
//! }
//! ```
//!
//! A load that finishes after a newer `beginLoad` is rejected by
//! `commitLoad` and never replaces the newer document.

use serde::Serialize;
use toolverse_core::{
    load_document, load_document_with_previews, FileInput, LoadTicket, ManualPicker,
    PageSelection, PdfInfo, PdfToolError, RangeOutput, ReorderBoard, RunReport, SourceDocument,
    Thumbnail, WorkflowSession, SPLIT_BUNDLE_NAME,
};
use wasm_bindgen::prelude::*;

use crate::download::DownloadFile;
use crate::preview::{JsProgress, JsRasterizer};

/// A parsed document waiting to be committed to a session
#[wasm_bindgen]
pub struct LoadedDocument {
    source: SourceDocument,
}

#[wasm_bindgen]
impl LoadedDocument {
    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.source.page_count()
    }
}

/// Validate and parse a file, rendering one preview per page when `render`
/// is given. Signature of `render`: `(pageNumber, scale) => Promise<string>`.
#[wasm_bindgen(js_name = loadPdf)]
pub async fn load_pdf(
    name: String,
    mime: Option<String>,
    bytes: Vec<u8>,
    render: Option<js_sys::Function>,
    progress: Option<js_sys::Function>,
) -> Result<LoadedDocument, JsValue> {
    let input = FileInput::new(name, mime.as_deref(), bytes);
    let mut sink = JsProgress::new(progress.as_ref(), "load");

    let source = match render {
        Some(render) => {
            let mut rasterizer = JsRasterizer::new(render);
            load_document_with_previews(input, &mut rasterizer, &mut sink).await
        }
        None => load_document(input, &mut sink),
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(LoadedDocument { source })
}

/// Summary of a committed document for the UI
#[derive(Debug, Serialize)]
struct DocumentView<'a> {
    name: &'a str,
    page_count: usize,
    info: &'a PdfInfo,
    thumbnails: &'a [Thumbnail],
}

#[wasm_bindgen]
pub struct PageWorkflow {
    session: WorkflowSession,
    picker: ManualPicker,
    board: ReorderBoard,
    progress_callback: Option<js_sys::Function>,
}

impl Default for PageWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PageWorkflow {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: WorkflowSession::new(),
            picker: ManualPicker::new(),
            board: ReorderBoard::new(0),
            progress_callback: None,
        }
    }

    /// Callback signature: `(percent: number, stage: string) => void`
    #[wasm_bindgen(js_name = setProgressCallback)]
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.progress_callback = Some(callback);
    }

    /// Start a load; returns the ticket to pass to `commitLoad`/`failLoad`.
    ///
    /// A file that is not a PDF is rejected here and the current document
    /// stays as it is.
    #[wasm_bindgen(js_name = beginLoad)]
    pub fn begin_load(
        &mut self,
        name: &str,
        mime: Option<String>,
        bytes: &[u8],
    ) -> Result<f64, JsValue> {
        let generation = self
            .begin_load_internal(name, mime.as_deref(), bytes)
            .map_err(|e| JsValue::from_str(&e))?;
        // u64 does not cross into JS as a plain number
        Ok(generation as f64)
    }

    #[wasm_bindgen(js_name = commitLoad)]
    pub fn commit_load(
        &mut self,
        ticket: f64,
        loaded: LoadedDocument,
    ) -> Result<JsValue, JsValue> {
        self.commit_load_internal(ticket as u64, Ok(loaded.source))
            .map_err(|e| JsValue::from_str(&e))?;
        self.document_view()
    }

    /// Record a failed load so the session stops waiting for it. A failure
    /// reported for a superseded load is ignored.
    #[wasm_bindgen(js_name = failLoad)]
    pub fn fail_load(&mut self, ticket: f64, message: &str) {
        let err = PdfToolError::ParseError(message.to_string());
        let _ = self.commit_load_internal(ticket as u64, Err(err));
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.session.document().map_or(0, SourceDocument::page_count)
    }

    /// Name, info and thumbnails of the loaded document, or null
    #[wasm_bindgen(js_name = getDocument)]
    pub fn document_view(&self) -> Result<JsValue, JsValue> {
        let Some(source) = self.session.document() else {
            return Ok(JsValue::NULL);
        };
        let view = DocumentView {
            name: &source.name,
            page_count: source.page_count(),
            info: &source.info,
            thumbnails: &source.thumbnails,
        };
        to_js(&view)
    }

    #[wasm_bindgen(js_name = removeDocument)]
    pub fn remove_document(&mut self) {
        self.session.remove_document();
        self.picker.clear();
        self.board = ReorderBoard::new(0);
    }

    // Manual selection

    /// Flip a page checkbox (zero-based); returns whether it is now checked
    #[wasm_bindgen(js_name = togglePage)]
    pub fn toggle_page(&mut self, index: usize) -> Result<bool, JsValue> {
        self.toggle_page_internal(index).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = isChecked)]
    pub fn is_checked(&self, index: usize) -> bool {
        self.picker.is_checked(index)
    }

    #[wasm_bindgen(js_name = checkedCount)]
    pub fn checked_count(&self) -> usize {
        self.picker.len()
    }

    // Reorder board

    #[wasm_bindgen(js_name = movePage)]
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        self.board
            .move_page(from, to)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Drop a thumbnail from the board; returns its original page number
    #[wasm_bindgen(js_name = removePage)]
    pub fn remove_page(&mut self, position: usize) -> Result<u32, JsValue> {
        self.board
            .remove_page(position)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current board order as original 1-based page numbers
    #[wasm_bindgen(js_name = pagesOrder)]
    pub fn pages_order(&self) -> Vec<u32> {
        self.board.pages_order().to_vec()
    }

    /// `pagesOrder` form field for the server-assisted reorder
    #[wasm_bindgen(js_name = pagesOrderJson)]
    pub fn pages_order_json(&self) -> String {
        self.board.pages_order_json()
    }

    // Runs

    /// One file per page
    #[wasm_bindgen(js_name = runAll)]
    pub fn run_all(&mut self) -> Result<JsValue, JsValue> {
        self.run_js(&PageSelection::All)
    }

    /// Range expression like `"1-3, 5"`; `each` makes one file per page
    #[wasm_bindgen(js_name = runRange)]
    pub fn run_range(&mut self, expression: &str, each: bool) -> Result<JsValue, JsValue> {
        let output = if each {
            RangeOutput::Each
        } else {
            RangeOutput::Group
        };
        self.run_js(&PageSelection::Range {
            expression: expression.to_string(),
            output,
        })
    }

    /// Checked pages, ascending
    #[wasm_bindgen(js_name = runManual)]
    pub fn run_manual(&mut self) -> Result<JsValue, JsValue> {
        let selection = self.picker.to_selection();
        self.run_js(&selection)
    }

    /// Board order, built locally into one file
    #[wasm_bindgen(js_name = runReorder)]
    pub fn run_reorder(&mut self) -> Result<JsValue, JsValue> {
        let selection = self.board.to_selection();
        self.run_js(&selection)
    }

    /// Any selection given as JSON, e.g. `{"mode":"range","expression":"2-4"}`
    #[wasm_bindgen(js_name = runSelection)]
    pub fn run_selection(&mut self, selection: JsValue) -> Result<JsValue, JsValue> {
        let selection: PageSelection = serde_wasm_bindgen::from_value(selection)
            .map_err(|e| JsValue::from_str(&format!("Invalid selection: {}", e)))?;
        self.run_js(&selection)
    }

    /// The last run's outputs as one file or `split-pages.zip`
    pub fn download(&self) -> Result<DownloadFile, JsValue> {
        self.session
            .package(SPLIT_BUNDLE_NAME)
            .map(DownloadFile::from)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl PageWorkflow {
    fn begin_load_internal(
        &mut self,
        name: &str,
        mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<u64, String> {
        let ticket = self
            .session
            .begin_load(name, mime, bytes)
            .map_err(|e| e.to_string())?;
        self.picker.clear();
        self.board = ReorderBoard::new(0);
        Ok(ticket.generation())
    }

    fn commit_load_internal(
        &mut self,
        ticket: u64,
        result: Result<SourceDocument, PdfToolError>,
    ) -> Result<usize, String> {
        let source = self
            .session
            .finish_load(LoadTicket::from_generation(ticket), result)
            .map_err(|e| e.to_string())?;
        let page_count = source.page_count();
        self.board = ReorderBoard::new(page_count as u32);
        Ok(page_count)
    }

    fn toggle_page_internal(&mut self, index: usize) -> Result<bool, String> {
        let page_count = self.page_count();
        if index >= page_count {
            return Err(format!(
                "Page index {} is out of range (0-{})",
                index,
                page_count.saturating_sub(1)
            ));
        }
        Ok(self.picker.toggle(index))
    }

    fn run_internal(&mut self, selection: &PageSelection) -> Result<RunReport, String> {
        let mut sink = JsProgress::new(self.progress_callback.as_ref(), "run");
        self.session
            .run(selection, &mut sink)
            .map_err(|e| e.to_string())
    }

    fn run_js(&mut self, selection: &PageSelection) -> Result<JsValue, JsValue> {
        let report = self
            .run_internal(selection)
            .map_err(|e| JsValue::from_str(&e))?;
        to_js(&report)
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
