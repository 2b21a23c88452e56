//! Document loader
//!
//! Validates and parses one dropped file and, when the page needs visual
//! selection, asks a [`PageRasterizer`] for one preview per page. Rendering
//! itself is done outside of Rust (pdf.js in the browser); this module only
//! sequences the calls and keeps the progress count.

use lopdf::Document;
use serde::Serialize;

use crate::error::PdfToolError;
use crate::page_info::PageHandle;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::validation::{check_pdf_input, parse_pdf, PdfInfo};

/// Scale used for preview thumbnails
pub const PREVIEW_SCALE: f32 = 0.5;

/// A rasterized preview of one page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Thumbnail {
    /// Original page number (1-indexed)
    pub page_number: u32,
    /// Encoded image, usually a `data:image/...` URL
    pub image: String,
}

/// External page renderer
#[allow(async_fn_in_trait)]
pub trait PageRasterizer {
    /// Render page `page_number` (1-indexed) at `scale`
    async fn render_page(&mut self, page_number: u32, scale: f32) -> Result<String, String>;
}

/// One uploaded file: parsed document, per-page handles, optional previews
#[derive(Debug)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub document: Document,
    pub info: PdfInfo,
    pub pages: Vec<PageHandle>,
    pub thumbnails: Vec<Thumbnail>,
}

impl SourceDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A file handed to the loader
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes,
        }
    }
}

/// Load a file without previews
pub fn load_document(
    input: FileInput,
    progress: &mut dyn ProgressSink,
) -> Result<SourceDocument, PdfToolError> {
    let mut tracker = ProgressTracker::start(1, progress);
    let source = parse_input(input)?;
    tracker.finish();
    Ok(source)
}

/// Load a file and render one preview per page, in page order.
///
/// Any failure aborts the load and drops everything parsed so far.
pub async fn load_document_with_previews<R: PageRasterizer>(
    input: FileInput,
    rasterizer: &mut R,
    progress: &mut dyn ProgressSink,
) -> Result<SourceDocument, PdfToolError> {
    let mut source = parse_input(input)?;
    let mut tracker = ProgressTracker::start(source.pages.len(), progress);

    let mut thumbnails = Vec::with_capacity(source.pages.len());
    for page in &source.pages {
        let image = rasterizer
            .render_page(page.number, PREVIEW_SCALE)
            .await
            .map_err(|message| PdfToolError::RenderError {
                page: page.number,
                message,
            })?;
        thumbnails.push(Thumbnail {
            page_number: page.number,
            image,
        });
        let percent = tracker.advance();
        tracing::debug!(page = page.number, percent, "rendered preview");
    }
    tracker.finish();

    source.thumbnails = thumbnails;
    Ok(source)
}

fn parse_input(input: FileInput) -> Result<SourceDocument, PdfToolError> {
    check_pdf_input(&input.name, input.mime.as_deref(), &input.bytes)?;
    let (document, info) = parse_pdf(&input.bytes)?;
    let pages = PageHandle::all_from_document(&document)?;

    tracing::info!(
        name = %input.name,
        pages = info.page_count,
        size = info.size_bytes,
        "loaded document"
    );

    Ok(SourceDocument {
        name: input.name,
        bytes: input.bytes,
        document,
        info,
        pages,
        thumbnails: Vec::new(),
    })
}
