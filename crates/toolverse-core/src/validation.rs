//! Input checks and document info extraction

use lopdf::Document;
use serde::Serialize;

use crate::error::PdfToolError;

pub const PDF_MIME: &str = "application/pdf";

/// PDF file information extracted during validation
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PdfInfo {
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Reject files that are not PDFs before anything is parsed.
///
/// A declared MIME type wins; without one the extension decides.
pub fn check_pdf_input(name: &str, mime: Option<&str>, bytes: &[u8]) -> Result<(), PdfToolError> {
    let declared_pdf = match mime.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.eq_ignore_ascii_case(PDF_MIME),
        None => name.to_ascii_lowercase().ends_with(".pdf"),
    };
    if !declared_pdf {
        return Err(PdfToolError::UnsupportedFile(format!(
            "'{}' is not a PDF file",
            name
        )));
    }

    if bytes.len() < 8 {
        return Err(PdfToolError::UnsupportedFile(
            "File too small to be a valid PDF".into(),
        ));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfToolError::UnsupportedFile(
            "Not a valid PDF file (missing %PDF- header)".into(),
        ));
    }
    Ok(())
}

/// Parse the document and collect its info
pub fn parse_pdf(bytes: &[u8]) -> Result<(Document, PdfInfo), PdfToolError> {
    let document =
        Document::load_mem(bytes).map_err(|e| PdfToolError::ParseError(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PdfToolError::ParseError("PDF has no pages".into()));
    }

    let (title, author) = extract_metadata(&document);
    let info = PdfInfo {
        page_count,
        version: extract_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title,
        author,
    };
    Ok((document, info))
}

/// Header format: %PDF-1.7
fn extract_version(bytes: &[u8]) -> String {
    bytes
        .get(5..8)
        .and_then(|v| std::str::from_utf8(v).ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "1.4".to_string())
}

fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let info = document
        .trailer
        .get(b"Info")
        .and_then(|obj| obj.as_reference())
        .and_then(|id| document.get_dictionary(id));

    let Ok(info) = info else {
        return (None, None);
    };

    let text = |key: &[u8]| {
        info.get(key)
            .and_then(|obj| obj.as_str())
            .ok()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .filter(|s| !s.is_empty())
    };

    (text(b"Title"), text(b"Author"))
}
