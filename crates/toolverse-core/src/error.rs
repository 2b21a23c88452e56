use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfToolError {
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("No pages selected")]
    EmptySelection,

    #[error("No document loaded")]
    NoDocument,

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Failed to render page {page}: {message}")]
    RenderError { page: u32, message: String },

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Nothing to package")]
    NothingToPackage,

    #[error("Failed to build archive: {0}")]
    ArchiveError(String),

    #[error("Load superseded by a newer file (generation {ticket}, current {current})")]
    StaleLoad { ticket: u64, current: u64 },
}

/// Broad class of a failure, used to decide how it is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input; nothing was mutated
    Validation,
    /// The file could not be decoded or rendered
    Decode,
    /// Building or packaging the output failed
    Assembly,
    /// A newer load replaced this one
    Superseded,
}

impl PdfToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PdfToolError::UnsupportedFile(_)
            | PdfToolError::InvalidRange(_)
            | PdfToolError::PageOutOfRange { .. }
            | PdfToolError::EmptySelection
            | PdfToolError::NoDocument => ErrorKind::Validation,
            PdfToolError::ParseError(_) | PdfToolError::RenderError { .. } => ErrorKind::Decode,
            PdfToolError::OperationError(_)
            | PdfToolError::NothingToPackage
            | PdfToolError::ArchiveError(_) => ErrorKind::Assembly,
            PdfToolError::StaleLoad { .. } => ErrorKind::Superseded,
        }
    }
}

impl From<lopdf::Error> for PdfToolError {
    fn from(err: lopdf::Error) -> Self {
        PdfToolError::OperationError(err.to_string())
    }
}

impl From<zip::result::ZipError> for PdfToolError {
    fn from(err: zip::result::ZipError) -> Self {
        PdfToolError::ArchiveError(err.to_string())
    }
}
