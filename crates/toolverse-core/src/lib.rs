//! PDF page workflow
//!
//! Everything the split, range, manual and reorder pages share, using lopdf:
//!
//! - [`loader`]: validate and parse one file, optionally collecting page previews
//! - [`selection`]: turn a selection mode into the documents to build
//! - [`assemble`]: build those documents, pages in exactly the requested order
//! - [`package`]: hand back one file, or a zip of several
//! - [`session`]: tie the steps together and discard superseded loads

pub mod assemble;
pub mod command;
pub mod error;
pub mod loader;
pub mod package;
pub mod page_info;
pub mod progress;
pub mod range;
pub mod reorder;
pub mod selection;
pub mod session;
pub mod validation;

#[cfg(test)]
mod testing;

pub use assemble::{assemble, extract_pages};
pub use command::{ProcessMetrics, RunReport};
pub use error::{ErrorKind, PdfToolError};
pub use loader::{
    load_document, load_document_with_previews, FileInput, PageRasterizer, SourceDocument,
    Thumbnail, PREVIEW_SCALE,
};
pub use package::{package, ArtifactSummary, Download, OutputArtifact, SPLIT_BUNDLE_NAME, ZIP_MIME};
pub use page_info::{PageHandle, PageOrientation};
pub use progress::{NoProgress, ProgressSink, ProgressTracker};
pub use range::{parse_range_flat, parse_range_groups};
pub use reorder::{parse_pages_order, ReorderBoard};
pub use selection::{ManualPicker, PageSelection, RangeOutput, WorkUnit};
pub use session::{LoadTicket, WorkflowSession};
pub use validation::{check_pdf_input, parse_pdf, PdfInfo, PDF_MIME};
