//! Document assembler
//!
//! Builds new documents out of pages of a loaded one. Output pages appear in
//! exactly the requested order, which is what lets the reorder page change
//! page order and the range page repeat a page.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::PdfToolError;
use crate::loader::SourceDocument;
use crate::package::OutputArtifact;
use crate::page_info::inherited_raw;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::selection::WorkUnit;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Build every work unit in order, reporting progress after each one.
///
/// Any failure aborts the run; artifacts built so far are dropped.
pub fn assemble(
    source: &SourceDocument,
    units: &[WorkUnit],
    progress: &mut dyn ProgressSink,
) -> Result<Vec<OutputArtifact>, PdfToolError> {
    let mut tracker = ProgressTracker::start(units.len(), progress);
    let mut artifacts = Vec::with_capacity(units.len());

    for unit in units {
        let bytes = extract_pages(&source.document, &unit.pages)?;
        tracing::debug!(name = %unit.name, pages = unit.pages.len(), "assembled unit");
        artifacts.push(OutputArtifact::pdf(unit.name.clone(), bytes));
        tracker.advance();
    }
    tracker.finish();

    tracing::info!(
        source = %source.name,
        artifacts = artifacts.len(),
        "assembly complete"
    );
    Ok(artifacts)
}

/// Build a document holding the pages at `indices` (zero-based), in order.
///
/// The source is cloned, its page tree is replaced by a flat list of the
/// requested pages, and everything no longer referenced is pruned. A page
/// requested more than once gets a fresh page object per extra occurrence.
pub fn extract_pages(source: &Document, indices: &[usize]) -> Result<Vec<u8>, PdfToolError> {
    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    for &index in indices {
        if index >= page_ids.len() {
            return Err(PdfToolError::PageOutOfRange {
                page: index + 1,
                page_count: page_ids.len(),
            });
        }
    }

    let mut doc = source.clone();
    let pages_root = pages_root_id(&doc)?;

    let mut kids = Vec::with_capacity(indices.len());
    let mut placed: HashSet<ObjectId> = HashSet::new();
    for &index in indices {
        let page_id = page_ids[index];
        let page = flattened_page(source, page_id, pages_root)?;

        let id = if placed.insert(page_id) {
            doc.objects.insert(page_id, Object::Dictionary(page));
            page_id
        } else {
            doc.add_object(page)
        };
        kids.push(Object::Reference(id));
    }

    let count = kids.len() as i64;
    let root = doc
        .get_object_mut(pages_root)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfToolError::OperationError("Invalid pages dictionary".into()))?;
    root.set("Kids", Object::Array(kids));
    root.set("Count", Object::Integer(count));

    doc.prune_objects();
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfToolError::OperationError(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

/// Copy of a page dictionary that hangs directly off the root `Pages` node,
/// with inherited attributes made explicit
fn flattened_page(
    source: &Document,
    page_id: ObjectId,
    pages_root: ObjectId,
) -> Result<Dictionary, PdfToolError> {
    let original = source
        .get_dictionary(page_id)
        .map_err(|_| PdfToolError::OperationError(format!("Page {:?} not found", page_id)))?;

    let mut page = original.clone();
    for key in INHERITABLE {
        if page.has(key) {
            continue;
        }
        if let Some(value) = inherited_raw(source, original, key) {
            page.set(key.to_vec(), value.clone());
        }
    }
    page.set("Parent", Object::Reference(pages_root));
    Ok(page)
}

fn pages_root_id(doc: &Document) -> Result<ObjectId, PdfToolError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfToolError::OperationError("No Root in trailer".into()))?;

    doc.get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PdfToolError::OperationError("No Pages in catalog".into()))
}
