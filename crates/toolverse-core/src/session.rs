//! Page workflow session
//!
//! Holds at most one loaded document and the artifacts of the latest run.
//! Loading is split in two halves so an asynchronous preview render can run
//! in between: [`WorkflowSession::begin_load`] hands out a ticket and
//! [`WorkflowSession::finish_load`] only accepts the newest one, so a slow
//! load of an older file can never overwrite a newer one.

use crate::command::RunReport;
use crate::error::PdfToolError;
use crate::loader::SourceDocument;
use crate::package::{package, Download, OutputArtifact};
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::validation::check_pdf_input;

/// Proof that a load was started; only the newest ticket can commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Rebuild a ticket that was handed across the JS boundary as a number
    pub fn from_generation(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct WorkflowSession {
    generation: u64,
    loading: bool,
    document: Option<SourceDocument>,
    artifacts: Vec<OutputArtifact>,
}

impl WorkflowSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading a new file.
    ///
    /// A file that is not a PDF is rejected before anything changes. Otherwise
    /// the previous document and its results are dropped, and any earlier,
    /// still running load becomes stale.
    pub fn begin_load(
        &mut self,
        name: &str,
        mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<LoadTicket, PdfToolError> {
        check_pdf_input(name, mime, bytes)?;

        self.generation += 1;
        self.loading = true;
        self.document = None;
        self.artifacts.clear();
        Ok(LoadTicket(self.generation))
    }

    /// Commit the outcome of a load.
    ///
    /// A stale ticket is rejected and leaves the session untouched. A failed
    /// load clears the previous document and results.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceDocument, PdfToolError>,
    ) -> Result<&SourceDocument, PdfToolError> {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "discarding stale load"
            );
            return Err(PdfToolError::StaleLoad {
                ticket: ticket.0,
                current: self.generation,
            });
        }

        self.loading = false;
        Ok(self.document.insert(result?))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    pub fn artifacts(&self) -> &[OutputArtifact] {
        &self.artifacts
    }

    /// Resolve the selection against the loaded document and build the
    /// outputs. A failed run leaves no partial results behind.
    pub fn run(
        &mut self,
        selection: &PageSelection,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunReport, PdfToolError> {
        self.artifacts.clear();
        let source = self.document.as_ref().ok_or(PdfToolError::NoDocument)?;

        let units = selection.work_units(source.page_count())?;
        let page_count = units.iter().map(|unit| unit.pages.len()).sum();
        let artifacts = crate::assemble::assemble(source, &units, progress)?;

        let report = RunReport::new(source.bytes.len(), page_count, &artifacts);
        self.artifacts = artifacts;
        Ok(report)
    }

    /// Package the latest run's artifacts into one download
    pub fn package(&self, bundle_name: &str) -> Result<Download, PdfToolError> {
        package(self.artifacts.clone(), bundle_name)
    }

    /// Forget the loaded document and everything derived from it.
    ///
    /// Also invalidates any load still in flight.
    pub fn remove_document(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.document = None;
        self.artifacts.clear();
    }
}
