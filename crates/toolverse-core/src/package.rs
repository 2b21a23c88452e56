//! Output packaging
//!
//! One artifact is offered as-is; several are bundled into one zip archive.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PdfToolError;

pub const ZIP_MIME: &str = "application/zip";

/// Bundle name used by the PDF split and reorder pages
pub const SPLIT_BUNDLE_NAME: &str = "split-pages.zip";

/// One produced output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl OutputArtifact {
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: crate::validation::PDF_MIME.to_string(),
            bytes,
        }
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            name: self.name.clone(),
            size_bytes: self.bytes.len(),
        }
    }
}

/// Name and size of an artifact, without its bytes
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub name: String,
    pub size_bytes: usize,
}

/// What the user finally saves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl From<OutputArtifact> for Download {
    fn from(artifact: OutputArtifact) -> Self {
        Self {
            file_name: artifact.name,
            mime: artifact.mime,
            bytes: artifact.bytes,
        }
    }
}

/// Turn a run's artifacts into a single download.
///
/// A single artifact passes through untouched; more are zipped under
/// `bundle_name`.
pub fn package(
    mut artifacts: Vec<OutputArtifact>,
    bundle_name: &str,
) -> Result<Download, PdfToolError> {
    match artifacts.len() {
        0 => Err(PdfToolError::NothingToPackage),
        1 => Ok(artifacts.remove(0).into()),
        _ => Ok(Download {
            file_name: bundle_name.to_string(),
            mime: ZIP_MIME.to_string(),
            bytes: build_zip(&artifacts)?,
        }),
    }
}

/// Zip every artifact; repeated names get a ` (n)` suffix
pub fn build_zip(artifacts: &[OutputArtifact]) -> Result<Vec<u8>, PdfToolError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used: HashMap<String, usize> = HashMap::new();
    for artifact in artifacts {
        let name = unique_name(&artifact.name, &mut used);
        zip.start_file(name, options)?;
        zip.write_all(&artifact.bytes)
            .map_err(|e| PdfToolError::ArchiveError(e.to_string()))?;
    }

    let cursor = zip.finish()?;
    tracing::debug!(entries = artifacts.len(), "built archive");
    Ok(cursor.into_inner())
}

fn unique_name(name: &str, used: &mut HashMap<String, usize>) -> String {
    let count = used.entry(name.to_string()).or_insert(0);
    *count += 1;
    if *count == 1 {
        return name.to_string();
    }

    let candidate = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, count, ext),
        _ => format!("{} ({})", name, count),
    };
    // The suffixed name could itself collide with a real one
    unique_name(&candidate, used)
}
