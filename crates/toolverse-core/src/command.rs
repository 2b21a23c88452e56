use serde::Serialize;

use crate::package::{ArtifactSummary, OutputArtifact};

/// Outcome of one workflow run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    pub artifacts: Vec<ArtifactSummary>,
    pub metrics: ProcessMetrics,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProcessMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    /// Pages written across all artifacts, repeats included
    pub page_count: usize,
    pub artifact_count: usize,
}

impl RunReport {
    pub fn new(input_size_bytes: usize, page_count: usize, artifacts: &[OutputArtifact]) -> Self {
        Self {
            artifacts: artifacts.iter().map(OutputArtifact::summary).collect(),
            metrics: ProcessMetrics {
                input_size_bytes,
                output_size_bytes: artifacts.iter().map(|a| a.bytes.len()).sum(),
                page_count,
                artifact_count: artifacts.len(),
            },
        }
    }
}
