use std::path::PathBuf;

use serde::Serialize;

use crate::statistics::SummaryStatistics;
use crate::visualizer::{ArtifactRecord, DataSummary, FileType};

/// Status recorded for files that have no dedicated visualizer.
pub const FALLBACK_STATUS: &str = "visualizer_in_development";

/// Top-level failure of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFailure {
    /// Stable failure name, e.g. `empty_input` or `no_valid_data`.
    pub kind: String,
    /// Offending file.
    pub file: String,
    /// Human-readable detail.
    pub message: String,
}

/// Basic facts about a file no visualizer handles yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackSummary {
    /// Detected type.
    pub file_type: FileType,
    /// Number of lines.
    pub lines_count: usize,
    /// Size in KiB.
    pub file_size_kb: f64,
    /// Always [`FALLBACK_STATUS`].
    pub status: String,
    /// Summary text file written to the job directory.
    pub path: Option<PathBuf>,
}

/// Everything a job produced, serialized to `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    /// Input file.
    pub file: String,
    /// Detected or configured type.
    pub file_type: FileType,
    /// Visualizer that ran, if any.
    pub visualizer: Option<String>,
    /// Job start, RFC 3339.
    pub timestamp: String,
    /// BLAKE3 hex digest of the input bytes.
    pub input_fingerprint: String,
    /// Directory holding the job's outputs.
    pub output_dir: PathBuf,
    /// Per-artifact outcomes.
    pub artifacts: Vec<ArtifactRecord>,
    /// Summary statistics, when the data could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<SummaryStatistics>,
    /// Data shape and parser diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_summary: Option<DataSummary>,
    /// Summary for types without a visualizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackSummary>,
    /// Whole-job failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl JobReport {
    /// Whether the job ran without a top-level failure.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Artifacts that were produced.
    pub fn produced(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts.iter().filter(|a| a.is_ok())
    }

    /// Artifacts replaced by placeholders.
    pub fn failed(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts.iter().filter(|a| !a.is_ok())
    }
}
