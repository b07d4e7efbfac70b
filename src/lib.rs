//! # FungiGT comparative-genomics visualization core
//!
//! Turns BinDash pairwise distance tables into the data behind a standard set
//! of comparative-genomics figures.
//!
//! ## Pipeline
//!
//! 1. **Parse**: detect the table layout (comparison pairs or labelled square
//!    matrix) and normalize every row into a [`PairwiseComparison`], replacing
//!    unreadable values with documented defaults instead of failing.
//! 2. **Summarize**: descriptive statistics over the comparison list.
//! 3. **Matrix**: expand comparisons into a symmetric, zero-diagonal
//!    [`DistanceMatrix`], imputing pairs that were never compared.
//! 4. **Cluster and project**: average-linkage dendrogram, Newick export and
//!    classical MDS over the sanitized condensed matrix.
//! 5. **Render**: plan each figure and hand it to a [`render::RenderBackend`];
//!    one failing figure becomes a placeholder and never aborts the job.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::Path;
//! use fungigt::{JobConfig, JobRunner};
//!
//! let runner = JobRunner::new(JobConfig::default().with_output_root("outputs"));
//! let report = runner.run(Path::new("distances.tsv"))?;
//! println!("{} artifacts in {}", report.artifacts.len(), report.output_dir.display());
//! # Ok::<(), fungigt::job::JobError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod bindash;
pub mod cluster;
pub mod config;
pub mod job;
pub mod matrix;
pub mod render;
pub mod statistics;
pub mod visualizer;
/// Python bindings for exposing the pipeline to external runtimes.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

pub use bindash::{parse_file, parse_str, ParseDiagnostics, ParseError, ParsedComparisons, PairwiseComparison};
pub use cluster::{classical_mds, ClusterError, Linkage, LinkageMethod, Projection};
pub use config::{ConfigError, JobConfig, RenderConfig};
pub use job::{JobError, JobReport, JobRunner};
pub use matrix::{build_distance_matrix, sanitize_for_clustering, CondensedMatrix, DistanceMatrix, MatrixError};
pub use render::{ArtifactKind, RenderError};
pub use statistics::{summarize, SummaryStatistics};
pub use visualizer::{detect_file_type, FileType, Visualizer, VisualizerRegistry};

use thiserror::Error;
use visualizer::{AnalysisError, UnknownFileType, ValidationError};

/// Any error the crate can produce.
#[derive(Error, Debug)]
pub enum FungiError {
    /// Input could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Distance matrix could not be built.
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// Clustering or projection failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// An artifact could not be planned or written.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration was unreadable or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The file failed pre-parse validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A file type name was not recognised.
    #[error(transparent)]
    FileType(#[from] UnknownFileType),

    /// The job could not run.
    #[error(transparent)]
    Job(#[from] JobError),
}

impl From<AnalysisError> for FungiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Invalid(err) => FungiError::Validation(err),
            AnalysisError::Parse(err) => FungiError::Parse(err),
        }
    }
}

impl FungiError {
    /// Stable snake-case name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FungiError::Parse(ParseError::Io { .. }) => "io",
            FungiError::Parse(ParseError::EmptyInput { .. }) => "empty_input",
            FungiError::Parse(ParseError::NoValidData { .. }) => "no_valid_data",
            FungiError::Matrix(err) => matrix_kind(err),
            FungiError::Cluster(_) => "clustering_failed",
            FungiError::Render(RenderError::Matrix(err)) => matrix_kind(err),
            FungiError::Render(RenderError::Cluster(_)) => "clustering_failed",
            FungiError::Render(RenderError::Io { .. }) => "io",
            FungiError::Config(_) => "invalid_config",
            FungiError::Validation(ValidationError::Io { .. }) => "io",
            FungiError::Validation(ValidationError::NoDataLines { .. }) => "empty_input",
            FungiError::Validation(_) => "invalid_file",
            FungiError::FileType(_) => "unknown_file_type",
            FungiError::Job(JobError::UnrecognizedFileType { .. }) => "unrecognized_file_type",
            FungiError::Job(JobError::Io { .. }) => "io",
            FungiError::Job(JobError::Serialize { .. }) => "serialization",
        }
    }
}

fn matrix_kind(err: &MatrixError) -> &'static str {
    match err {
        MatrixError::InsufficientData { .. } => "insufficient_data",
        MatrixError::DimensionMismatch { .. } => "dimension_mismatch",
    }
}
