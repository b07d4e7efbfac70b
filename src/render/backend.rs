use std::fmt::Debug;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{ArtifactKind, ArtifactPlan};
use crate::cluster::ClusterError;
use crate::config::RenderConfig;
use crate::matrix::MatrixError;

/// Failure to plan or write one artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The distance matrix needed by the figure is unavailable.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// Clustering or projection failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    /// Writing the artifact failed.
    #[error("failed to write {}", path.display())]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Writes planned figures into an output directory.
pub trait RenderBackend: Send + Sync + Debug {
    /// Backend identifier used in logs.
    fn name(&self) -> &'static str;

    /// Write `plan` under `dir` and return the created file.
    fn render(
        &self,
        plan: &ArtifactPlan,
        config: &RenderConfig,
        dir: &Path,
    ) -> Result<PathBuf, RenderError>;

    /// Write an explanatory stand-in for an artifact that could not be
    /// produced.
    fn render_placeholder(
        &self,
        kind: ArtifactKind,
        message: &str,
        config: &RenderConfig,
        dir: &Path,
    ) -> Result<PathBuf, RenderError>;
}
