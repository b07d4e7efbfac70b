use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bindash::{ParseDiagnostics, ParseError};
use crate::config::RenderConfig;
use crate::render::{ArtifactKind, RenderBackend};
use crate::statistics::SummaryStatistics;

/// Genomic result files the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// BinDash pairwise distances.
    Bindash,
    /// Functional annotations (eggNOG-mapper and similar).
    Annotations,
    /// HMMER domain tables.
    Hmmer,
    /// Seed orthologs.
    SeedOrthologs,
    /// Quality-control metrics.
    QualityControl,
}

impl FileType {
    /// Every type, in detection order.
    pub const ALL: [FileType; 5] = [
        FileType::Bindash,
        FileType::Annotations,
        FileType::Hmmer,
        FileType::SeedOrthologs,
        FileType::QualityControl,
    ];

    /// Stable identifier, also used for output directory names.
    pub fn name(self) -> &'static str {
        match self {
            FileType::Bindash => "bindash",
            FileType::Annotations => "annotations",
            FileType::Hmmer => "hmmer",
            FileType::SeedOrthologs => "seed_orthologs",
            FileType::QualityControl => "quality_control",
        }
    }

    /// File name suffixes recognised for the type, lower case.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileType::Bindash => &[".txt", ".tsv", ".csv", ".out", ".distances"],
            FileType::Annotations => &[".annotations", ".emapper.annotations", ".eggnog"],
            FileType::Hmmer => &[".txt", ".out", ".analyze.txt", ".domtblout"],
            FileType::SeedOrthologs => &[".seed_orthologs", ".orthologs"],
            FileType::QualityControl => &[".qc", ".quality", ".stats"],
        }
    }

    /// Short description.
    pub fn description(self) -> &'static str {
        match self {
            FileType::Bindash => "Comparative genomics with BinDash",
            FileType::Annotations => "Functional gene annotations",
            FileType::Hmmer => "Protein domain analysis with HMMER",
            FileType::SeedOrthologs => "Ortholog and phylogenetic analysis",
            FileType::QualityControl => "Genome quality metrics",
        }
    }

    /// Whether `path`'s file name ends with one of the type's suffixes.
    pub fn matches_extension(self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        self.extensions().iter().any(|ext| name.ends_with(ext))
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that is not a known [`FileType`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown file type `{0}`")]
pub struct UnknownFileType(pub String);

impl FromStr for FileType {
    type Err = UnknownFileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FileType::ALL
            .into_iter()
            .find(|ty| ty.name() == wanted)
            .ok_or_else(|| UnknownFileType(s.to_string()))
    }
}

/// Why a file was rejected before analysis.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The file name has none of the accepted suffixes.
    #[error("unsupported extension for {}; expected one of {expected:?}", path.display())]
    UnsupportedExtension {
        /// Rejected file.
        path: PathBuf,
        /// Accepted suffixes.
        expected: &'static [&'static str],
    },
    /// Only blank or comment lines.
    #[error("{} contains no data lines", path.display())]
    NoDataLines {
        /// Rejected file.
        path: PathBuf,
    },
    /// The first data line is not a table row.
    #[error("{}: expected at least 3 columns, found {found}", path.display())]
    TooFewColumns {
        /// Rejected file.
        path: PathBuf,
        /// Columns on the first data line.
        found: usize,
    },
    /// The file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// Rejected file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Fatal failure of a visualizer run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Validation rejected the file.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Parsing produced nothing usable.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Where and how a visualizer writes its artifacts.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Job output directory, already created.
    pub output_dir: &'a Path,
    /// Styling for every figure.
    pub config: &'a RenderConfig,
    /// Backend that writes the files.
    pub backend: &'a dyn RenderBackend,
}

/// Outcome of one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactRecord {
    /// Which artifact.
    pub kind: ArtifactKind,
    /// Written file: the artifact itself, or its placeholder when `error` is set.
    pub path: Option<PathBuf>,
    /// Why the artifact could not be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactRecord {
    /// Whether the artifact was produced.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Shape of the parsed data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    /// Comparisons kept.
    pub total_comparisons: usize,
    /// Distinct genomes.
    pub unique_genomes: usize,
    /// Parser recovery counts.
    pub diagnostics: ParseDiagnostics,
}

/// Everything a successful visualizer run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// One record per artifact kind, in production order.
    pub artifacts: Vec<ArtifactRecord>,
    /// Summary statistics.
    pub statistics: SummaryStatistics,
    /// Data shape and diagnostics.
    pub data_summary: DataSummary,
}

impl Analysis {
    /// Artifacts that failed and were replaced by placeholders.
    pub fn failed_artifacts(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts.iter().filter(|record| !record.is_ok())
    }
}

/// A file-type specific analysis.
pub trait Visualizer: Send + Sync + fmt::Debug {
    /// File type handled.
    fn file_type(&self) -> FileType;

    /// Display name.
    fn name(&self) -> &'static str;

    /// Accepted file suffixes.
    fn supported_extensions(&self) -> &'static [&'static str] {
        self.file_type().extensions()
    }

    /// Cheap structural checks before parsing.
    fn validate(&self, path: &Path) -> Result<(), ValidationError>;

    /// Parse `path`, write artifacts through `ctx`, and summarize.
    ///
    /// Only whole-file failures are errors; a failing artifact is recorded in
    /// the returned [`Analysis`].
    fn analyze(&self, path: &Path, ctx: &RenderContext<'_>) -> Result<Analysis, AnalysisError>;
}
