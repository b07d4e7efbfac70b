//! Request-scoped visualization jobs.
//!
//! A job owns one input file and one freshly created output directory named
//! `<file type>_<YYYYmmdd_HHMMSS>`, so concurrent jobs never share paths.

mod report;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

pub use report::{FallbackSummary, JobFailure, JobReport, FALLBACK_STATUS};

use crate::config::JobConfig;
use crate::render::{DataExportBackend, RenderBackend};
use crate::visualizer::{detect_file_type, FileType, RenderContext, VisualizerRegistry};
use crate::FungiError;

/// Statistics file written into every job directory that has statistics.
pub const SUMMARY_FILE: &str = "summary_stats.json";
/// Job report file.
pub const REPORT_FILE: &str = "report.json";

const MAX_DIR_ATTEMPTS: usize = 1000;

/// Failures that prevent a job from producing any result.
#[derive(Debug, Error)]
pub enum JobError {
    /// Neither extension nor content identified the file.
    #[error("unrecognized file type: {}", path.display())]
    UnrecognizedFileType {
        /// Input file.
        path: PathBuf,
    },
    /// Filesystem failure.
    #[error("i/o error on {}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A JSON output could not be encoded.
    #[error("failed to encode {file}")]
    Serialize {
        /// Output file name.
        file: &'static str,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> JobError + '_ {
    move |source| JobError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Runs jobs against a registry and a render backend.
#[derive(Debug)]
pub struct JobRunner {
    config: JobConfig,
    registry: VisualizerRegistry,
    backend: Box<dyn RenderBackend>,
}

impl JobRunner {
    /// Runner with the built-in visualizers and the data-export backend.
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            registry: VisualizerRegistry::with_defaults(),
            backend: Box::new(DataExportBackend::new()),
        }
    }

    /// Replace the visualizer registry.
    pub fn with_registry(mut self, registry: VisualizerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the render backend.
    pub fn with_backend(mut self, backend: Box<dyn RenderBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Registered visualizers.
    pub fn registry(&self) -> &VisualizerRegistry {
        &self.registry
    }

    /// Process one file.
    ///
    /// Data problems (empty input, nothing parseable, a failing figure) are
    /// reported inside the returned [`JobReport`]. Only an unrecognisable
    /// file or a filesystem failure around the job itself is an `Err`.
    pub fn run(&self, path: &Path) -> Result<JobReport, JobError> {
        let timestamp = Local::now();
        let bytes = fs::read(path).map_err(io_error(path))?;
        let input_fingerprint = blake3::hash(&bytes).to_hex().to_string();

        let file_type = self
            .config
            .file_type
            .or_else(|| detect_file_type(path))
            .ok_or_else(|| JobError::UnrecognizedFileType {
                path: path.to_path_buf(),
            })?;
        info!(file = %path.display(), %file_type, "starting job");

        let output_dir = create_output_dir(&self.config.output_root, file_type, &timestamp)?;
        let mut report = JobReport {
            file: path.display().to_string(),
            file_type,
            visualizer: None,
            timestamp: timestamp.to_rfc3339(),
            input_fingerprint,
            output_dir: output_dir.clone(),
            artifacts: Vec::new(),
            statistics: None,
            data_summary: None,
            fallback: None,
            error: None,
        };

        match self.registry.get(file_type) {
            Some(visualizer) => {
                report.visualizer = Some(visualizer.name().to_string());
                let ctx = RenderContext {
                    output_dir: &output_dir,
                    config: &self.config.render,
                    backend: self.backend.as_ref(),
                };
                match visualizer.analyze(path, &ctx) {
                    Ok(analysis) => {
                        write_json(&output_dir, SUMMARY_FILE, &analysis.statistics)?;
                        report.artifacts = analysis.artifacts;
                        report.statistics = Some(analysis.statistics);
                        report.data_summary = Some(analysis.data_summary);
                    }
                    Err(err) => {
                        let err = FungiError::from(err);
                        error!(file = %path.display(), kind = err.kind(), error = %err, "job failed");
                        report.error = Some(JobFailure {
                            kind: err.kind().to_string(),
                            file: report.file.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
            None => {
                warn!(%file_type, "no visualizer registered, writing fallback summary");
                let fallback = fallback_summary(&bytes, file_type, &output_dir)?;
                write_json(&output_dir, SUMMARY_FILE, &fallback)?;
                report.fallback = Some(fallback);
            }
        }

        if self.config.write_report {
            write_json(&output_dir, REPORT_FILE, &report)?;
        }
        info!(
            output_dir = %output_dir.display(),
            produced = report.produced().count(),
            failed = report.failed().count(),
            "job finished"
        );
        Ok(report)
    }
}

/// Create `<root>/<type>_<YYYYmmdd_HHMMSS>`, appending `_<n>` when that
/// directory already exists.
pub fn create_output_dir(
    root: &Path,
    file_type: FileType,
    timestamp: &chrono::DateTime<Local>,
) -> Result<PathBuf, JobError> {
    fs::create_dir_all(root).map_err(io_error(root))?;
    let base = format!("{}_{}", file_type.name(), timestamp.format("%Y%m%d_%H%M%S"));
    for attempt in 0..MAX_DIR_ATTEMPTS {
        let name = if attempt == 0 {
            base.clone()
        } else {
            format!("{base}_{attempt}")
        };
        let candidate = root.join(name);
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(io_error(&candidate)(err)),
        }
    }
    Err(JobError::Io {
        path: root.join(base),
        source: io::Error::new(io::ErrorKind::AlreadyExists, "no free output directory name"),
    })
}

fn fallback_summary(
    bytes: &[u8],
    file_type: FileType,
    output_dir: &Path,
) -> Result<FallbackSummary, JobError> {
    let text = String::from_utf8_lossy(bytes);
    let lines_count = text.lines().count();
    let file_size_kb = bytes.len() as f64 / 1024.0;

    let path = output_dir.join(format!("fallback_{}.txt", file_type.name()));
    let body = format!(
        "{} file loaded\nlines: {lines_count}\nsize: {file_size_kb:.1} KB\nstatus: {FALLBACK_STATUS}\n",
        file_type.name().to_uppercase()
    );
    fs::write(&path, body).map_err(io_error(&path))?;

    Ok(FallbackSummary {
        file_type,
        lines_count,
        file_size_kb,
        status: FALLBACK_STATUS.to_string(),
        path: Some(path),
    })
}

fn write_json<T: Serialize>(dir: &Path, file: &'static str, value: &T) -> Result<(), JobError> {
    let path = dir.join(file);
    let text = serde_json::to_string_pretty(value)
        .map_err(|source| JobError::Serialize { file, source })?;
    fs::write(&path, text).map_err(io_error(&path))
}
