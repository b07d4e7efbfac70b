//! Job and render configuration.
//!
//! Both structs deserialize from TOML with every field optional:
//!
//! ```toml
//! output_root = "results"
//! file_type = "bindash"
//!
//! [render]
//! histogram_bins = 50
//! ani_range = [0.8, 1.0]
//! linkage_method = "complete"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cluster::LinkageMethod;
use crate::visualizer::FileType;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}", path.display())]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The TOML was malformed or had wrongly typed fields.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Styling and layout parameters handed to every render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Figure width in inches.
    pub figure_width: f64,
    /// Figure height in inches.
    pub figure_height: f64,
    /// Output resolution.
    pub dpi: u32,
    /// Bins per distribution histogram.
    pub histogram_bins: usize,
    /// Decimal places used for heatmap annotations.
    pub annotation_precision: usize,
    /// Colour-scale bounds for the ANI heatmap.
    pub ani_range: (f64, f64),
    /// Colormap for distance heatmaps.
    pub distance_colormap: String,
    /// Colormap for the ANI heatmap.
    pub ani_colormap: String,
    /// Categorical palette.
    pub palette: String,
    /// Preferred dendrogram linkage; the remaining methods are tried in
    /// turn if it fails.
    pub linkage_method: LinkageMethod,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            figure_width: 12.0,
            figure_height: 8.0,
            dpi: 300,
            histogram_bins: 30,
            annotation_precision: 3,
            ani_range: (0.7, 1.0),
            distance_colormap: "RdYlBu_r".to_string(),
            ani_colormap: "RdYlGn".to_string(),
            palette: "husl".to_string(),
            linkage_method: LinkageMethod::default(),
        }
    }
}

impl RenderConfig {
    /// Override the histogram bin count.
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    /// Override the preferred linkage method.
    pub fn with_linkage_method(mut self, method: LinkageMethod) -> Self {
        self.linkage_method = method;
        self
    }

    /// Reject values no renderer can honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid {
                field: "render.histogram_bins",
                reason: "must be at least 1".to_string(),
            });
        }
        let (low, high) = self.ani_range;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(ConfigError::Invalid {
                field: "render.ani_range",
                reason: format!("expected low < high, got ({low}, {high})"),
            });
        }
        if self.figure_width <= 0.0 || self.figure_height <= 0.0 || self.dpi == 0 {
            return Err(ConfigError::Invalid {
                field: "render.figure",
                reason: "figure size and dpi must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings for one visualization job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Directory under which each job creates its own output directory.
    pub output_root: PathBuf,
    /// Skip detection and treat every input as this type.
    pub file_type: Option<FileType>,
    /// Write `report.json` next to the artifacts.
    pub write_report: bool,
    /// Render parameters.
    pub render: RenderConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("outputs"),
            file_type: None,
            write_report: true,
            render: RenderConfig::default(),
        }
    }
}

impl JobConfig {
    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.render.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the output root.
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Force a file type.
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    /// Toggle `report.json`.
    pub fn with_report(mut self, write_report: bool) -> Self {
        self.write_report = write_report;
        self
    }

    /// Replace the render parameters.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}
