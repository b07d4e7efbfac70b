//! Python bindings that expose the distance pipeline via PyO3.
use std::path::{Path, PathBuf};

use pyo3::{
    exceptions::{PyRuntimeError, PyValueError},
    prelude::*,
    types::PyModule,
};

use crate::bindash::parse_file;
use crate::cluster::LinkageMethod;
use crate::config::JobConfig;
use crate::job::JobRunner;
use crate::matrix::build_distance_matrix;
use crate::render::DendrogramPlan;
use crate::statistics::summarize;
use crate::visualizer::{FileType, VisualizerRegistry};

fn runtime_err(err: impl std::fmt::Display) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

/// Python-facing entry point for BinDash analyses.
#[pyclass]
#[derive(Debug)]
pub struct PyFungiAnalyzer {
    config: JobConfig,
}

#[pymethods]
impl PyFungiAnalyzer {
    #[new]
    #[pyo3(signature = (output_root = None, config_path = None))]
    /// Create an analyzer, optionally loading a TOML config and overriding
    /// the output root.
    pub fn new(output_root: Option<PathBuf>, config_path: Option<PathBuf>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => JobConfig::from_toml_path(path).map_err(runtime_err)?,
            None => JobConfig::default(),
        };
        if let Some(root) = output_root {
            config = config.with_output_root(root);
        }
        Ok(Self { config })
    }

    /// List `(file_type, available)` for every known file type.
    pub fn list_file_types(&self) -> Vec<(String, bool)> {
        VisualizerRegistry::with_defaults()
            .list()
            .into_iter()
            .map(|info| (info.file_type.to_string(), info.available))
            .collect()
    }

    /// Summary statistics of a distance file as a JSON string.
    pub fn statistics_json(&self, path: PathBuf) -> PyResult<String> {
        let parsed = parse_file(&path).map_err(runtime_err)?;
        serde_json::to_string(&summarize(&parsed.comparisons)).map_err(runtime_err)
    }

    /// Distance matrix of a file as labelled TSV.
    pub fn distance_matrix_tsv(&self, path: PathBuf) -> PyResult<String> {
        let parsed = parse_file(&path).map_err(runtime_err)?;
        let matrix = build_distance_matrix(&parsed.comparisons).map_err(runtime_err)?;
        Ok(matrix.to_tsv())
    }

    /// Clustering tree of a file in Newick format.
    ///
    /// Args:
    ///     path: BinDash distance file.
    ///     method: Optional linkage name; defaults to the configured one.
    #[pyo3(signature = (path, method = None))]
    pub fn newick(&self, path: PathBuf, method: Option<String>) -> PyResult<String> {
        let method = match method {
            Some(name) => name
                .parse::<LinkageMethod>()
                .map_err(|err| PyValueError::new_err(err.to_string()))?,
            None => self.config.render.linkage_method,
        };
        let parsed = parse_file(&path).map_err(runtime_err)?;
        let matrix = build_distance_matrix(&parsed.comparisons).map_err(runtime_err)?;
        let plan = DendrogramPlan::from_matrix(&matrix, method).map_err(runtime_err)?;
        Ok(plan.newick)
    }

    /// Run a full job and return the report as a JSON string.
    ///
    /// Args:
    ///     path: Input file.
    ///     file_type: Optional type name overriding detection.
    #[pyo3(signature = (path, file_type = None))]
    pub fn run_job(&self, path: PathBuf, file_type: Option<String>) -> PyResult<String> {
        let mut config = self.config.clone();
        if let Some(name) = file_type {
            let ty: FileType = name
                .parse()
                .map_err(|err: crate::visualizer::UnknownFileType| PyValueError::new_err(err.to_string()))?;
            config = config.with_file_type(ty);
        }
        let report = JobRunner::new(config)
            .run(Path::new(&path))
            .map_err(runtime_err)?;
        serde_json::to_string(&report).map_err(runtime_err)
    }
}

/// Create Python module.
#[pymodule]
pub fn fungigt_py(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFungiAnalyzer>()?;
    Ok(())
}
