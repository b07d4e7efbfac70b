use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::{
    Analysis, AnalysisError, ArtifactRecord, DataSummary, FileType, RenderContext,
    ValidationError, Visualizer,
};
use crate::bindash::{data_lines, detect_format, parse_file, Delimiter, Detected, PairwiseComparison};
use crate::matrix::{build_distance_matrix, DistanceMatrix, MatrixError};
use crate::render::{plan_artifact, ArtifactKind, RenderError};
use crate::statistics::summarize;

/// Comparative-genomics figures from BinDash distance tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinDashVisualizer;

impl BinDashVisualizer {
    /// Create the visualizer.
    pub fn new() -> Self {
        Self
    }

    fn produce(
        &self,
        kind: ArtifactKind,
        comparisons: &[PairwiseComparison],
        matrix: Result<&DistanceMatrix, &MatrixError>,
        ctx: &RenderContext<'_>,
    ) -> ArtifactRecord {
        let rendered = plan_artifact(kind, comparisons, matrix, ctx.config)
            .and_then(|plan| ctx.backend.render(&plan, ctx.config, ctx.output_dir));
        match rendered {
            Ok(path) => ArtifactRecord {
                kind,
                path: Some(path),
                error: None,
            },
            Err(err) => self.placeholder(kind, &err, ctx),
        }
    }

    fn placeholder(
        &self,
        kind: ArtifactKind,
        err: &RenderError,
        ctx: &RenderContext<'_>,
    ) -> ArtifactRecord {
        let message = err.to_string();
        warn!(artifact = %kind, error = %message, "artifact failed, writing placeholder");
        let path = match ctx
            .backend
            .render_placeholder(kind, &message, ctx.config, ctx.output_dir)
        {
            Ok(path) => Some(path),
            Err(placeholder_err) => {
                warn!(artifact = %kind, error = %placeholder_err, "placeholder failed");
                None
            }
        };
        ArtifactRecord {
            kind,
            path,
            error: Some(message),
        }
    }
}

impl Visualizer for BinDashVisualizer {
    fn file_type(&self) -> FileType {
        FileType::Bindash
    }

    fn name(&self) -> &'static str {
        "BinDash comparative genomics"
    }

    fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        if !self.file_type().matches_extension(path) {
            return Err(ValidationError::UnsupportedExtension {
                path: path.to_path_buf(),
                expected: self.supported_extensions(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| ValidationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = data_lines(&content);
        let Some(first) = lines.first() else {
            return Err(ValidationError::NoDataLines {
                path: path.to_path_buf(),
            });
        };

        let columns = Delimiter::DETECTION_ORDER
            .into_iter()
            .filter(|delimiter| delimiter.appears_in(first))
            .map(|delimiter| delimiter.split(first).len())
            .max()
            .unwrap_or(1);
        if columns >= 3 || detect_format(&lines) == Some(Detected::SquareMatrix) {
            Ok(())
        } else {
            Err(ValidationError::TooFewColumns {
                path: path.to_path_buf(),
                found: columns,
            })
        }
    }

    fn analyze(&self, path: &Path, ctx: &RenderContext<'_>) -> Result<Analysis, AnalysisError> {
        self.validate(path)?;
        let parsed = parse_file(path)?;
        let statistics = summarize(&parsed.comparisons);

        let matrix = build_distance_matrix(&parsed.comparisons);
        if let Err(err) = &matrix {
            warn!(error = %err, "distance matrix unavailable; matrix figures will be placeholders");
        }

        let artifacts: Vec<ArtifactRecord> = ArtifactKind::ALL
            .into_iter()
            .map(|kind| self.produce(kind, &parsed.comparisons, matrix.as_ref(), ctx))
            .collect();

        let data_summary = DataSummary {
            total_comparisons: parsed.len(),
            unique_genomes: parsed.genomes().len(),
            diagnostics: parsed.diagnostics,
        };
        let analysis = Analysis {
            artifacts,
            statistics,
            data_summary,
        };
        let failed = analysis.failed_artifacts().count();
        info!(
            produced = analysis.artifacts.len() - failed,
            failed,
            "bindash artifacts done"
        );
        Ok(analysis)
    }
}
