//! Render plans and backends.
//!
//! A plan is the complete data one figure needs, computed without touching
//! the filesystem. A [`RenderBackend`] turns plans into files. Styling comes
//! from an explicit [`RenderConfig`](crate::config::RenderConfig) passed to
//! every call.

mod backend;
mod export;
mod plan;

use serde::{Deserialize, Serialize};

pub use backend::{RenderBackend, RenderError};
pub use export::DataExportBackend;
pub use plan::{
    histogram, pearson, plan_artifact, ArtifactPlan, DendrogramPlan, DistributionPlan,
    HeatmapCell, HeatmapPlan, Histogram, MdsPlan, Metric, ScatterPanel, ScatterPlan,
};

/// Figures produced for a BinDash job, in production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Lower-triangle mutation-distance heatmap.
    DistanceHeatmap,
    /// Lower-triangle ANI heatmap.
    AniHeatmap,
    /// Average-linkage dendrogram.
    DendrogramSimple,
    /// Histograms of the four per-comparison metrics.
    DistanceDistributions,
    /// Pairwise metric scatter panels.
    ScatterAnalysis,
    /// Two-dimensional MDS embedding.
    MdsAnalysis,
}

impl ArtifactKind {
    /// Every kind, in the order a job produces them.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::DistanceHeatmap,
        ArtifactKind::AniHeatmap,
        ArtifactKind::DendrogramSimple,
        ArtifactKind::DistanceDistributions,
        ArtifactKind::ScatterAnalysis,
        ArtifactKind::MdsAnalysis,
    ];

    /// Output file stem.
    pub fn file_stem(self) -> &'static str {
        match self {
            ArtifactKind::DistanceHeatmap => "distance_heatmap",
            ArtifactKind::AniHeatmap => "ani_heatmap",
            ArtifactKind::DendrogramSimple => "dendrogram_simple",
            ArtifactKind::DistanceDistributions => "distance_distributions",
            ArtifactKind::ScatterAnalysis => "scatter_analysis",
            ArtifactKind::MdsAnalysis => "mds_analysis",
        }
    }

    /// Figure title.
    pub fn title(self) -> &'static str {
        match self {
            ArtifactKind::DistanceHeatmap => "Genomic distance matrix",
            ArtifactKind::AniHeatmap => "ANI matrix",
            ArtifactKind::DendrogramSimple => "Average-linkage dendrogram",
            ArtifactKind::DistanceDistributions => "Metric distributions",
            ArtifactKind::ScatterAnalysis => "Metric correlations",
            ArtifactKind::MdsAnalysis => "MDS of genomic distances",
        }
    }

    /// Whether the figure is drawn from the distance matrix rather than the
    /// raw comparison list.
    pub fn requires_matrix(self) -> bool {
        matches!(
            self,
            ArtifactKind::DistanceHeatmap
                | ArtifactKind::AniHeatmap
                | ArtifactKind::DendrogramSimple
                | ArtifactKind::MdsAnalysis
        )
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}
