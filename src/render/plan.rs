use serde::Serialize;
use tracing::debug;

use super::{ArtifactKind, RenderError};
use crate::bindash::PairwiseComparison;
use crate::cluster::{classical_mds, DistanceSort, Linkage, LinkageMethod, Projection};
use crate::config::RenderConfig;
use crate::matrix::{sanitize_for_clustering, DistanceMatrix, MatrixError};
use crate::statistics::mean;

/// Per-comparison quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Mutation distance.
    MutationDistance,
    /// Average nucleotide identity.
    Ani,
    /// Comparison p-value.
    PValue,
    /// Jaccard index.
    JaccardIndex,
}

impl Metric {
    /// Column label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::MutationDistance => "mutation_distance",
            Metric::Ani => "ani",
            Metric::PValue => "p_value",
            Metric::JaccardIndex => "jaccard_index",
        }
    }

    /// Read the metric from a comparison.
    pub fn value(self, comparison: &PairwiseComparison) -> f64 {
        match self {
            Metric::MutationDistance => comparison.mutation_distance,
            Metric::Ani => comparison.ani,
            Metric::PValue => comparison.p_value,
            Metric::JaccardIndex => comparison.jaccard_index,
        }
    }
}

/// One heatmap cell below the diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapCell {
    /// Row genome index.
    pub row: usize,
    /// Column genome index, always less than `row`.
    pub column: usize,
    /// Displayed value.
    pub value: f64,
    /// The pair was never compared and holds the fill value.
    pub imputed: bool,
}

/// Lower-triangular heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapPlan {
    /// What the cells hold.
    pub metric: Metric,
    /// Genome labels for rows and columns.
    pub labels: Vec<String>,
    /// Cells with `row > column`; the diagonal and upper triangle are masked.
    pub cells: Vec<HeatmapCell>,
    /// Colour-scale bounds.
    pub value_range: (f64, f64),
    /// Colormap name.
    pub colormap: String,
    /// Displayed value of never-compared pairs, absent when every pair was
    /// compared.
    pub fill_value: Option<f64>,
}

impl HeatmapPlan {
    /// Mutation-distance heatmap, scaled from 0 to the largest distance.
    pub fn distance(matrix: &DistanceMatrix, config: &RenderConfig) -> Self {
        Self::lower_triangle(
            matrix,
            Metric::MutationDistance,
            |d| d,
            (0.0, matrix.max_distance()),
            &config.distance_colormap,
        )
    }

    /// ANI heatmap (`1 - distance`) on the configured ANI range.
    pub fn ani(matrix: &DistanceMatrix, config: &RenderConfig) -> Self {
        Self::lower_triangle(
            matrix,
            Metric::Ani,
            |d| 1.0 - d,
            config.ani_range,
            &config.ani_colormap,
        )
    }

    fn lower_triangle(
        matrix: &DistanceMatrix,
        metric: Metric,
        transform: impl Fn(f64) -> f64,
        value_range: (f64, f64),
        colormap: &str,
    ) -> Self {
        let n = matrix.len();
        let cells = (0..n)
            .flat_map(|row| (0..row).map(move |column| (row, column)))
            .map(|(row, column)| HeatmapCell {
                row,
                column,
                value: transform(matrix.get(row, column)),
                imputed: matrix.is_imputed(row, column),
            })
            .collect();
        let fill_value = (matrix.imputed_pairs() > 0).then(|| transform(matrix.fill_value()));
        Self {
            metric,
            labels: matrix.labels().to_vec(),
            cells,
            value_range,
            colormap: colormap.to_string(),
            fill_value,
        }
    }
}

/// Dendrogram of a hierarchical clustering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DendrogramPlan {
    /// Leaf labels, indexed like the matrix.
    pub labels: Vec<String>,
    /// Linkage that produced the tree, which differs from the requested one
    /// after a fallback.
    pub method: LinkageMethod,
    /// Merge steps.
    pub linkage: Linkage,
    /// Left-to-right leaf order, taller subtree first.
    pub leaf_order: Vec<usize>,
    /// Newick rendering of the tree.
    pub newick: String,
}

impl DendrogramPlan {
    /// Cluster the sanitized matrix with `method`, falling back to the
    /// other linkage methods if it fails.
    pub fn from_matrix(matrix: &DistanceMatrix, method: LinkageMethod) -> Result<Self, RenderError> {
        let condensed = sanitize_for_clustering(matrix);
        let (method, linkage) = method.with_fallback(|m| Linkage::new(&condensed, m))?;
        let newick = linkage.to_newick(condensed.labels())?;
        Ok(Self {
            labels: condensed.labels().to_vec(),
            method,
            leaf_order: linkage.leaf_order(DistanceSort::Descending),
            linkage,
            newick,
        })
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Binned quantity.
    pub metric: Metric,
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    /// Count per bin; the last bin includes its right edge.
    pub counts: Vec<usize>,
}

/// Bin `values` into `bins` equal-width bins spanning their range.
///
/// A degenerate range `[v, v]` is widened to `[v - 0.5, v + 0.5]` and an
/// empty input spans `[0, 1]`.
pub fn histogram(metric: Metric, values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let (mut low, mut high) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() {
        (low, high) = (0.0, 1.0);
    } else if low == high {
        (low, high) = (low - 0.5, high + 0.5);
    }

    let width = high - low;
    let edges = (0..=bins)
        .map(|k| low + width * k as f64 / bins as f64)
        .collect();
    let mut counts = vec![0usize; bins];
    for &value in values {
        let slot = (((value - low) / width) * bins as f64).floor() as usize;
        counts[slot.min(bins - 1)] += 1;
    }
    Histogram {
        metric,
        edges,
        counts,
    }
}

/// Four-panel distribution figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionPlan {
    /// Mutation distance, ANI, p-value and Jaccard index, in that order.
    pub histograms: Vec<Histogram>,
}

impl DistributionPlan {
    /// Histogram each metric over all comparisons.
    pub fn from_comparisons(comparisons: &[PairwiseComparison], config: &RenderConfig) -> Self {
        let histograms = [
            Metric::MutationDistance,
            Metric::Ani,
            Metric::PValue,
            Metric::JaccardIndex,
        ]
        .into_iter()
        .map(|metric| {
            let values: Vec<f64> = comparisons.iter().map(|c| metric.value(c)).collect();
            histogram(metric, &values, config.histogram_bins)
        })
        .collect();
        Self { histograms }
    }
}

/// One scatter panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPanel {
    /// Horizontal axis.
    pub x: Metric,
    /// Vertical axis.
    pub y: Metric,
    /// One point per comparison.
    pub points: Vec<(f64, f64)>,
    /// Pearson correlation, absent when either axis is constant.
    pub pearson_r: Option<f64>,
}

/// Pearson correlation coefficient; `None` for fewer than two points or a
/// zero-variance axis.
pub fn pearson(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (mx, my) = (mean(&xs), mean(&ys));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    let denominator = (sxx * syy).sqrt();
    (denominator > 0.0).then(|| (sxy / denominator).clamp(-1.0, 1.0))
}

/// Four-panel correlation figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlan {
    /// ANI×p-value, ANI×Jaccard, distance×p-value, distance×Jaccard.
    pub panels: Vec<ScatterPanel>,
}

impl ScatterPlan {
    /// Pair the metrics over all comparisons.
    pub fn from_comparisons(comparisons: &[PairwiseComparison]) -> Self {
        let panels = [
            (Metric::Ani, Metric::PValue),
            (Metric::Ani, Metric::JaccardIndex),
            (Metric::MutationDistance, Metric::PValue),
            (Metric::MutationDistance, Metric::JaccardIndex),
        ]
        .into_iter()
        .map(|(x, y)| {
            let points: Vec<(f64, f64)> = comparisons
                .iter()
                .map(|c| (x.value(c), y.value(c)))
                .collect();
            ScatterPanel {
                x,
                y,
                pearson_r: pearson(&points),
                points,
            }
        })
        .collect();
        Self { panels }
    }
}

/// Two-dimensional embedding figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MdsPlan {
    /// Principal coordinates.
    pub projection: Projection,
}

impl MdsPlan {
    /// Project the sanitized matrix onto two axes.
    pub fn from_matrix(matrix: &DistanceMatrix) -> Result<Self, RenderError> {
        let projection = classical_mds(&sanitize_for_clustering(matrix), 2)?;
        Ok(Self { projection })
    }
}

/// Planned content of any artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactPlan {
    /// Distance heatmap.
    DistanceHeatmap(HeatmapPlan),
    /// ANI heatmap.
    AniHeatmap(HeatmapPlan),
    /// Dendrogram.
    DendrogramSimple(DendrogramPlan),
    /// Distributions.
    DistanceDistributions(DistributionPlan),
    /// Scatter panels.
    ScatterAnalysis(ScatterPlan),
    /// MDS embedding.
    MdsAnalysis(MdsPlan),
}

impl ArtifactPlan {
    /// Which artifact this plan is for.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactPlan::DistanceHeatmap(_) => ArtifactKind::DistanceHeatmap,
            ArtifactPlan::AniHeatmap(_) => ArtifactKind::AniHeatmap,
            ArtifactPlan::DendrogramSimple(_) => ArtifactKind::DendrogramSimple,
            ArtifactPlan::DistanceDistributions(_) => ArtifactKind::DistanceDistributions,
            ArtifactPlan::ScatterAnalysis(_) => ArtifactKind::ScatterAnalysis,
            ArtifactPlan::MdsAnalysis(_) => ArtifactKind::MdsAnalysis,
        }
    }
}

/// Compute the plan for one artifact.
///
/// `matrix` is the outcome of building the distance matrix once per job;
/// matrix-backed artifacts fail with that error, the others ignore it.
pub fn plan_artifact(
    kind: ArtifactKind,
    comparisons: &[PairwiseComparison],
    matrix: Result<&DistanceMatrix, &MatrixError>,
    config: &RenderConfig,
) -> Result<ArtifactPlan, RenderError> {
    let require_matrix = || matrix.map_err(|err| RenderError::Matrix(err.clone()));
    let plan = match kind {
        ArtifactKind::DistanceHeatmap => {
            ArtifactPlan::DistanceHeatmap(HeatmapPlan::distance(require_matrix()?, config))
        }
        ArtifactKind::AniHeatmap => ArtifactPlan::AniHeatmap(HeatmapPlan::ani(require_matrix()?, config)),
        ArtifactKind::DendrogramSimple => {
            ArtifactPlan::DendrogramSimple(DendrogramPlan::from_matrix(
                require_matrix()?,
                config.linkage_method,
            )?)
        }
        ArtifactKind::DistanceDistributions => ArtifactPlan::DistanceDistributions(
            DistributionPlan::from_comparisons(comparisons, config),
        ),
        ArtifactKind::ScatterAnalysis => {
            ArtifactPlan::ScatterAnalysis(ScatterPlan::from_comparisons(comparisons))
        }
        ArtifactKind::MdsAnalysis => ArtifactPlan::MdsAnalysis(MdsPlan::from_matrix(require_matrix()?)?),
    };
    debug!(artifact = %kind, "planned artifact");
    Ok(plan)
}
