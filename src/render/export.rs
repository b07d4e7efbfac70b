use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{
    ArtifactKind, ArtifactPlan, DendrogramPlan, DistributionPlan, HeatmapPlan, RenderBackend,
    RenderError, ScatterPlan,
};
use crate::config::RenderConfig;

/// Backend that writes the data behind each figure instead of pixels.
///
/// Heatmaps, distributions, scatter panels and the MDS embedding become
/// `<stem>.tsv`; the dendrogram becomes `<stem>.nwk`. Placeholders are
/// `error_<stem>.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataExportBackend;

impl DataExportBackend {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }

    fn target(kind: ArtifactKind, dir: &Path) -> PathBuf {
        let extension = match kind {
            ArtifactKind::DendrogramSimple => "nwk",
            _ => "tsv",
        };
        dir.join(format!("{}.{extension}", kind.file_stem()))
    }
}

impl RenderBackend for DataExportBackend {
    fn name(&self) -> &'static str {
        "data-export"
    }

    fn render(
        &self,
        plan: &ArtifactPlan,
        config: &RenderConfig,
        dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let path = Self::target(plan.kind(), dir);
        write_file(&path, |out| match plan {
            ArtifactPlan::DistanceHeatmap(heatmap) | ArtifactPlan::AniHeatmap(heatmap) => {
                write_heatmap(out, heatmap, config)
            }
            ArtifactPlan::DendrogramSimple(dendrogram) => write_dendrogram(out, dendrogram),
            ArtifactPlan::DistanceDistributions(distributions) => {
                write_distributions(out, distributions, config)
            }
            ArtifactPlan::ScatterAnalysis(scatter) => write_scatter(out, scatter, config),
            ArtifactPlan::MdsAnalysis(mds) => mds.projection.write_tsv(out),
        })?;
        info!(artifact = %plan.kind(), path = %path.display(), "wrote artifact");
        Ok(path)
    }

    fn render_placeholder(
        &self,
        kind: ArtifactKind,
        message: &str,
        _config: &RenderConfig,
        dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let path = dir.join(format!("error_{}.txt", kind.file_stem()));
        write_file(&path, |out| {
            writeln!(out, "{}", kind.title())?;
            writeln!(out, "{message}")
        })?;
        Ok(path)
    }
}

fn write_file(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), RenderError> {
    let io_error = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
    body(&mut out).map_err(io_error)?;
    out.flush().map_err(io_error)
}

/// `figure=WxH\tdpi=N` layout fields shared by every table header.
fn figure_fields(config: &RenderConfig) -> String {
    format!(
        "figure={}x{}\tdpi={}",
        config.figure_width, config.figure_height, config.dpi
    )
}

fn write_heatmap<W: Write>(out: &mut W, plan: &HeatmapPlan, config: &RenderConfig) -> io::Result<()> {
    let precision = config.annotation_precision;
    write!(
        out,
        "# {}\tcolormap={}\trange={}..{}\t{}",
        plan.metric.label(),
        plan.colormap,
        plan.value_range.0,
        plan.value_range.1,
        figure_fields(config)
    )?;
    match plan.fill_value {
        Some(fill) => writeln!(out, "\tfill={fill:.precision$}")?,
        None => writeln!(out)?,
    }
    writeln!(out, "row\tcolumn\tvalue\timputed")?;
    for cell in &plan.cells {
        writeln!(
            out,
            "{}\t{}\t{:.precision$}\t{}",
            plan.labels[cell.row], plan.labels[cell.column], cell.value, cell.imputed
        )?;
    }
    Ok(())
}

fn write_dendrogram<W: Write>(out: &mut W, plan: &DendrogramPlan) -> io::Result<()> {
    writeln!(out, "{}", plan.newick)
}

fn write_distributions<W: Write>(
    out: &mut W,
    plan: &DistributionPlan,
    config: &RenderConfig,
) -> io::Result<()> {
    writeln!(out, "# {}\tpalette={}", figure_fields(config), config.palette)?;
    writeln!(out, "metric\tbin_start\tbin_end\tcount")?;
    for histogram in &plan.histograms {
        for (k, count) in histogram.counts.iter().enumerate() {
            writeln!(
                out,
                "{}\t{}\t{}\t{count}",
                histogram.metric.label(),
                histogram.edges[k],
                histogram.edges[k + 1]
            )?;
        }
    }
    Ok(())
}

fn write_scatter<W: Write>(out: &mut W, plan: &ScatterPlan, config: &RenderConfig) -> io::Result<()> {
    writeln!(out, "# {}\tpalette={}", figure_fields(config), config.palette)?;
    for panel in &plan.panels {
        let r = panel
            .pearson_r
            .map_or_else(|| "NA".to_string(), |r| r.to_string());
        writeln!(out, "# {} vs {}\tpearson_r={r}", panel.x.label(), panel.y.label())?;
        writeln!(out, "{}\t{}", panel.x.label(), panel.y.label())?;
        for (x, y) in &panel.points {
            writeln!(out, "{x}\t{y}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindash::PairwiseComparison;
    use crate::matrix::build_distance_matrix;
    use crate::render::plan_artifact;

    #[test]
    fn heatmap_export_respects_precision() {
        let comparisons = vec![PairwiseComparison::new("a", "b", 0.12345, 0.0, 0.8)];
        let matrix = build_distance_matrix(&comparisons).unwrap();
        let config = RenderConfig {
            annotation_precision: 2,
            ..RenderConfig::default()
        };
        let plan = HeatmapPlan::distance(&matrix, &config);
        let mut buffer = Vec::new();
        write_heatmap(&mut buffer, &plan, &config).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.ends_with("row\tcolumn\tvalue\timputed\nb\ta\t0.12\tfalse\n"));
        assert!(!text.contains("fill="));
    }

    #[test]
    fn headers_carry_figure_settings() {
        let comparisons = vec![
            PairwiseComparison::new("a", "b", 0.25, 0.0, 0.9),
            PairwiseComparison::new("a", "c", 0.5, 0.0, 0.8),
        ];
        let matrix = build_distance_matrix(&comparisons).unwrap();
        let config = RenderConfig {
            figure_width: 10.0,
            figure_height: 6.5,
            dpi: 150,
            palette: "Set2".to_string(),
            ..RenderConfig::default()
        };

        let mut heatmap = Vec::new();
        write_heatmap(&mut heatmap, &HeatmapPlan::distance(&matrix, &config), &config).unwrap();
        let first = String::from_utf8(heatmap).unwrap().lines().next().unwrap().to_string();
        assert_eq!(
            first,
            "# mutation_distance\tcolormap=RdYlBu_r\trange=0..0.6\tfigure=10x6.5\tdpi=150\tfill=0.600"
        );

        let mut distributions = Vec::new();
        let plan = DistributionPlan::from_comparisons(&comparisons, &config);
        write_distributions(&mut distributions, &plan, &config).unwrap();
        let text = String::from_utf8(distributions).unwrap();
        assert!(text.starts_with("# figure=10x6.5\tdpi=150\tpalette=Set2\nmetric\t"));

        let mut scatter = Vec::new();
        write_scatter(&mut scatter, &ScatterPlan::from_comparisons(&comparisons), &config).unwrap();
        let text = String::from_utf8(scatter).unwrap();
        assert!(text.starts_with("# figure=10x6.5\tdpi=150\tpalette=Set2\n# ani vs p_value"));
    }

    #[test]
    fn writes_each_kind_and_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let comparisons = vec![
            PairwiseComparison::new("a", "b", 0.1, 0.0, 0.9),
            PairwiseComparison::new("a", "c", 0.2, 0.0, 0.8),
        ];
        let matrix = build_distance_matrix(&comparisons).unwrap();
        let config = RenderConfig::default();
        let backend = DataExportBackend::new();
        for kind in ArtifactKind::ALL {
            let plan = plan_artifact(kind, &comparisons, Ok(&matrix), &config).unwrap();
            let path = backend.render(&plan, &config, dir.path()).unwrap();
            assert!(path.exists(), "{kind}");
        }
        assert!(dir.path().join("dendrogram_simple.nwk").exists());

        let path = backend
            .render_placeholder(ArtifactKind::MdsAnalysis, "not enough genomes", &config, dir.path())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "error_mds_analysis.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("not enough genomes"));
    }
}
