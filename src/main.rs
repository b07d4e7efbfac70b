use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fungigt::render::DendrogramPlan;
use fungigt::{
    build_distance_matrix, parse_file, summarize, FileType, JobConfig, JobRunner, LinkageMethod,
    VisualizerRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "fungigt", about = "Comparative-genomics figures from BinDash distance tables")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a full visualization job and print its report.
    Visualize {
        /// Input file.
        file: PathBuf,
        /// Directory that receives the job's output directory.
        #[arg(long)]
        output_root: Option<PathBuf>,
        /// Skip detection and treat the file as this type.
        #[arg(long)]
        file_type: Option<FileType>,
        /// Do not write report.json.
        #[arg(long)]
        no_report: bool,
        /// Bins per distribution histogram.
        #[arg(long)]
        histogram_bins: Option<usize>,
    },
    /// Print summary statistics as JSON.
    Stats {
        /// BinDash distance file.
        file: PathBuf,
    },
    /// Print the completed distance matrix as TSV.
    Matrix {
        /// BinDash distance file.
        file: PathBuf,
    },
    /// Print the clustering tree in Newick format.
    Tree {
        /// BinDash distance file.
        file: PathBuf,
        /// Linkage method; defaults to the configured one.
        #[arg(long)]
        linkage: Option<LinkageMethod>,
    },
    /// List known file types and whether a visualizer handles them.
    Types,
}

fn main() -> Result<()> {
    let log_level = std::env::var("FUNGIGT_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Visualize {
            file,
            output_root,
            file_type,
            no_report,
            histogram_bins,
        } => {
            let mut config = config;
            if let Some(root) = output_root {
                config = config.with_output_root(root);
            }
            if let Some(ty) = file_type {
                config = config.with_file_type(ty);
            }
            if no_report {
                config = config.with_report(false);
            }
            if let Some(bins) = histogram_bins {
                config.render = config.render.with_histogram_bins(bins);
                config.render.validate().context("invalid --histogram-bins")?;
            }
            run_visualize(config, &file)?
        }
        Commands::Stats { file } => run_stats(&file)?,
        Commands::Matrix { file } => run_matrix(&file)?,
        Commands::Tree { file, linkage } => {
            run_tree(&file, linkage.unwrap_or(config.render.linkage_method))?
        }
        Commands::Types => run_types()?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<JobConfig> {
    match path {
        Some(path) => JobConfig::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(JobConfig::default()),
    }
}

fn run_visualize(config: JobConfig, file: &Path) -> Result<()> {
    let report = JobRunner::new(config)
        .run(file)
        .with_context(|| format!("job failed for {}", file.display()))?;
    let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
    println!("{json}");
    if let Some(failure) = &report.error {
        bail!("{} ({}): {}", failure.kind, failure.file, failure.message);
    }
    Ok(())
}

fn run_stats(file: &Path) -> Result<()> {
    let parsed =
        parse_file(file).with_context(|| format!("failed to parse {}", file.display()))?;
    let stats = summarize(&parsed.comparisons);
    let json = serde_json::to_string_pretty(&stats).context("failed to encode statistics")?;
    println!("{json}");
    Ok(())
}

fn run_matrix(file: &Path) -> Result<()> {
    let parsed =
        parse_file(file).with_context(|| format!("failed to parse {}", file.display()))?;
    let matrix = build_distance_matrix(&parsed.comparisons)
        .with_context(|| format!("failed to build distance matrix for {}", file.display()))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    matrix.write_tsv(&mut out).context("failed to write matrix")?;
    Ok(())
}

fn run_tree(file: &Path, method: LinkageMethod) -> Result<()> {
    let parsed =
        parse_file(file).with_context(|| format!("failed to parse {}", file.display()))?;
    let matrix = build_distance_matrix(&parsed.comparisons)
        .with_context(|| format!("failed to build distance matrix for {}", file.display()))?;
    let plan = DendrogramPlan::from_matrix(&matrix, method).context("clustering failed")?;
    println!("{}", plan.newick);
    Ok(())
}

fn run_types() -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for info in VisualizerRegistry::with_defaults().list() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            info.file_type,
            if info.available { "available" } else { "fallback" },
            info.extensions.join(","),
            info.description
        )?;
    }
    Ok(())
}
