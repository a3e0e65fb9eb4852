use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use canegap_core::io::image_io::save_color_png;
use canegap_core::pipeline::{run_reported, PipelineConfig};
use canegap_core::rows::{validate_distance, FailureMetrics, GapInterval, PercentageBase, ScaleReference};
use clap::{Args, ValueEnum};
use indicatif::MultiProgress;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info};

use super::SegmentationArgs;
use crate::progress::BarProgressReporter;
use crate::summary::{print_batch_footer, print_run_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum ScaleArg {
    /// Distance is one plant spacing
    Plant,
    /// Distance is the spacing between adjacent rows
    Row,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PercentageArg {
    /// Row length with the gap excess removed
    Planted,
    /// Full row polyline length
    Row,
}

#[derive(Args)]
pub struct RunArgs {
    /// Input images (PNG, JPEG, TIFF)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Real-world length of the scale reference, in meters
    #[arg(short, long)]
    pub distance: f64,

    #[command(flatten)]
    pub segmentation: SegmentationArgs,

    /// What the distance refers to
    #[arg(long, value_enum)]
    pub scale: Option<ScaleArg>,

    /// Denominator of the failure percentage
    #[arg(long, value_enum)]
    pub percentage_of: Option<PercentageArg>,

    /// Max across-row gap (pixels) between components of one row
    #[arg(long)]
    pub row_tolerance: Option<f64>,

    /// Expected plant spacing in pixels (median spacing when omitted)
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Fraction of the expected spacing a pair may exceed before it is a gap
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Mark each plant centroid on the overlay
    #[arg(long)]
    pub markers: bool,

    /// Downscale the saved overlay so neither side exceeds this many pixels
    #[arg(long)]
    pub preview_max_dim: Option<usize>,

    /// Also write a TOML report of the metrics and gaps per image
    #[arg(long)]
    pub report: bool,
}

/// Per-image metrics written by `--report`.
#[derive(Serialize)]
struct ImageReport<'a> {
    input: &'a Path,
    distance: f64,
    components: usize,
    threshold: f32,
    metrics: &'a FailureMetrics,
    gaps: &'a [GapInterval],
}

/// Everything the summary needs about one processed image.
pub struct FileOutcome {
    pub input: PathBuf,
    pub overlay: PathBuf,
    pub report: Option<PathBuf>,
    pub components: usize,
    pub rows: usize,
    pub threshold: f32,
    pub metrics: FailureMetrics,
}

pub fn run(args: &RunArgs) -> Result<()> {
    validate_distance(args.distance)?;

    let config = build_config(args)?;
    config.validate()?;

    std::fs::create_dir_all(&args.segmentation.output_dir).with_context(|| {
        format!(
            "Failed to create {}",
            args.segmentation.output_dir.display()
        )
    })?;

    info!(files = args.files.len(), distance = args.distance, "Starting batch");

    let multi = MultiProgress::new();
    let results: Vec<(PathBuf, Result<FileOutcome>)> = args
        .files
        .par_iter()
        .map(|path| (path.clone(), process_file(path, args, &config, &multi)))
        .collect();

    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(outcome) => print_run_summary(outcome, &config),
            Err(e) => {
                failed += 1;
                error!(path = %path.display(), "{e:#}");
            }
        }
    }
    print_batch_footer(results.len(), failed);

    if failed > 0 {
        bail!("{failed} of {} image(s) failed", results.len());
    }
    Ok(())
}

fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = args.segmentation.load_config()?;
    args.segmentation.apply(&mut config.segmentation);

    let process = &mut config.process;
    if let Some(t) = args.row_tolerance {
        process.rows.row_tolerance = Some(t);
    }
    if let Some(s) = args.spacing {
        process.gaps.expected_spacing = Some(s);
    }
    if let Some(t) = args.tolerance {
        process.gaps.spacing_tolerance = t;
    }
    if let Some(scale) = args.scale {
        process.metrics.scale_reference = match scale {
            ScaleArg::Plant => ScaleReference::PlantSpacing,
            ScaleArg::Row => ScaleReference::RowSpacing,
        };
    }
    if let Some(base) = args.percentage_of {
        process.metrics.percentage_base = match base {
            PercentageArg::Planted => PercentageBase::PlantedLength,
            PercentageArg::Row => PercentageBase::RowLength,
        };
    }
    if args.markers {
        process.overlay.draw_markers = true;
    }
    Ok(config)
}

fn process_file(
    path: &Path,
    args: &RunArgs,
    config: &PipelineConfig,
    multi: &MultiProgress,
) -> Result<FileOutcome> {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let reporter = Arc::new(BarProgressReporter::new(multi, &label)?);

    match analyze(path, args, config, reporter.clone()) {
        Ok(outcome) => {
            reporter.finish("done");
            Ok(outcome)
        }
        Err(e) => {
            reporter.abandon();
            Err(e.context(format!("Processing {} failed", path.display())))
        }
    }
}

fn analyze(
    path: &Path,
    args: &RunArgs,
    config: &PipelineConfig,
    reporter: Arc<BarProgressReporter>,
) -> Result<FileOutcome> {
    let opts = &args.segmentation;
    let image = opts.load_image(path)?;
    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Loaded image"
    );

    let (segmented, processed) = run_reported(&image, args.distance, config, reporter)?;

    let overlay = match args.preview_max_dim {
        Some(max_dim) => processed.image.scaled_to_fit(max_dim),
        None => processed.image,
    };
    let overlay_path = opts.output_path(path, "overlay.png");
    save_color_png(&overlay, &overlay_path)
        .with_context(|| format!("Failed to write {}", overlay_path.display()))?;

    let report_path = if args.report {
        let report = ImageReport {
            input: path,
            distance: args.distance,
            components: segmented.components.len(),
            threshold: segmented.threshold,
            metrics: &processed.metrics,
            gaps: &processed.gaps,
        };
        let report_path = opts.output_path(path, "report.toml");
        std::fs::write(&report_path, toml::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        Some(report_path)
    } else {
        None
    };

    Ok(FileOutcome {
        input: path.to_path_buf(),
        overlay: overlay_path,
        report: report_path,
        components: segmented.components.len(),
        rows: processed.lines.len(),
        threshold: segmented.threshold,
        metrics: processed.metrics,
    })
}
