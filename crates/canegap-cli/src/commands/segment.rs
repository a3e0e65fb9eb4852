use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use canegap_core::io::image_io::save_mask_png;
use canegap_core::pipeline::segment_reported;
use clap::Args;
use indicatif::MultiProgress;
use tracing::info;

use super::SegmentationArgs;
use crate::progress::BarProgressReporter;
use crate::summary::print_segment_summary;

#[derive(Args)]
pub struct SegmentArgs {
    /// Input image (PNG, JPEG, TIFF)
    pub file: PathBuf,

    #[command(flatten)]
    pub segmentation: SegmentationArgs,
}

pub fn run(args: &SegmentArgs) -> Result<()> {
    let opts = &args.segmentation;
    let mut config = opts.load_config()?;
    opts.apply(&mut config.segmentation);
    config.segmentation.validate()?;

    let image = opts.load_image(&args.file)?;
    info!(
        path = %args.file.display(),
        width = image.width(),
        height = image.height(),
        "Segmenting"
    );

    let multi = MultiProgress::new();
    let reporter = Arc::new(BarProgressReporter::new(&multi, "segment")?);
    let output = match segment_reported(&image, &config.segmentation, reporter.clone()) {
        Ok(output) => output,
        Err(e) => {
            reporter.abandon();
            return Err(e).with_context(|| format!("Segmentation failed for {}", args.file.display()));
        }
    };
    reporter.finish("done");

    std::fs::create_dir_all(&opts.output_dir)
        .with_context(|| format!("Failed to create {}", opts.output_dir.display()))?;
    let mask_path = opts.output_path(&args.file, "mask.png");
    save_mask_png(&output.map.foreground_mask(), &mask_path)?;

    print_segment_summary(&args.file, &config.segmentation, &output, &mask_path);
    Ok(())
}
