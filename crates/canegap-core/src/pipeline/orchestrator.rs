use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::frame::ColorFrame;
use crate::render::render_overlay;
use crate::rows::{compute_metrics, detect_rows, measure_gaps, validate_distance};
use crate::segmentation::{segment_frame, ComponentMap, SegmentationConfig};

use super::config::{PipelineConfig, ProcessConfig};
use super::types::{NoOpReporter, PipelineStage, ProcessOutput, ProgressReporter, SegmentOutput};

/// Segment an image into plant components.
pub fn segment(image: &ColorFrame, config: &SegmentationConfig) -> Result<SegmentOutput> {
    segment_reported(image, config, Arc::new(NoOpReporter))
}

/// Segment an image with a thread-safe progress reporter.
pub fn segment_reported(
    image: &ColorFrame,
    config: &SegmentationConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<SegmentOutput> {
    let (map, threshold) = segment_frame(image, config, reporter.as_ref())?;
    Ok(SegmentOutput {
        image: Arc::clone(map.source()),
        components: map.components().to_vec(),
        map,
        threshold,
    })
}

/// Find rows and gaps in a segmented image and convert them to metrics.
///
/// `distance` is the real-world length of the scale reference (one plant
/// spacing by default). The call is all-or-nothing: an invalid input or a
/// broken component map fails it before any partial result is produced.
pub fn process(map: &ComponentMap, distance: f64, config: &ProcessConfig) -> Result<ProcessOutput> {
    process_reported(map, distance, config, Arc::new(NoOpReporter))
}

/// `process` with a thread-safe progress reporter.
pub fn process_reported(
    map: &ComponentMap,
    distance: f64,
    config: &ProcessConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<ProcessOutput> {
    validate_distance(distance)?;
    config.validate()?;
    map.validate()?;

    reporter.begin_stage(PipelineStage::DetectingRows, Some(map.len()));
    let layout = detect_rows(map, &config.rows)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::MeasuringGaps, Some(layout.lines.len()));
    let report = measure_gaps(&layout.lines, &config.gaps)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::ComputingMetrics, None);
    let metrics = compute_metrics(&report, &layout, distance, &config.metrics)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Rendering, None);
    let gaps = report.intervals();
    let image = render_overlay(map.original(), &layout.lines, &gaps, &config.overlay);
    reporter.finish_stage();

    info!(
        percentage = metrics.percentage,
        meters = metrics.meters,
        insufficient_data = metrics.insufficient_data,
        "Processing complete"
    );

    Ok(ProcessOutput {
        image,
        lines: layout.lines,
        gaps,
        percentage: metrics.percentage,
        meters: metrics.meters,
        metrics,
    })
}

/// Run `segment` then `process` on one image.
pub fn run(image: &ColorFrame, distance: f64, config: &PipelineConfig) -> Result<(SegmentOutput, ProcessOutput)> {
    run_reported(image, distance, config, Arc::new(NoOpReporter))
}

/// `run` with a thread-safe progress reporter.
///
/// The distance and both configurations are checked before segmentation
/// starts, so a usage error never costs a labeling pass.
pub fn run_reported(
    image: &ColorFrame,
    distance: f64,
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<(SegmentOutput, ProcessOutput)> {
    validate_distance(distance)?;
    config.validate()?;
    let segmented = segment_reported(image, &config.segmentation, Arc::clone(&reporter))?;
    let processed = process_reported(&segmented.map, distance, &config.process, reporter)?;
    Ok((segmented, processed))
}
