//! Foreground segmentation: vegetation index, threshold, optional opening and
//! connected-component labeling.

pub mod components;
pub mod config;
pub mod morphology;
pub mod threshold;
pub mod vegetation;

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CanegapError, Result};
use crate::filters::histogram::auto_stretch_color;
use crate::frame::ColorFrame;
use crate::pipeline::{PipelineStage, ProgressReporter};

pub use components::{label_components, Component, ComponentMap};
pub use config::{Connectivity, SegmentationConfig, ThresholdMethod, VegetationIndex};

use morphology::morphological_opening;
use threshold::foreground_mask;
use vegetation::{resolve_index, vegetation_index};

/// Segment an image into plant components.
///
/// Pipeline: percentile stretch -> vegetation index -> threshold ->
/// morphological opening -> connected component labeling.
///
/// Returns the component map (which holds both the normalized image and the
/// caller's original) and the threshold that was applied to the vegetation
/// index.
pub fn segment_frame(
    image: &ColorFrame,
    config: &SegmentationConfig,
    reporter: &dyn ProgressReporter,
) -> Result<(ComponentMap, f32)> {
    config.validate()?;
    let (h, w) = (image.height(), image.width());
    if h == 0 || w == 0 {
        return Err(CanegapError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        });
    }

    // Step 1: Normalize channels for consistent thresholding.
    reporter.begin_stage(PipelineStage::Normalizing, None);
    let original = Arc::new(image.clone());
    let normalized = if config.normalize {
        Arc::new(auto_stretch_color(image, config.low_percentile, config.high_percentile))
    } else {
        Arc::clone(&original)
    };
    reporter.finish_stage();

    // Step 2: Vegetation index and binary mask.
    reporter.begin_stage(PipelineStage::Classifying, None);
    let index_kind = resolve_index(&normalized, config.index);
    let index = vegetation_index(&normalized, index_kind);
    let (mask, threshold) = foreground_mask(&index, &config.threshold_method, config.sigma_multiplier);
    debug!(
        index = %index_kind,
        method = %config.threshold_method,
        threshold,
        "Classified foreground"
    );

    // Step 3: Morphological opening to drop specks.
    let mask = morphological_opening(&mask, config.opening_radius);
    reporter.finish_stage();

    // Step 4: Connected component analysis.
    reporter.begin_stage(PipelineStage::Labeling, Some(h));
    let (labels, components) =
        label_components(&mask, config.connectivity, config.min_area, reporter)?;
    reporter.finish_stage();

    info!(
        width = w,
        height = h,
        components = components.len(),
        "Segmentation complete"
    );

    Ok((
        ComponentMap::from_parts(labels, components, normalized).with_original(original),
        threshold,
    ))
}
