use serde::Serialize;
use tracing::warn;

use crate::error::{CanegapError, Result};

use super::config::{MetricsConfig, PercentageBase, ScaleReference};
use super::detector::RowLayout;
use super::gaps::GapReport;

/// Failure metrics for one image.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FailureMetrics {
    /// Share of the row length that is missing, in [0, 100].
    pub percentage: f64,
    /// Missing length in real-world units.
    pub meters: f64,
    /// No row length to measure against; `percentage` is 0 by convention.
    pub insufficient_data: bool,
    pub total_row_length_px: f64,
    pub total_gap_length_px: f64,
    /// Pixel length that corresponds to the caller's distance.
    pub reference_px: Option<f64>,
    pub meters_per_pixel: f64,
    pub gap_count: usize,
    pub row_count: usize,
}

/// Reject a distance that cannot scale pixels to meters.
pub fn validate_distance(distance: f64) -> Result<()> {
    if distance.is_finite() && distance > 0.0 {
        Ok(())
    } else {
        Err(CanegapError::InvalidDistance(distance))
    }
}

/// The pixel length the caller's `distance` refers to.
pub fn reference_length(
    report: &GapReport,
    layout: &RowLayout,
    reference: ScaleReference,
) -> Option<f64> {
    match reference {
        ScaleReference::PlantSpacing => report.expected_spacing,
        ScaleReference::RowSpacing => match layout.row_spacing().filter(|s| *s > 0.0) {
            Some(spacing) => Some(spacing),
            None => {
                warn!(
                    rows = layout.lines.len(),
                    "Row spacing needs two rows; falling back to plant spacing"
                );
                report.expected_spacing
            }
        },
    }
}

/// Convert pixel gap totals into a percentage and a real-world length.
///
/// `meters = gap_px * (distance / reference_px)`, so the result is linear in
/// `distance`. Without a reference length nothing can be missing and meters
/// is 0.
pub fn compute_metrics(
    report: &GapReport,
    layout: &RowLayout,
    distance: f64,
    config: &MetricsConfig,
) -> Result<FailureMetrics> {
    validate_distance(distance)?;

    let gap = report.total_gap_length.max(0.0);
    let row_length = report.total_row_length;
    let insufficient_data = row_length <= 0.0;

    let denominator = match config.percentage_base {
        PercentageBase::PlantedLength => row_length - gap,
        PercentageBase::RowLength => row_length,
    };
    let percentage = if insufficient_data || gap <= 0.0 {
        0.0
    } else if denominator <= 0.0 {
        100.0
    } else {
        (100.0 * gap / denominator).clamp(0.0, 100.0)
    };

    let reference_px = reference_length(report, layout, config.scale_reference);
    let meters_per_pixel = match reference_px {
        Some(px) if px > 0.0 => distance / px,
        _ => 0.0,
    };

    Ok(FailureMetrics {
        percentage,
        meters: gap * meters_per_pixel,
        insufficient_data,
        total_row_length_px: row_length,
        total_gap_length_px: gap,
        reference_px,
        meters_per_pixel,
        gap_count: report.gap_count(),
        row_count: layout.lines.len(),
    })
}
