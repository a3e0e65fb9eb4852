use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SPACING_TOLERANCE;
use crate::error::{CanegapError, Result};

/// Configuration for grouping components into plantation rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RowConfig {
    /// Maximum gap (pixels, across the row direction) between neighbouring
    /// components of the same row. Derived from component sizes when unset.
    #[serde(default)]
    pub row_tolerance: Option<f64>,
}

impl RowConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.row_tolerance {
            if !(t.is_finite() && t > 0.0) {
                return Err(CanegapError::InvalidConfig(format!(
                    "row tolerance must be a positive number of pixels (got {t})"
                )));
            }
        }
        Ok(())
    }
}

/// Which pixel distance the caller's real-world distance refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleReference {
    /// Distance is the real-world length of one expected plant spacing.
    #[default]
    PlantSpacing,
    /// Distance is the real-world spacing between adjacent planting rows.
    RowSpacing,
}

impl std::fmt::Display for ScaleReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlantSpacing => write!(f, "Plant spacing"),
            Self::RowSpacing => write!(f, "Row spacing"),
        }
    }
}

/// Configuration for gap detection along rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapConfig {
    /// Expected distance (pixels) between consecutive plants. When unset it
    /// is the median consecutive-centroid distance over all rows.
    #[serde(default)]
    pub expected_spacing: Option<f64>,
    /// Fraction of the expected spacing a pair may exceed before counting as
    /// a gap.
    #[serde(default = "default_spacing_tolerance")]
    pub spacing_tolerance: f64,
}

fn default_spacing_tolerance() -> f64 {
    DEFAULT_SPACING_TOLERANCE
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            expected_spacing: None,
            spacing_tolerance: DEFAULT_SPACING_TOLERANCE,
        }
    }
}

impl GapConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(s) = self.expected_spacing {
            if !(s.is_finite() && s > 0.0) {
                return Err(CanegapError::InvalidConfig(format!(
                    "expected spacing must be a positive number of pixels (got {s})"
                )));
            }
        }
        if !(self.spacing_tolerance.is_finite() && self.spacing_tolerance >= 0.0) {
            return Err(CanegapError::InvalidConfig(format!(
                "spacing tolerance must be a non-negative fraction (got {})",
                self.spacing_tolerance
            )));
        }
        Ok(())
    }
}

/// Which row length the failure percentage is taken against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentageBase {
    /// Row length at expected spacing: the polyline length with the gap
    /// excess removed. A row 0-10-20-40-50 with one 10 px gap has a planted
    /// length of 40 px, giving 25 %.
    ///
    /// The ratio is gap / (row - gap), so it reaches 100 % once the gaps
    /// cover half the polyline and is clamped there. Use `RowLength` when
    /// heavily damaged fields need to stay distinguishable.
    #[default]
    PlantedLength,
    /// Full polyline length of the rows.
    RowLength,
}

impl std::fmt::Display for PercentageBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlantedLength => write!(f, "Planted length"),
            Self::RowLength => write!(f, "Row length"),
        }
    }
}

/// Configuration for converting gap totals into reported metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub scale_reference: ScaleReference,
    #[serde(default)]
    pub percentage_base: PercentageBase,
}
