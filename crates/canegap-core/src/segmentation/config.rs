use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MIN_COMPONENT_AREA, DEFAULT_OPENING_RADIUS, DEFAULT_SIGMA_MULTIPLIER,
    DEFAULT_STRETCH_HIGH_PERCENTILE, DEFAULT_STRETCH_LOW_PERCENTILE,
};
use crate::error::{CanegapError, Result};

/// Method used to separate vegetation from soil on the vegetation index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ThresholdMethod {
    /// Threshold = mean + sigma_multiplier * stddev.
    MeanPlusSigma,
    /// Otsu's method: minimizes intra-class variance on a bimodal histogram.
    #[default]
    Otsu,
    /// User-specified fixed threshold in [0.0, 1.0].
    Fixed(f32),
}

impl std::fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeanPlusSigma => write!(f, "Mean + Sigma"),
            Self::Otsu => write!(f, "Otsu"),
            Self::Fixed(v) => write!(f, "Fixed ({v:.3})"),
        }
    }
}

/// Per-pixel scalar used to score "how much plant" a pixel is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VegetationIndex {
    /// Excess green when the image carries colour, luminance when every
    /// pixel is gray (binary or pre-segmented input).
    #[default]
    Auto,
    /// Excess green (2g - r - b) on chromatic coordinates.
    ExcessGreen,
    /// Raw green channel.
    Green,
    /// ITU-R BT.601 luminance, for pre-segmented or grayscale input.
    Luminance,
}

impl std::fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "Auto"),
            Self::ExcessGreen => write!(f, "Excess Green"),
            Self::Green => write!(f, "Green"),
            Self::Luminance => write!(f, "Luminance"),
        }
    }
}

/// Pixel neighbourhood used when labeling connected components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge neighbours only.
    Four,
    /// Edge and corner neighbours. Keeps diagonally touching leaves together.
    #[default]
    Eight,
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Four => write!(f, "4-connected"),
            Self::Eight => write!(f, "8-connected"),
        }
    }
}

/// Configuration for foreground segmentation and labeling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Stretch each channel to its percentile range before classification.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
    #[serde(default = "default_low_percentile")]
    pub low_percentile: f32,
    #[serde(default = "default_high_percentile")]
    pub high_percentile: f32,
    #[serde(default)]
    pub index: VegetationIndex,
    #[serde(default)]
    pub threshold_method: ThresholdMethod,
    /// Sigma multiplier for MeanPlusSigma method.
    #[serde(default = "default_sigma_multiplier")]
    pub sigma_multiplier: f32,
    /// Radius of the square opening kernel. 0 disables opening.
    #[serde(default = "default_opening_radius")]
    pub opening_radius: usize,
    #[serde(default)]
    pub connectivity: Connectivity,
    /// Components smaller than this (pixels) are returned to background.
    #[serde(default = "default_min_area")]
    pub min_area: usize,
}

fn default_normalize() -> bool {
    true
}
fn default_low_percentile() -> f32 {
    DEFAULT_STRETCH_LOW_PERCENTILE
}
fn default_high_percentile() -> f32 {
    DEFAULT_STRETCH_HIGH_PERCENTILE
}
fn default_sigma_multiplier() -> f32 {
    DEFAULT_SIGMA_MULTIPLIER
}
fn default_opening_radius() -> usize {
    DEFAULT_OPENING_RADIUS
}
fn default_min_area() -> usize {
    DEFAULT_MIN_COMPONENT_AREA
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            normalize: default_normalize(),
            low_percentile: DEFAULT_STRETCH_LOW_PERCENTILE,
            high_percentile: DEFAULT_STRETCH_HIGH_PERCENTILE,
            index: VegetationIndex::default(),
            threshold_method: ThresholdMethod::default(),
            sigma_multiplier: DEFAULT_SIGMA_MULTIPLIER,
            opening_radius: DEFAULT_OPENING_RADIUS,
            connectivity: Connectivity::default(),
            min_area: DEFAULT_MIN_COMPONENT_AREA,
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.normalize {
            let ordered = 0.0 <= self.low_percentile
                && self.low_percentile < self.high_percentile
                && self.high_percentile <= 1.0;
            if !ordered {
                return Err(CanegapError::InvalidConfig(format!(
                    "stretch percentiles must satisfy 0 <= low < high <= 1 (got {} and {})",
                    self.low_percentile, self.high_percentile
                )));
            }
        }
        if let ThresholdMethod::Fixed(v) = self.threshold_method {
            if !(0.0..=1.0).contains(&v) {
                return Err(CanegapError::InvalidConfig(format!(
                    "fixed threshold must be in [0, 1] (got {v})"
                )));
            }
        }
        if !self.sigma_multiplier.is_finite() {
            return Err(CanegapError::InvalidConfig(format!(
                "sigma multiplier must be finite (got {})",
                self.sigma_multiplier
            )));
        }
        if self.min_area == 0 {
            return Err(CanegapError::InvalidConfig(
                "minimum component area must be at least 1 pixel".into(),
            ));
        }
        Ok(())
    }
}
