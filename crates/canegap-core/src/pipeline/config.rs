use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::OverlayConfig;
use crate::rows::{GapConfig, MetricsConfig, RowConfig};
use crate::segmentation::SegmentationConfig;

/// Everything `process` needs besides the component map and the distance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    #[serde(default)]
    pub rows: RowConfig,
    #[serde(default)]
    pub gaps: GapConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        self.rows.validate()?;
        self.gaps.validate()?;
        self.overlay.validate()
    }
}

/// Full pipeline configuration, as read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub process: ProcessConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.segmentation.validate()?;
        self.process.validate()
    }
}
