use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GAP_COLOR, DEFAULT_MARKER_COLOR, DEFAULT_ROW_COLOR, DEFAULT_STROKE_WIDTH};
use crate::error::{CanegapError, Result};

/// Appearance of the row/gap overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Stroke width in pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default = "default_row_color")]
    pub row_color: [u8; 3],
    #[serde(default = "default_gap_color")]
    pub gap_color: [u8; 3],
    /// Mark each plant centroid with a small cross.
    #[serde(default)]
    pub draw_markers: bool,
    #[serde(default = "default_marker_color")]
    pub marker_color: [u8; 3],
}

fn default_stroke_width() -> u32 {
    DEFAULT_STROKE_WIDTH
}
fn default_row_color() -> [u8; 3] {
    DEFAULT_ROW_COLOR
}
fn default_gap_color() -> [u8; 3] {
    DEFAULT_GAP_COLOR
}
fn default_marker_color() -> [u8; 3] {
    DEFAULT_MARKER_COLOR
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            row_color: DEFAULT_ROW_COLOR,
            gap_color: DEFAULT_GAP_COLOR,
            draw_markers: false,
            marker_color: DEFAULT_MARKER_COLOR,
        }
    }
}

impl OverlayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stroke_width == 0 {
            return Err(CanegapError::InvalidConfig(
                "overlay stroke width must be at least 1 pixel".into(),
            ));
        }
        if self.row_color == self.gap_color {
            return Err(CanegapError::InvalidConfig(
                "row and gap colours must differ".into(),
            ));
        }
        Ok(())
    }
}
