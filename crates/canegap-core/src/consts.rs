/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum component count to run nearest-neighbour search in parallel.
pub const PARALLEL_COMPONENT_THRESHOLD: usize = 256;

/// Minimum row count to measure gaps in parallel.
pub const PARALLEL_ROW_THRESHOLD: usize = 4;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Largest channel spread (max - min) at which a pixel still counts as gray.
/// Below half an 8-bit step.
pub const CHROMA_EPSILON: f32 = 1.0 / 512.0;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Default sigma multiplier for MeanPlusSigma thresholding.
pub const DEFAULT_SIGMA_MULTIPLIER: f32 = 1.0;

/// Default lower percentile for the normalization stretch (0.1%).
pub const DEFAULT_STRETCH_LOW_PERCENTILE: f32 = 0.001;

/// Default upper percentile for the normalization stretch (99.9%).
pub const DEFAULT_STRETCH_HIGH_PERCENTILE: f32 = 0.999;

/// Default minimum component area in pixels. 1 keeps every foreground pixel.
pub const DEFAULT_MIN_COMPONENT_AREA: usize = 1;

/// Default morphological opening radius. 0 disables opening.
pub const DEFAULT_OPENING_RADIUS: usize = 0;

/// Number of angular bins (over [0, pi)) for the dominant row direction.
pub const DIRECTION_HISTOGRAM_BINS: usize = 180;

/// Lower bound for the derived row clustering tolerance, in pixels.
pub const MIN_ROW_TOLERANCE_PX: f64 = 1.0;

/// Default fraction of the expected spacing a pair may exceed before it is
/// counted as a gap. 0.5 means a gap starts at 1.5x the expected spacing.
pub const DEFAULT_SPACING_TOLERANCE: f64 = 0.5;

/// Default overlay stroke width in pixels.
pub const DEFAULT_STROKE_WIDTH: u32 = 2;

/// Default overlay colour for row lines (RGB).
pub const DEFAULT_ROW_COLOR: [u8; 3] = [255, 215, 0];

/// Default overlay colour for gap intervals (RGB).
pub const DEFAULT_GAP_COLOR: [u8; 3] = [230, 25, 25];

/// Default overlay colour for centroid markers (RGB).
pub const DEFAULT_MARKER_COLOR: [u8; 3] = [30, 144, 255];
