//! Row line detection, gap measurement and metric conversion.

pub mod config;
pub mod detector;
pub mod direction;
pub mod gaps;
pub mod metrics;

pub use config::{GapConfig, MetricsConfig, PercentageBase, RowConfig, ScaleReference};
pub use detector::{detect_rows, RowLayout, RowLine};
pub use gaps::{measure_gaps, GapInterval, GapReport, RowGaps};
pub use metrics::{compute_metrics, validate_distance, FailureMetrics};
