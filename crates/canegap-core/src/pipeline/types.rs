use std::sync::Arc;

use crate::frame::ColorFrame;
use crate::rows::{FailureMetrics, GapInterval, RowLine};
use crate::segmentation::{Component, ComponentMap};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Normalizing,
    Classifying,
    Labeling,
    DetectingRows,
    MeasuringGaps,
    ComputingMetrics,
    Rendering,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalizing => write!(f, "Normalizing"),
            Self::Classifying => write!(f, "Classifying pixels"),
            Self::Labeling => write!(f, "Labeling components"),
            Self::DetectingRows => write!(f, "Detecting rows"),
            Self::MeasuringGaps => write!(f, "Measuring gaps"),
            Self::ComputingMetrics => write!(f, "Computing metrics"),
            Self::Rendering => write!(f, "Rendering overlay"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., image rows while labeling), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}

    /// Polled between work items of long stages; returning `true` aborts the
    /// invocation with `CanegapError::Cancelled`.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// No-op progress reporter, used by the unreported entry points.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Result of `segment`.
#[derive(Clone, Debug)]
pub struct SegmentOutput {
    /// The normalized image the components were found on.
    pub image: Arc<ColorFrame>,
    /// Components in discovery order.
    pub components: Vec<Component>,
    pub map: ComponentMap,
    /// Threshold applied to the vegetation index.
    pub threshold: f32,
}

/// Result of `process`.
#[derive(Clone, Debug)]
pub struct ProcessOutput {
    /// Overlay of rows and gaps on the caller's image, before normalization.
    pub image: ColorFrame,
    pub lines: Vec<RowLine>,
    pub gaps: Vec<GapInterval>,
    /// Failure percentage in [0, 100].
    pub percentage: f64,
    /// Failure length in the units of the caller's distance.
    pub meters: f64,
    pub metrics: FailureMetrics,
}
