pub mod config;
mod orchestrator;
mod types;

pub use config::{PipelineConfig, ProcessConfig};
pub use orchestrator::{process, process_reported, run, run_reported, segment, segment_reported};
pub use types::{NoOpReporter, PipelineStage, ProcessOutput, ProgressReporter, SegmentOutput};
