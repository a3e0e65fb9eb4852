use std::sync::atomic::{AtomicUsize, Ordering};

use canegap_core::pipeline::{PipelineStage, ProgressReporter};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress reporter that drives one indicatif bar per input file.
pub struct BarProgressReporter {
    bar: ProgressBar,
    current_total: AtomicUsize,
}

impl BarProgressReporter {
    pub fn new(multi: &MultiProgress, label: &str) -> anyhow::Result<Self> {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>16} {msg:20} [{bar:30}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        bar.set_prefix(label.to_string());
        Ok(Self {
            bar,
            current_total: AtomicUsize::new(0),
        })
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.bar.abandon_with_message("failed");
    }
}

impl ProgressReporter for BarProgressReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        let total = total_items.unwrap_or(1);
        self.current_total.store(total, Ordering::Relaxed);
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        let total = self.current_total.load(Ordering::Relaxed);
        self.bar.set_position(total as u64);
    }
}
