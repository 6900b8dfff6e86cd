use bullseye::pipeline::PipelineProgress;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}% ({eta}) tracking";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} spectra matched ({per_sec})";

/// Draws the tracker percentage and the running count of matched spectra.
#[derive(Default)]
pub struct ProgressReporter {
    tracking: Option<ProgressBar>,
    matching: Option<ProgressBar>,
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&mut self) {
        if let Some(bar) = self.matching.take() {
            bar.finish();
        }
        if let Some(bar) = self.tracking.take() {
            bar.finish_and_clear();
        }
    }
}

impl PipelineProgress for ProgressReporter {
    fn tracking(&mut self, percent: u8) {
        let bar = self.tracking.get_or_insert_with(|| {
            let bar = ProgressBar::new(100);
            bar.set_style(style(BAR_TEMPLATE));
            bar
        });
        bar.set_position(percent as u64);
    }

    fn tracking_done(&mut self) {
        if let Some(bar) = self.tracking.take() {
            bar.finish_and_clear();
        }
    }

    fn spectra_processed(&mut self, total: usize) {
        let bar = self.matching.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(style(SPINNER_TEMPLATE));
            bar
        });
        bar.set_position(total as u64);
    }
}
