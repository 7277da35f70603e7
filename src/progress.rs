//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinners shown while a run loads and compares its inputs
#[derive(Debug)]
pub struct ProgressReporter {
    pub load_pb: Option<ProgressBar>,
    pub compare_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for a reconciliation run
    pub fn new_for_run() -> Self {
        Self {
            load_pb: None,
            compare_pb: None,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            load_pb: None,
            compare_pb: None,
            show_progress: false,
        }
    }

    /// Start or update the loading spinner
    pub fn start_loading(&mut self, message: &str) {
        if !self.show_progress {
            return;
        }
        match &self.load_pb {
            Some(pb) => pb.set_message(message.to_string()),
            None => self.load_pb = Some(create_spinner(message)),
        }
    }

    pub fn finish_loading(&mut self, message: &str) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn start_compare(&mut self) {
        if self.show_progress && self.compare_pb.is_none() {
            self.compare_pb = Some(create_spinner("Reconciling datasets..."));
        }
    }

    /// Clear the compare spinner so the summary prints cleanly
    pub fn finish_compare(&mut self) {
        if let Some(pb) = self.compare_pb.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.compare_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
