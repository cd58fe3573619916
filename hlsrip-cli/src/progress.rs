use std::time::Duration;

use hlsrip_engine::TrackKind;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn download_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(
            "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} segments",
        )
        .unwrap()
        .progress_chars("=> ")
}

#[derive(Clone)]
pub struct ProgressManager {
    multi: MultiProgress,
    disabled: bool,
}

impl ProgressManager {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            disabled: false,
        }
    }

    pub fn new_disabled(multi: MultiProgress) -> Self {
        Self {
            multi,
            disabled: true,
        }
    }

    /// Adds a segment-count bar for one track.
    pub fn track_bar(&self, kind: TrackKind, total_segments: usize) -> ProgressBar {
        let bar = if self.disabled {
            ProgressBar::hidden()
        } else {
            self.multi.add(ProgressBar::new(total_segments as u64))
        };
        bar.set_style(download_style());
        bar.set_message(format!("Downloading {kind} segments"));
        bar.enable_steady_tick(Duration::from_millis(500));
        bar
    }
}
