//! Terminal progress display for downloads.

use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use vsixfetch::fetch::{FetchEvent, FetchProgressCallback};

/// Progress bar counting finished downloads.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl DownloadProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }

    /// Callback for [`vsixfetch::FetchEngine::with_progress`].
    pub fn callback(&self) -> FetchProgressCallback {
        let bar = self.bar.clone();
        Arc::new(move |event: &FetchEvent| {
            let filename = event.filename();
            match event {
                FetchEvent::Started { .. } => bar.set_message(filename.to_string()),
                FetchEvent::Finished { .. } => {
                    bar.println(format!("{} {}", style("✓").green(), filename));
                    bar.inc(1);
                }
                FetchEvent::Failed { error, .. } => {
                    bar.println(format!("{} {}: {}", style("✗").red(), filename, error));
                }
            }
        })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
