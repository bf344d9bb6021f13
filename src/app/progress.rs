//! Terminal progress bar + Ctrl-C cancellation for the batch loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

use crate::batch::{BatchObserver, BatchProgress, RunSummary};

/// Observer used by `boltgen run`.
pub struct ConsoleObserver {
    bar: Option<ProgressBar>,
    cancelled: Arc<AtomicBool>,
}

impl ConsoleObserver {
    /// Installs the Ctrl-C handler; a first Ctrl-C stops after the current bolt.
    ///
    /// The bar length is taken from the planned bolt count on the first update.
    pub fn new(show_progress: bool) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        {
            let flag = cancelled.clone();
            if let Err(err) = ctrlc::set_handler(move || {
                eprintln!("\nCancelling after the current bolt...");
                flag.store(true, Ordering::SeqCst);
            }) {
                warn!("Ctrl-C handler not installed: {err}");
            }
        }

        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(0);
            let style = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style);
            bar
        });

        Self { bar, cancelled }
    }
}

impl BatchObserver for ConsoleObserver {
    fn on_progress(&mut self, progress: &BatchProgress) {
        if let Some(bar) = &self.bar {
            update_bar(bar, progress);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn on_finish(&mut self, _summary: &RunSummary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn update_bar(bar: &ProgressBar, progress: &BatchProgress) {
    bar.set_length(u64::from(progress.target));
    bar.set_position(u64::from(progress.built));
    bar.set_message(format!(
        "bolt {} of {} (attempt {})",
        progress.next_bolt,
        progress.end_bolt,
        progress.attempts + 1
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_tracks_the_planned_count() {
        let bar = ProgressBar::hidden();
        update_bar(
            &bar,
            &BatchProgress {
                built: 12,
                target: 240,
                attempts: 13,
                next_bolt: 773,
                end_bolt: 1000,
            },
        );
        assert_eq!(bar.length(), Some(240));
        assert_eq!(bar.position(), 12);
        assert_eq!(bar.message(), "bolt 773 of 1000 (attempt 14)");
    }
}
