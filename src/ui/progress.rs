//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::events::ProgressEvent;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Totals gathered while a search ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub drives: usize,
    pub confirmed: usize,
    pub skipped: usize,
}

/// Spinner fed by resolution progress events.
///
/// Shows an indicatif spinner in interactive mode and stays silent in CI.
pub struct SearchProgress {
    bar: Option<ProgressBar>,
    summary: SearchSummary,
}

impl SearchProgress {
    pub fn new(ctx: &UiContext) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {prefix:.bold} {msg:.dim}  {elapsed:.dim}")
            {
                bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            bar.set_prefix("Resolving");
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };

        Self {
            bar,
            summary: SearchSummary::default(),
        }
    }

    /// Consume events on a background task until every sender is dropped
    pub fn spawn(ctx: &UiContext, mut rx: UnboundedReceiver<ProgressEvent>) -> JoinHandle<SearchSummary> {
        let mut progress = Self::new(ctx);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                progress.on_event(&event);
            }
            progress.finish()
        })
    }

    pub fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::DriveStarted { root } => {
                self.summary.drives += 1;
                if let Some(ref bar) = self.bar {
                    bar.set_prefix("Searching");
                    bar.set_message(root.display().to_string());
                }
            }
            ProgressEvent::DriveFinished { .. } => {}
            ProgressEvent::Confirmed { name, path } => {
                self.summary.confirmed += 1;
                if let Some(ref bar) = self.bar {
                    bar.set_message(format!("{} -> {}", name, path.display()));
                }
            }
            ProgressEvent::Skipped(_) => {
                // Listed after the search, once the spinner is gone
                self.summary.skipped += 1;
            }
        }
    }

    /// Clear the spinner and return the totals
    pub fn finish(self) -> SearchSummary {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
        self.summary
    }
}
