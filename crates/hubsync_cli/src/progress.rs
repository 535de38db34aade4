//! Progress reporting for batch sync runs.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): Animated progress bar using indicatif
//! - Logging mode (non-TTY): Structured logging using tracing
//!
//! Per-entity outcomes are already logged by the library, so the logging
//! reporter only emits run-level milestones.

use std::sync::{Arc, Mutex};

use console::Term;
use hubsync::sync::{ProgressCallback, SyncProgress};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter that handles both interactive and logging modes.
pub(crate) enum ProgressReporter {
    /// Interactive progress bar for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub(crate) fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter)
        }
    }

    /// Handle a progress event.
    pub(crate) fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub(crate) fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish the progress bar (interactive mode only).
    pub(crate) fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

/// Interactive progress reporter using indicatif.
///
/// A single bar tracks the batch window; the message column carries the
/// entity most recently processed and its outcome.
pub(crate) struct InteractiveReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl InteractiveReporter {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn handle(&self, event: SyncProgress) {
        let mut bar = match self.bar.lock() {
            Ok(bar) => bar,
            Err(poisoned) => poisoned.into_inner(),
        };

        match event {
            SyncProgress::Started { total, .. } => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓░"),
                );
                *bar = Some(pb);
            }
            SyncProgress::EntityUpdated { slug, .. } => {
                if let Some(pb) = bar.as_ref() {
                    pb.set_message(format!("updated {slug}"));
                    pb.inc(1);
                }
            }
            SyncProgress::EntitySkipped { slug, reason, .. } => {
                if let Some(pb) = bar.as_ref() {
                    pb.set_message(format!("skipped {slug} ({reason})"));
                    pb.inc(1);
                }
            }
            SyncProgress::EntityErrored { slug, .. } => {
                if let Some(pb) = bar.as_ref() {
                    pb.set_message(format!("error on {slug}"));
                    pb.inc(1);
                }
            }
            // The bar's own ETA column covers the heartbeat.
            SyncProgress::Heartbeat { .. } => {}
            SyncProgress::Finished {
                stats, cancelled, ..
            } => {
                if let Some(pb) = bar.as_ref() {
                    let verb = if cancelled { "interrupted" } else { "done" };
                    pb.finish_with_message(format!(
                        "{verb}: {} updated, {} skipped, {} errors",
                        stats.updated, stats.skipped, stats.errored
                    ));
                }
            }
            _ => {}
        }
    }

    fn finish(&self) {
        let bar = match self.bar.lock() {
            Ok(bar) => bar,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pb) = bar.as_ref() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }
}

/// Logging progress reporter for non-TTY environments.
pub(crate) struct LoggingReporter;

impl LoggingReporter {
    fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::Started { total, starting_at } => {
                tracing::info!(total, starting_at, "batch started");
            }
            SyncProgress::Heartbeat {
                done,
                remaining,
                elapsed_secs,
                eta_secs,
                stats,
            } => {
                tracing::info!(
                    done,
                    remaining,
                    elapsed_secs,
                    eta_secs,
                    updated = stats.updated,
                    skipped = stats.skipped,
                    errored = stats.errored,
                    "progress"
                );
            }
            SyncProgress::Finished {
                stats,
                last_committed,
                cancelled,
            } => {
                tracing::info!(
                    updated = stats.updated,
                    skipped = stats.skipped,
                    errored = stats.errored,
                    last_committed = last_committed.as_deref(),
                    cancelled,
                    "batch finished"
                );
            }
            // Per-entity outcomes are logged by the engine itself.
            _ => {}
        }
    }
}
