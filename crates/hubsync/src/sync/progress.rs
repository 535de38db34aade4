//! Progress reporting for batch sync runs.

use super::types::{BatchStats, SkipReason};

/// Progress events emitted during a batch run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// The run is starting.
    Started {
        /// Entities that will be visited (after resume/limit windowing).
        total: usize,
        /// Position in the full catalog of the first visited entity
        /// (0-based; non-zero when resuming).
        starting_at: usize,
    },

    /// An entity's transaction committed.
    EntityUpdated {
        slug: String,
        /// 1-based position in the full catalog.
        position: usize,
        total: usize,
    },

    /// An entity was skipped.
    EntitySkipped {
        slug: String,
        position: usize,
        total: usize,
        reason: SkipReason,
    },

    /// An entity failed.
    EntityErrored {
        slug: String,
        position: usize,
        total: usize,
        /// Short cause, suitable for a single log line.
        error: String,
    },

    /// Periodic summary with a simple linear time estimate.
    Heartbeat {
        done: usize,
        remaining: usize,
        elapsed_secs: u64,
        /// `elapsed / done * remaining`, if any work has finished.
        eta_secs: Option<u64>,
        stats: BatchStats,
    },

    /// The run finished (or was cancelled).
    Finished {
        stats: BatchStats,
        /// Resume token for the next run.
        last_committed: Option<String>,
        cancelled: bool,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
