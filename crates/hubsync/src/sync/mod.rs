//! Batch synchronization: the engine, its option/outcome types, and
//! progress reporting.

mod engine;
mod progress;
mod types;

pub use engine::SyncEngine;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use types::{
    BatchOptions, BatchReport, BatchStats, DEFAULT_PROGRESS_EVERY, DEFAULT_README_FILENAME,
    DEFAULT_TECH_STACK_LIMIT, EntityOutcome, SkipReason, SyncError,
};
