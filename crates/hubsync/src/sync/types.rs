//! Shared batch-sync types and constants.

use thiserror::Error;

/// Heartbeat cadence: one progress summary per this many entities.
pub const DEFAULT_PROGRESS_EVERY: usize = 25;

/// How many languages from the histogram become the tech stack.
pub const DEFAULT_TECH_STACK_LIMIT: usize = 5;

/// Logical filename used when the provider envelope does not carry one.
pub const DEFAULT_README_FILENAME: &str = "README.md";

/// Why an entity was skipped rather than updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The catalog entry has no source URL.
    NoSourceUrl,
    /// The source URL could not be parsed into owner/name.
    InvalidUrl,
    /// The entry has no row in the store.
    NotTracked,
    /// Upstream has no such repository.
    NotFound,
    /// The metadata fetch failed after retries.
    FetchFailed,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSourceUrl => "no_url",
            Self::InvalidUrl => "invalid_url",
            Self::NotTracked => "not_tracked",
            Self::NotFound => "not_found",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one entity in a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// The per-entity transaction committed.
    Updated,
    /// Nothing was written; see the reason.
    Skipped(SkipReason),
    /// Fetch/score/persist failed unexpectedly, or the transaction rolled
    /// back.
    Errored(String),
}

/// Running counters for a batch run. Each visited entity lands in exactly
/// one bucket; a fetch failure counts as errored even though its outcome
/// reads as a skip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Entities visited so far.
    pub total: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl BatchStats {
    pub(crate) fn record(&mut self, outcome: &EntityOutcome) {
        self.total += 1;
        match outcome {
            EntityOutcome::Updated => self.updated += 1,
            EntityOutcome::Skipped(SkipReason::FetchFailed) => self.errored += 1,
            EntityOutcome::Skipped(_) => self.skipped += 1,
            EntityOutcome::Errored(_) => self.errored += 1,
        }
    }
}

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Resume token: skip catalog entries before the first one whose slug or
    /// name matches. An unmatched token aborts the run.
    pub resume_from: Option<String>,
    /// Process at most this many entities.
    pub limit: Option<usize>,
    /// Heartbeat cadence.
    pub progress_every: usize,
    /// Tech-stack size.
    pub tech_stack_limit: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            resume_from: None,
            limit: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            tech_stack_limit: DEFAULT_TECH_STACK_LIMIT,
        }
    }
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub stats: BatchStats,
    /// Per-entity outcomes in visit order, keyed by slug.
    pub outcomes: Vec<(String, EntityOutcome)>,
    /// Slug of the last entity whose transaction committed. This is the
    /// resume token for the next run; an in-flight entity that was rolled
    /// back never appears here.
    pub last_committed: Option<String>,
    /// Whether the run stopped early on a cancellation signal.
    pub cancelled: bool,
}

/// Fatal batch-sync errors. Per-entity failures are outcomes, not errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("resume token not found in catalog: {token}")]
    ResumeTokenNotFound { token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_options_default() {
        let options = BatchOptions::default();
        assert_eq!(options.resume_from, None);
        assert_eq!(options.limit, None);
        assert_eq!(options.progress_every, DEFAULT_PROGRESS_EVERY);
        assert_eq!(options.tech_stack_limit, DEFAULT_TECH_STACK_LIMIT);
    }

    #[test]
    fn stats_bucket_each_outcome_once() {
        let mut stats = BatchStats::default();
        stats.record(&EntityOutcome::Updated);
        stats.record(&EntityOutcome::Skipped(SkipReason::NoSourceUrl));
        stats.record(&EntityOutcome::Skipped(SkipReason::FetchFailed));
        stats.record(&EntityOutcome::Errored("boom".to_string()));

        assert_eq!(stats.total, 4);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.skipped, 1);
        // Fetch failures land in the error bucket.
        assert_eq!(stats.errored, 2);
    }
}
