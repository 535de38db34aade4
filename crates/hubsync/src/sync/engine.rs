//! The batch sync engine: fetch → extract → score → persist, one entity at
//! a time, with resume and cancellation support.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::catalog::CatalogEntry;
use crate::extract;
use crate::github::error::short_error_message;
use crate::github::{FetchError, GithubClient};
use crate::score::{self, QualityScores};
use crate::store::{self, ReadmeDocument, ScoredRecord};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{
    BatchOptions, BatchReport, BatchStats, DEFAULT_README_FILENAME, EntityOutcome, SkipReason,
    SyncError,
};

/// Drives the per-entity pipeline over a catalog.
///
/// Entities are processed strictly sequentially; the client's pacing and
/// rate-limit waits are the only suspension points besides the store
/// transactions themselves.
pub struct SyncEngine {
    client: GithubClient,
    db: DatabaseConnection,
}

impl SyncEngine {
    pub fn new(client: GithubClient, db: DatabaseConnection) -> Self {
        Self { client, db }
    }

    /// Walk the catalog and sync every entity in order.
    ///
    /// With a resume token, entities before the first match are not visited
    /// at all; a token that matches nothing aborts the run. The cancel flag
    /// is checked between entities: the in-flight entity finishes (commit or
    /// rollback) before the run stops, so `last_committed` is always a safe
    /// resume point.
    pub async fn run_batch(
        &self,
        catalog: &[CatalogEntry],
        options: &BatchOptions,
        cancel: &AtomicBool,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<BatchReport, SyncError> {
        let start_index = match &options.resume_from {
            Some(token) => {
                resolve_start_index(catalog, token).ok_or_else(|| SyncError::ResumeTokenNotFound {
                    token: token.clone(),
                })?
            }
            None => 0,
        };

        let window: Vec<&CatalogEntry> = catalog[start_index..]
            .iter()
            .take(options.limit.unwrap_or(usize::MAX))
            .collect();

        emit(
            on_progress,
            SyncProgress::Started {
                total: window.len(),
                starting_at: start_index,
            },
        );

        let started = Instant::now();
        let mut stats = BatchStats::default();
        let mut outcomes = Vec::with_capacity(window.len());
        let mut last_committed = None;
        let mut cancelled = false;

        for (i, entry) in window.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }

            let slug = entry.slug();
            let position = start_index + i + 1;
            let total = catalog.len();

            let outcome = self.sync_entry(entry, options, Utc::now()).await;
            stats.record(&outcome);

            match &outcome {
                EntityOutcome::Updated => {
                    tracing::info!(slug = %slug, "updated");
                    last_committed = Some(slug.clone());
                    emit(
                        on_progress,
                        SyncProgress::EntityUpdated {
                            slug: slug.clone(),
                            position,
                            total,
                        },
                    );
                }
                EntityOutcome::Skipped(reason) => {
                    tracing::info!(slug = %slug, reason = %reason, "skipped");
                    emit(
                        on_progress,
                        SyncProgress::EntitySkipped {
                            slug: slug.clone(),
                            position,
                            total,
                            reason: *reason,
                        },
                    );
                }
                EntityOutcome::Errored(error) => {
                    tracing::warn!(slug = %slug, error = %error, "errored");
                    emit(
                        on_progress,
                        SyncProgress::EntityErrored {
                            slug: slug.clone(),
                            position,
                            total,
                            error: error.clone(),
                        },
                    );
                }
            }

            outcomes.push((slug, outcome));

            let done = i + 1;
            if options.progress_every > 0 && done % options.progress_every == 0 {
                let remaining = window.len() - done;
                let elapsed = started.elapsed();
                let eta_secs = (done > 0)
                    .then(|| elapsed.as_secs_f64() / done as f64 * remaining as f64)
                    .map(|s| s as u64);
                emit(
                    on_progress,
                    SyncProgress::Heartbeat {
                        done,
                        remaining,
                        elapsed_secs: elapsed.as_secs(),
                        eta_secs,
                        stats,
                    },
                );
            }
        }

        emit(
            on_progress,
            SyncProgress::Finished {
                stats,
                last_committed: last_committed.clone(),
                cancelled,
            },
        );

        Ok(BatchReport {
            stats,
            outcomes,
            last_committed,
            cancelled,
        })
    }

    /// Run the full pipeline for one catalog entry.
    ///
    /// Entries without a source URL are skipped before any store or network
    /// access.
    pub async fn sync_entry(
        &self,
        entry: &CatalogEntry,
        options: &BatchOptions,
        now: DateTime<Utc>,
    ) -> EntityOutcome {
        let Some(source_url) = entry.source_url() else {
            return EntityOutcome::Skipped(SkipReason::NoSourceUrl);
        };

        let slug = entry.slug();
        let server = match store::find_by_slug(&self.db, &slug).await {
            Ok(Some(server)) => server,
            Ok(None) => return EntityOutcome::Skipped(SkipReason::NotTracked),
            Err(e) => return EntityOutcome::Errored(short_error_message(&e)),
        };

        let Ok(repo_ref) = extract::parse_source_url(source_url) else {
            return EntityOutcome::Skipped(SkipReason::InvalidUrl);
        };

        let record = match self
            .build_record(&repo_ref.owner, &repo_ref.name, options.tech_stack_limit, now)
            .await
        {
            Ok(record) => record,
            Err(FetchError::NotFound) => return EntityOutcome::Skipped(SkipReason::NotFound),
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "fetch failed");
                return EntityOutcome::Skipped(SkipReason::FetchFailed);
            }
        };

        match store::apply(&self.db, server.id, &record, now).await {
            Ok(()) => EntityOutcome::Updated,
            Err(e) => EntityOutcome::Errored(short_error_message(&e)),
        }
    }

    /// Fetch and derive everything the store needs for one repository.
    ///
    /// Also serves the single-entity driver, which prints the record instead
    /// of persisting it.
    pub async fn build_record(
        &self,
        owner: &str,
        name: &str,
        tech_stack_limit: usize,
        now: DateTime<Utc>,
    ) -> Result<ScoredRecord, FetchError> {
        let repo = self.client.get_repo(owner, name).await?;
        let readme_envelope = self.client.get_readme(owner, name).await?;
        let languages = self.client.get_languages(owner, name).await?;

        let readme_text = readme_envelope.as_ref().and_then(extract::decode_readme);
        let scores = QualityScores::compute(&repo, readme_text.as_deref(), now);

        let installations = readme_text
            .as_deref()
            .map(extract::extract_install_commands)
            .unwrap_or_default();

        let readme = readme_text.map(|text| ReadmeDocument {
            filename: readme_envelope
                .as_ref()
                .map(|env| env.name.as_str())
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_README_FILENAME)
                .to_string(),
            text,
        });

        let canonical_name = if repo.name.is_empty() { name } else { &repo.name };

        Ok(ScoredRecord {
            owner: owner.to_string(),
            name: canonical_name.to_string(),
            stars: clamp_i32(repo.stargazers_count),
            forks: clamp_i32(repo.forks_count),
            watchers: clamp_i32(repo.watchers_count),
            open_issues: clamp_i32(repo.open_issues_count),
            repo_created_at: repo.created_at,
            last_updated: repo.updated_at,
            scores,
            complexity: score::complexity(languages.len(), repo.size),
            maturity: score::maturity(repo.created_at, repo.stargazers_count, now),
            is_official: score::is_official(
                owner,
                &repo.owner.owner_type,
                repo.stargazers_count,
                canonical_name,
            ),
            installations,
            tech_stack: extract::top_languages(&languages, tech_stack_limit),
            readme,
        })
    }

    /// The connection this engine writes through.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The client this engine fetches through.
    pub fn client(&self) -> &GithubClient {
        &self.client
    }
}

/// Position of the first catalog entry whose slug or name matches the
/// resume token.
fn resolve_start_index(catalog: &[CatalogEntry], token: &str) -> Option<usize> {
    catalog
        .iter()
        .position(|entry| entry.slug() == token || entry.name == token)
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            github_url: Some(format!("https://github.com/{name}")),
        }
    }

    #[test]
    fn resume_token_matches_slug_or_name() {
        let catalog = vec![entry("acme/one"), entry("acme/two"), entry("acme/three")];

        assert_eq!(resolve_start_index(&catalog, "acme_two"), Some(1));
        assert_eq!(resolve_start_index(&catalog, "acme/three"), Some(2));
        assert_eq!(resolve_start_index(&catalog, "missing"), None);
    }

    #[test]
    fn clamp_i32_saturates() {
        assert_eq!(clamp_i32(42), 42);
        assert_eq!(clamp_i32(i64::MAX), i32::MAX);
        assert_eq!(clamp_i32(i64::MIN), i32::MIN);
    }
}
