use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use chrono::Utc;
use hubsync::catalog::CatalogEntry;
use hubsync::extract;
use hubsync::http::ReqwestTransport;
use hubsync::store::{self, ScoredRecord};
use hubsync::sync::{BatchOptions, EntityOutcome};
use hubsync::{GithubClient, SyncEngine, connect_and_migrate, load_catalog};

use crate::commands::limits::OutputFormat;
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an engine wired to the real GitHub API and the configured database.
async fn build_engine(
    token: Option<String>,
    config: &Config,
    database_url: &str,
) -> Result<SyncEngine, Box<dyn std::error::Error>> {
    let db = connect_and_migrate(database_url).await?;
    let transport = Arc::new(ReqwestTransport::with_timeout(HTTP_TIMEOUT)?);
    let client = GithubClient::new(transport, config.github_config(token));
    Ok(SyncEngine::new(client, db))
}

fn batch_options(config: &Config) -> BatchOptions {
    BatchOptions {
        progress_every: config.sync.progress_every,
        tech_stack_limit: config.sync.tech_stack_limit,
        ..BatchOptions::default()
    }
}

/// Handle the `sync` command: walk a catalog file and update every entity.
pub(crate) async fn handle_sync(
    catalog_path: &Path,
    resume: Option<String>,
    limit: Option<usize>,
    token: Option<String>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(catalog_path)?;
    println!("Loaded {} catalog entries", catalog.len());

    let engine = build_engine(token, config, database_url).await?;
    let options = BatchOptions {
        resume_from: resume,
        limit,
        ..batch_options(config)
    };

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let report = engine
        .run_batch(&catalog, &options, shutdown::shutdown_flag(), Some(&callback))
        .await?;
    reporter.finish();

    println!(
        "Processed {} entities: {} updated, {} skipped, {} errors",
        report.stats.total, report.stats.updated, report.stats.skipped, report.stats.errored
    );

    if report.cancelled {
        match &report.last_committed {
            Some(slug) => println!(
                "Interrupted. Resume with: hubsync sync {} --resume {slug}",
                catalog_path.display()
            ),
            None => println!("Interrupted before any entity was committed."),
        }
    }

    Ok(())
}

/// Handle the `sync-one` command: run the full pipeline for a single tracked
/// entity. With `--dry-run`, the derived record is printed instead of
/// persisted.
pub(crate) async fn handle_sync_one(
    slug: &str,
    dry_run: bool,
    output: OutputFormat,
    token: Option<String>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(token, config, database_url).await?;

    let server = store::find_by_slug(engine.db(), slug)
        .await?
        .ok_or_else(|| format!("'{slug}' is not tracked in the database"))?;
    let source_url = server
        .source_url
        .clone()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| format!("'{slug}' has no source URL"))?;

    if dry_run {
        let repo_ref = extract::parse_source_url(&source_url)?;
        let record = engine
            .build_record(
                &repo_ref.owner,
                &repo_ref.name,
                config.sync.tech_stack_limit,
                Utc::now(),
            )
            .await?;

        match output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&record_json(&record))?);
            }
            OutputFormat::Table => print_record_table(&record),
        }
        println!("Dry run: nothing was persisted.");
        return Ok(());
    }

    // The batch pipeline over a one-entry catalog keeps skip/error semantics
    // identical to a full run.
    let entry = CatalogEntry {
        name: slug.to_string(),
        github_url: Some(source_url),
    };
    let report = engine
        .run_batch(
            std::slice::from_ref(&entry),
            &batch_options(config),
            &AtomicBool::new(false),
            None,
        )
        .await?;

    match report.outcomes.first() {
        Some((_, EntityOutcome::Updated)) => println!("Updated {slug}."),
        Some((_, EntityOutcome::Skipped(reason))) => println!("Skipped {slug}: {reason}"),
        Some((_, EntityOutcome::Errored(error))) => {
            return Err(format!("Failed to sync {slug}: {error}").into());
        }
        None => println!("Nothing to do."),
    }

    Ok(())
}

fn record_json(record: &ScoredRecord) -> serde_json::Value {
    serde_json::json!({
        "owner": record.owner,
        "name": record.name,
        "stars": record.stars,
        "forks": record.forks,
        "watchers": record.watchers,
        "open_issues": record.open_issues,
        "repo_created_at": record.repo_created_at,
        "last_updated": record.last_updated,
        "quality": {
            "documentation": record.scores.documentation,
            "maintenance": record.scores.maintenance,
            "community": record.scores.community,
            "performance": record.scores.performance,
            "aggregate": record.scores.aggregate(),
        },
        "complexity": record.complexity.to_string(),
        "maturity": record.maturity.to_string(),
        "is_official": record.is_official,
        "installations": record
            .installations
            .iter()
            .map(|i| serde_json::json!({"method": i.method.as_str(), "command": i.command}))
            .collect::<Vec<_>>(),
        "tech_stack": record.tech_stack,
        "readme": record.readme.as_ref().map(|r| serde_json::json!({
            "filename": r.filename,
            "size_bytes": r.size_bytes(),
            "content_hash": r.content_hash(),
        })),
    })
}

/// One field/value row in the table rendering of a record.
#[derive(tabled::Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_record_table(record: &ScoredRecord) {
    let row = |field, value| FieldRow { field, value };
    let commands = record
        .installations
        .iter()
        .map(|i| i.command.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    let rows = vec![
        row("Repository", format!("{}/{}", record.owner, record.name)),
        row("Stars", record.stars.to_string()),
        row("Forks", record.forks.to_string()),
        row("Open issues", record.open_issues.to_string()),
        row(
            "Quality (docs/maint/comm/perf)",
            format!(
                "{}/{}/{}/{}",
                record.scores.documentation,
                record.scores.maintenance,
                record.scores.community,
                record.scores.performance
            ),
        ),
        row("Quality aggregate", record.scores.aggregate().to_string()),
        row("Complexity", record.complexity.to_string()),
        row("Maturity", record.maturity.to_string()),
        row("Official", record.is_official.to_string()),
        row("Install commands", commands),
        row("Tech stack", record.tech_stack.join(", ")),
        row(
            "README",
            record
                .readme
                .as_ref()
                .map(|r| format!("{} ({} bytes)", r.filename, r.size_bytes()))
                .unwrap_or_else(|| "none".to_string()),
        ),
    ];

    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{table}");
}
