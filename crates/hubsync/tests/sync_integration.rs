//! End-to-end batch sync tests against a scripted transport and an
//! in-memory SQLite database.

#![cfg(feature = "migrate")]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hubsync::catalog::CatalogEntry;
use hubsync::entity::prelude::*;
use hubsync::http::mock::{MockTransport, json_response};
use hubsync::sync::{BatchOptions, EntityOutcome, SkipReason, SyncEngine, SyncError};
use hubsync::{GithubClient, GithubConfig, connect_and_migrate};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

async fn seed_server(db: &DatabaseConnection, slug: &str, source_url: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now().fixed_offset();
    ServerActiveModel {
        id: Set(id),
        slug: Set(slug.to_string()),
        source_url: Set(Some(source_url.to_string())),
        is_official: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed server");
    id
}

fn engine_with_mock(db: DatabaseConnection, mock: Arc<MockTransport>) -> SyncEngine {
    let client = GithubClient::new(
        mock,
        GithubConfig {
            token: None,
            api_base: "https://api.example.com".to_string(),
            base_delay: std::time::Duration::ZERO,
            ..GithubConfig::default()
        },
    );
    SyncEngine::new(client, db)
}

fn entry(name: &str, url: Option<&str>) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        github_url: url.map(str::to_string),
    }
}

fn readme_envelope(text: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "README.md",
        "content": BASE64.encode(text),
        "encoding": "base64",
    })
}

/// Script the three resource fetches for one repository.
fn script_repo(mock: &MockTransport, owner: &str, name: &str, stars: i64, readme: &str) {
    mock.push(
        &format!("/repos/{owner}/{name}/readme"),
        json_response(200, &readme_envelope(readme), Some(4000), None),
    );
    mock.push(
        &format!("/repos/{owner}/{name}/languages"),
        json_response(
            200,
            &serde_json::json!({"TypeScript": 900, "Shell": 100}),
            Some(4000),
            None,
        ),
    );
    mock.push(
        &format!("/repos/{owner}/{name}"),
        json_response(
            200,
            &serde_json::json!({
                "name": name,
                "stargazers_count": stars,
                "forks_count": 40,
                "watchers_count": 12,
                "open_issues_count": 3,
                "size": 2000,
                "created_at": "2022-01-01T00:00:00Z",
                "updated_at": "2025-08-20T00:00:00Z",
                "owner": {"login": owner, "type": "User"},
            }),
            Some(4000),
            None,
        ),
    );
}

#[tokio::test]
async fn batch_classifies_every_outcome() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    seed_server(&db, "acme_alpha", "https://github.com/acme/alpha").await;
    seed_server(&db, "acme_delta", "not a url").await;
    seed_server(&db, "acme_omega", "https://github.com/acme/omega").await;

    script_repo(&mock, "acme", "alpha", 500, "## Install\nnpm install alpha-cli\nMIT license");
    mock.push(
        "/repos/acme/omega",
        json_response(404, &serde_json::json!({}), Some(4000), None),
    );

    let catalog = vec![
        entry("acme/alpha", Some("https://github.com/acme/alpha")),
        entry("acme/beta", None),
        entry("acme/gamma", Some("https://github.com/acme/gamma")),
        entry("acme/delta", Some("not a url")),
        entry("acme/omega", Some("https://github.com/acme/omega")),
    ];

    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(
            &catalog,
            &BatchOptions::default(),
            &AtomicBool::new(false),
            None,
        )
        .await
        .expect("batch run");

    let outcome = |slug: &str| {
        report
            .outcomes
            .iter()
            .find(|(s, _)| s == slug)
            .map(|(_, o)| o.clone())
            .expect("outcome present")
    };

    assert_eq!(outcome("acme_alpha"), EntityOutcome::Updated);
    assert_eq!(
        outcome("acme_beta"),
        EntityOutcome::Skipped(SkipReason::NoSourceUrl)
    );
    assert_eq!(
        outcome("acme_gamma"),
        EntityOutcome::Skipped(SkipReason::NotTracked)
    );
    assert_eq!(
        outcome("acme_delta"),
        EntityOutcome::Skipped(SkipReason::InvalidUrl)
    );
    assert_eq!(
        outcome("acme_omega"),
        EntityOutcome::Skipped(SkipReason::NotFound)
    );

    assert_eq!(report.stats.total, 5);
    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.skipped, 4);
    assert_eq!(report.stats.errored, 0);
    assert_eq!(report.last_committed.as_deref(), Some("acme_alpha"));
    assert!(!report.cancelled);
}

#[tokio::test]
async fn updated_entity_persists_derived_data() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    let id = seed_server(&db, "acme_alpha", "https://github.com/acme/alpha").await;
    script_repo(
        &mock,
        "acme",
        "alpha",
        1234,
        "## Installation\nnpm install alpha-cli\n## License\nMIT",
    );

    let catalog = vec![entry("acme/alpha", Some("https://github.com/acme/alpha"))];
    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(
            &catalog,
            &BatchOptions::default(),
            &AtomicBool::new(false),
            None,
        )
        .await
        .expect("batch run");
    assert_eq!(report.stats.updated, 1);

    let server = Server::find_by_id(id)
        .one(engine.db())
        .await
        .expect("query")
        .expect("server row");
    assert_eq!(server.stars, Some(1234));
    assert_eq!(server.owner.as_deref(), Some("acme"));
    assert_eq!(server.name.as_deref(), Some("alpha"));
    // stars 1234 -> 20, forks 40 -> 8
    assert_eq!(server.quality_community, Some(28));
    assert_eq!(server.quality_documentation, Some(30));
    assert_eq!(server.maturity, Some(Maturity::Stable));

    let installations = Installation::find()
        .filter(InstallationColumn::ServerId.eq(id))
        .all(engine.db())
        .await
        .expect("query installations");
    assert_eq!(installations.len(), 1);
    assert_eq!(installations[0].command, "npm install alpha-cli");

    let tech: Vec<String> = TechStack::find()
        .filter(TechStackColumn::ServerId.eq(id))
        .all(engine.db())
        .await
        .expect("query tech stack")
        .into_iter()
        .map(|t| t.technology)
        .collect();
    assert_eq!(tech, vec!["TypeScript".to_string(), "Shell".to_string()]);

    let readmes = Readme::find()
        .filter(ReadmeColumn::ServerId.eq(id))
        .all(engine.db())
        .await
        .expect("query readmes");
    assert_eq!(readmes.len(), 1);
    assert!(readmes[0].content.contains("npm install alpha-cli"));
}

#[tokio::test]
async fn entity_without_url_makes_no_network_calls() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    let catalog = vec![entry("acme/bare", None)];
    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(
            &catalog,
            &BatchOptions::default(),
            &AtomicBool::new(false),
            None,
        )
        .await
        .expect("batch run");

    assert_eq!(
        report.outcomes[0].1,
        EntityOutcome::Skipped(SkipReason::NoSourceUrl)
    );
    assert!(mock.requested().is_empty());
}

#[tokio::test]
async fn resume_visits_exactly_the_tail_of_the_catalog() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    let catalog: Vec<CatalogEntry> = (1..=5)
        .map(|i| entry(&format!("acme/repo-{i}"), None))
        .collect();

    let options = BatchOptions {
        resume_from: Some("acme_repo-3".to_string()),
        ..BatchOptions::default()
    };

    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(&catalog, &options, &AtomicBool::new(false), None)
        .await
        .expect("batch run");

    let visited: Vec<&str> = report.outcomes.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(visited, vec!["acme_repo-3", "acme_repo-4", "acme_repo-5"]);
}

#[tokio::test]
async fn unknown_resume_token_is_fatal() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    let catalog = vec![entry("acme/alpha", None)];
    let options = BatchOptions {
        resume_from: Some("missing".to_string()),
        ..BatchOptions::default()
    };

    let engine = engine_with_mock(db, Arc::clone(&mock));
    let err = engine
        .run_batch(&catalog, &options, &AtomicBool::new(false), None)
        .await
        .expect_err("unknown token");
    assert!(matches!(err, SyncError::ResumeTokenNotFound { .. }));
}

#[tokio::test]
async fn limit_bounds_the_window() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    let catalog: Vec<CatalogEntry> = (1..=5)
        .map(|i| entry(&format!("acme/repo-{i}"), None))
        .collect();

    let options = BatchOptions {
        limit: Some(2),
        ..BatchOptions::default()
    };

    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(&catalog, &options, &AtomicBool::new(false), None)
        .await
        .expect("batch run");

    assert_eq!(report.outcomes.len(), 2);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_entity() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    let catalog: Vec<CatalogEntry> = (1..=3)
        .map(|i| entry(&format!("acme/repo-{i}"), None))
        .collect();

    let cancel = AtomicBool::new(true);
    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(&catalog, &BatchOptions::default(), &cancel, None)
        .await
        .expect("batch run");

    assert!(report.cancelled);
    assert!(report.outcomes.is_empty());
    assert_eq!(report.last_committed, None);
}

#[tokio::test]
async fn fetch_failure_is_counted_as_error() {
    let db = setup_test_db().await;
    let mock = Arc::new(MockTransport::new());

    seed_server(&db, "acme_flaky", "https://github.com/acme/flaky").await;
    // Exhaust the transient retry budget.
    for _ in 0..3 {
        mock.push(
            "/repos/acme/flaky",
            json_response(500, &serde_json::json!({}), Some(4000), None),
        );
    }

    let catalog = vec![entry("acme/flaky", Some("https://github.com/acme/flaky"))];
    let engine = engine_with_mock(db, Arc::clone(&mock));
    let report = engine
        .run_batch(
            &catalog,
            &BatchOptions::default(),
            &AtomicBool::new(false),
            None,
        )
        .await
        .expect("batch run");

    assert_eq!(
        report.outcomes[0].1,
        EntityOutcome::Skipped(SkipReason::FetchFailed)
    );
    assert_eq!(report.stats.errored, 1);
    assert_eq!(report.stats.skipped, 0);
    assert_eq!(report.last_committed, None);
}
