//! Integration tests for the persistence layer.
//!
//! These tests require the `migrate` feature and use an in-memory SQLite
//! database.

#![cfg(feature = "migrate")]

use chrono::Utc;
use hubsync::connect_and_migrate;
use hubsync::entity::prelude::*;
use hubsync::extract::{InstallCommand, InstallMethod};
use hubsync::score::QualityScores;
use hubsync::store::{self, ReadmeDocument, ScoredRecord};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

/// Create an in-memory SQLite database with migrations applied.
async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Insert a catalog server row and return its id.
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

fn sample_record() -> ScoredRecord {
    ScoredRecord {
        owner: "acme".to_string(),
        name: "widget".to_string(),
        stars: 1234,
        forks: 340,
        watchers: 120,
        open_issues: 7,
        repo_created_at: Some(Utc::now() - chrono::Duration::days(400)),
        last_updated: Some(Utc::now() - chrono::Duration::days(3)),
        scores: QualityScores {
            documentation: 30,
            maintenance: 25,
            community: 35,
            performance: 50,
        },
        complexity: Complexity::Medium,
        maturity: Maturity::Stable,
        is_official: false,
        installations: vec![InstallCommand {
            method: InstallMethod::Npm,
            command: "npm install widget".to_string(),
        }],
        tech_stack: vec!["TypeScript".to_string(), "Shell".to_string()],
        readme: Some(ReadmeDocument {
            filename: "README.md".to_string(),
            text: "## Installation\nnpm install widget\n## License\nMIT".to_string(),
        }),
    }
}

async fn count_rows(db: &DatabaseConnection, server_id: Uuid) -> (usize, usize, usize) {
    let installations = Installation::find()
        .filter(InstallationColumn::ServerId.eq(server_id))
        .all(db)
        .await
        .expect("query installations")
        .len();
    let tech = TechStack::find()
        .filter(TechStackColumn::ServerId.eq(server_id))
        .all(db)
        .await
        .expect("query tech stack")
        .len();
    let readmes = Readme::find()
        .filter(ReadmeColumn::ServerId.eq(server_id))
        .all(db)
        .await
        .expect("query readmes")
        .len();
    (installations, tech, readmes)
}

#[tokio::test]
async fn find_by_slug_resolves_tracked_servers() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;

    let found = store::find_by_slug(&db, "acme_widget")
        .await
        .expect("lookup")
        .expect("tracked server");
    assert_eq!(found.id, id);

    let missing = store::find_by_slug(&db, "unknown").await.expect("lookup");
    assert!(missing.is_none());
}

#[tokio::test]
async fn apply_writes_metadata_and_attribute_sets() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;
    let record = sample_record();

    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("apply");

    let server = Server::find_by_id(id)
        .one(&db)
        .await
        .expect("query")
        .expect("server row");
    assert_eq!(server.stars, Some(1234));
    assert_eq!(server.quality_score, Some(35));
    assert_eq!(server.quality_community, Some(35));
    assert_eq!(server.complexity, Some(Complexity::Medium));
    assert_eq!(server.maturity, Some(Maturity::Stable));
    assert!(server.synced_at.is_some());

    let (installations, tech, readmes) = count_rows(&db, id).await;
    assert_eq!((installations, tech, readmes), (1, 2, 1));
}

#[tokio::test]
async fn apply_twice_is_idempotent() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;
    let record = sample_record();

    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("first apply");
    let first = count_rows(&db, id).await;

    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("second apply");
    let second = count_rows(&db, id).await;

    assert_eq!(first, second);
    assert_eq!(second, (1, 2, 1));
}

#[tokio::test]
async fn apply_replaces_stale_attribute_sets() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;

    store::apply(&db, id, &sample_record(), Utc::now())
        .await
        .expect("first apply");

    let mut record = sample_record();
    record.installations = vec![InstallCommand {
        method: InstallMethod::Pip,
        command: "pip install widget".to_string(),
    }];
    record.tech_stack = vec!["Python".to_string()];
    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("second apply");

    let installations = Installation::find()
        .filter(InstallationColumn::ServerId.eq(id))
        .all(&db)
        .await
        .expect("query installations");
    assert_eq!(installations.len(), 1);
    assert_eq!(installations[0].method, "pip");

    let tech = TechStack::find()
        .filter(TechStackColumn::ServerId.eq(id))
        .all(&db)
        .await
        .expect("query tech stack");
    assert_eq!(tech.len(), 1);
    assert_eq!(tech[0].technology, "Python");
}

#[tokio::test]
async fn apply_with_empty_sets_clears_previous_rows() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;

    store::apply(&db, id, &sample_record(), Utc::now())
        .await
        .expect("first apply");

    let mut record = sample_record();
    record.installations = Vec::new();
    record.tech_stack = Vec::new();
    record.readme = None;
    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("second apply");

    let (installations, tech, readmes) = count_rows(&db, id).await;
    assert_eq!((installations, tech), (0, 0));
    // The README is upsert-only; absence leaves the last content in place.
    assert_eq!(readmes, 1);
}

#[tokio::test]
async fn apply_dedupes_installations_by_method() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;

    let mut record = sample_record();
    record.installations = vec![
        InstallCommand {
            method: InstallMethod::Npm,
            command: "npm install widget".to_string(),
        },
        InstallCommand {
            method: InstallMethod::Npm,
            command: "npm install widget-extras".to_string(),
        },
        InstallCommand {
            method: InstallMethod::Pip,
            command: "pip install widget".to_string(),
        },
    ];

    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("apply");

    let installations = Installation::find()
        .filter(InstallationColumn::ServerId.eq(id))
        .all(&db)
        .await
        .expect("query installations");
    assert_eq!(installations.len(), 2);

    let npm = installations
        .iter()
        .find(|i| i.method == "npm")
        .expect("npm row");
    // First command per method wins.
    assert_eq!(npm.command, "npm install widget");
}

#[tokio::test]
async fn apply_updates_readme_in_place() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;

    store::apply(&db, id, &sample_record(), Utc::now())
        .await
        .expect("first apply");

    let mut record = sample_record();
    record.readme = Some(ReadmeDocument {
        filename: "README.md".to_string(),
        text: "## New content".to_string(),
    });
    store::apply(&db, id, &record, Utc::now())
        .await
        .expect("second apply");

    let readmes = Readme::find()
        .filter(ReadmeColumn::ServerId.eq(id))
        .all(&db)
        .await
        .expect("query readmes");
    assert_eq!(readmes.len(), 1);
    assert_eq!(readmes[0].content, "## New content");
    assert_eq!(readmes[0].size_bytes, "## New content".len() as i64);
}

#[tokio::test]
async fn failed_step_rolls_back_the_whole_transaction() {
    let db = setup_test_db().await;
    let id = seed_server(&db, "acme_widget", "https://github.com/acme/widget").await;

    store::apply(&db, id, &sample_record(), Utc::now())
        .await
        .expect("baseline apply");

    // Duplicate technologies violate the (server, technology) uniqueness
    // constraint mid-transaction.
    let mut record = sample_record();
    record.stars = 9999;
    record.installations = vec![InstallCommand {
        method: InstallMethod::Docker,
        command: "docker pull acme/widget".to_string(),
    }];
    record.tech_stack = vec!["Rust".to_string(), "Rust".to_string()];

    store::apply(&db, id, &record, Utc::now())
        .await
        .expect_err("constraint violation should fail the transaction");

    // Nothing from the failed call is visible.
    let server = Server::find_by_id(id)
        .one(&db)
        .await
        .expect("query")
        .expect("server row");
    assert_eq!(server.stars, Some(1234));

    let installations = Installation::find()
        .filter(InstallationColumn::ServerId.eq(id))
        .all(&db)
        .await
        .expect("query installations");
    assert_eq!(installations.len(), 1);
    assert_eq!(installations[0].method, "npm");

    let tech = TechStack::find()
        .filter(TechStackColumn::ServerId.eq(id))
        .all(&db)
        .await
        .expect("query tech stack");
    assert_eq!(tech.len(), 2);
}
