//! Transactional application of a scored record to the store.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::prelude::*;
use crate::entity::server;

use super::errors::Result;
use super::record::ScoredRecord;

/// Look up a server row by its stable catalog key.
pub async fn find_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<server::Model>> {
    let found = Server::find()
        .filter(ServerColumn::Slug.eq(slug))
        .one(db)
        .await?;
    Ok(found)
}

/// Apply a scored record to the store as one transaction.
///
/// Four steps run atomically: the metadata/score update, delete-then-insert
/// replacement of the installation set, the same for the tech-stack set, and
/// the README upsert. Any step failing rolls back all four. Re-applying the
/// same record is a no-op in effect - attribute sets are replaced, not
/// appended, and the README upsert is keyed by (server, filename).
pub async fn apply(
    db: &DatabaseConnection,
    server_id: Uuid,
    record: &ScoredRecord,
    now: DateTime<Utc>,
) -> Result<()> {
    let record = record.clone();

    db.transaction::<_, (), DbErr>(move |txn| {
        Box::pin(async move {
            update_metadata(txn, server_id, &record, now).await?;
            replace_installations(txn, server_id, &record).await?;
            replace_tech_stack(txn, server_id, &record).await?;
            if let Some(readme) = &record.readme {
                upsert_readme(txn, server_id, readme, now).await?;
            }
            Ok(())
        })
    })
    .await?;

    Ok(())
}

async fn update_metadata<C: ConnectionTrait>(
    db: &C,
    server_id: Uuid,
    record: &ScoredRecord,
    now: DateTime<Utc>,
) -> std::result::Result<(), DbErr> {
    let model = ServerActiveModel {
        id: Set(server_id),
        owner: Set(Some(record.owner.clone())),
        name: Set(Some(record.name.clone())),
        stars: Set(Some(record.stars)),
        forks: Set(Some(record.forks)),
        watchers: Set(Some(record.watchers)),
        open_issues: Set(Some(record.open_issues)),
        repo_created_at: Set(record.repo_created_at.map(|t| t.fixed_offset())),
        last_updated: Set(record.last_updated.map(|t| t.fixed_offset())),
        quality_score: Set(Some(record.scores.aggregate())),
        quality_documentation: Set(Some(record.scores.documentation)),
        quality_maintenance: Set(Some(record.scores.maintenance)),
        quality_community: Set(Some(record.scores.community)),
        quality_performance: Set(Some(record.scores.performance)),
        complexity: Set(Some(record.complexity)),
        maturity: Set(Some(record.maturity)),
        is_official: Set(record.is_official),
        updated_at: Set(now.fixed_offset()),
        synced_at: Set(Some(now.fixed_offset())),
        ..Default::default()
    };

    model.update(db).await?;
    Ok(())
}

/// Full replacement of the installation-method set.
///
/// Delete-then-insert, so methods from a previous README version that no
/// longer match disappear. Input is deduplicated by method (first command
/// wins) to satisfy the (server, method) uniqueness constraint.
async fn replace_installations<C: ConnectionTrait>(
    db: &C,
    server_id: Uuid,
    record: &ScoredRecord,
) -> std::result::Result<(), DbErr> {
    Installation::delete_many()
        .filter(InstallationColumn::ServerId.eq(server_id))
        .exec(db)
        .await?;

    let mut seen: Vec<&str> = Vec::new();
    let models: Vec<InstallationActiveModel> = record
        .installations
        .iter()
        .filter(|install| {
            let method = install.method.as_str();
            if seen.contains(&method) {
                false
            } else {
                seen.push(method);
                true
            }
        })
        .map(|install| InstallationActiveModel {
            server_id: Set(server_id),
            method: Set(install.method.as_str().to_string()),
            command: Set(install.command.clone()),
            ..Default::default()
        })
        .collect();

    if !models.is_empty() {
        Installation::insert_many(models)
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}

/// Full replacement of the tech-stack set, same delete-then-insert semantics.
async fn replace_tech_stack<C: ConnectionTrait>(
    db: &C,
    server_id: Uuid,
    record: &ScoredRecord,
) -> std::result::Result<(), DbErr> {
    TechStack::delete_many()
        .filter(TechStackColumn::ServerId.eq(server_id))
        .exec(db)
        .await?;

    let models: Vec<TechStackActiveModel> = record
        .tech_stack
        .iter()
        .map(|technology| TechStackActiveModel {
            server_id: Set(server_id),
            technology: Set(technology.clone()),
            ..Default::default()
        })
        .collect();

    if !models.is_empty() {
        TechStack::insert_many(models)
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}

/// Upsert the README row keyed by (server, filename). Latest content wins.
async fn upsert_readme<C: ConnectionTrait>(
    db: &C,
    server_id: Uuid,
    readme: &super::record::ReadmeDocument,
    now: DateTime<Utc>,
) -> std::result::Result<(), DbErr> {
    let model = ReadmeActiveModel {
        server_id: Set(server_id),
        filename: Set(readme.filename.clone()),
        content: Set(readme.text.clone()),
        content_hash: Set(readme.content_hash()),
        size_bytes: Set(readme.size_bytes()),
        updated_at: Set(now.fixed_offset()),
        ..Default::default()
    };

    Readme::insert(model)
        .on_conflict(
            OnConflict::columns([ReadmeColumn::ServerId, ReadmeColumn::Filename])
                .update_columns([
                    ReadmeColumn::Content,
                    ReadmeColumn::ContentHash,
                    ReadmeColumn::SizeBytes,
                    ReadmeColumn::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}
