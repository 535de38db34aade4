//! Initial migration to create the hubsync database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_servers(manager).await?;
        self.create_installations(manager).await?;
        self.create_tech_stack(manager).await?;
        self.create_readmes(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerReadmes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServerTechStack::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServerInstallations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Servers::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_servers(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Servers::Table)
                    .if_not_exists()
                    // Internal
                    .col(ColumnDef::new(Servers::Id).uuid().not_null().primary_key())
                    // Catalog identity
                    .col(ColumnDef::new(Servers::Slug).string().not_null())
                    .col(ColumnDef::new(Servers::SourceUrl).text().null())
                    .col(ColumnDef::new(Servers::Owner).string().null())
                    .col(ColumnDef::new(Servers::Name).string().null())
                    // Statistics
                    .col(ColumnDef::new(Servers::Stars).integer().null())
                    .col(ColumnDef::new(Servers::Forks).integer().null())
                    .col(ColumnDef::new(Servers::Watchers).integer().null())
                    .col(ColumnDef::new(Servers::OpenIssues).integer().null())
                    // Upstream timestamps
                    .col(
                        ColumnDef::new(Servers::RepoCreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Servers::LastUpdated)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Quality
                    .col(ColumnDef::new(Servers::QualityScore).integer().null())
                    .col(
                        ColumnDef::new(Servers::QualityDocumentation)
                            .integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Servers::QualityMaintenance).integer().null())
                    .col(ColumnDef::new(Servers::QualityCommunity).integer().null())
                    .col(ColumnDef::new(Servers::QualityPerformance).integer().null())
                    .col(ColumnDef::new(Servers::Complexity).string().null())
                    .col(ColumnDef::new(Servers::Maturity).string().null())
                    .col(
                        ColumnDef::new(Servers::IsOfficial)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(Servers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Servers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Servers::SyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint on slug, the stable catalog key
        manager
            .create_index(
                Index::create()
                    .name("idx_servers_slug")
                    .table(Servers::Table)
                    .col(Servers::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on stars (descending) for ranked listings
        manager
            .create_index(
                Index::create()
                    .name("idx_servers_stars")
                    .table(Servers::Table)
                    .col((Servers::Stars, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // Index on synced_at
        manager
            .create_index(
                Index::create()
                    .name("idx_servers_synced")
                    .table(Servers::Table)
                    .col(Servers::SyncedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_installations(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerInstallations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerInstallations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServerInstallations::ServerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerInstallations::Method)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerInstallations::Command)
                            .text()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_installations_server")
                            .from(ServerInstallations::Table, ServerInstallations::ServerId)
                            .to(Servers::Table, Servers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (server_id, method)
        manager
            .create_index(
                Index::create()
                    .name("idx_server_installations_server_method")
                    .table(ServerInstallations::Table)
                    .col(ServerInstallations::ServerId)
                    .col(ServerInstallations::Method)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_tech_stack(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerTechStack::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerTechStack::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServerTechStack::ServerId).uuid().not_null())
                    .col(
                        ColumnDef::new(ServerTechStack::Technology)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_tech_stack_server")
                            .from(ServerTechStack::Table, ServerTechStack::ServerId)
                            .to(Servers::Table, Servers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (server_id, technology)
        manager
            .create_index(
                Index::create()
                    .name("idx_server_tech_stack_server_technology")
                    .table(ServerTechStack::Table)
                    .col(ServerTechStack::ServerId)
                    .col(ServerTechStack::Technology)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_readmes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerReadmes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerReadmes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServerReadmes::ServerId).uuid().not_null())
                    .col(ColumnDef::new(ServerReadmes::Filename).string().not_null())
                    .col(ColumnDef::new(ServerReadmes::Content).text().not_null())
                    .col(
                        ColumnDef::new(ServerReadmes::ContentHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerReadmes::SizeBytes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerReadmes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_readmes_server")
                            .from(ServerReadmes::Table, ServerReadmes::ServerId)
                            .to(Servers::Table, Servers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (server_id, filename), the upsert key
        manager
            .create_index(
                Index::create()
                    .name("idx_server_readmes_server_filename")
                    .table(ServerReadmes::Table)
                    .col(ServerReadmes::ServerId)
                    .col(ServerReadmes::Filename)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "servers")]
enum Servers {
    Table,
    Id,
    Slug,
    SourceUrl,
    Owner,
    Name,
    Stars,
    Forks,
    Watchers,
    OpenIssues,
    RepoCreatedAt,
    LastUpdated,
    QualityScore,
    QualityDocumentation,
    QualityMaintenance,
    QualityCommunity,
    QualityPerformance,
    Complexity,
    Maturity,
    IsOfficial,
    CreatedAt,
    UpdatedAt,
    SyncedAt,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "server_installations")]
enum ServerInstallations {
    Table,
    Id,
    ServerId,
    Method,
    Command,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "server_tech_stack")]
enum ServerTechStack {
    Table,
    Id,
    ServerId,
    Technology,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "server_readmes")]
enum ServerReadmes {
    Table,
    Id,
    ServerId,
    Filename,
    Content,
    ContentHash,
    SizeBytes,
    UpdatedAt,
}
