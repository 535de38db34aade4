//! Server entity - one tracked external repository in the catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::complexity::Complexity;
use crate::entity::maturity::Maturity;

/// Server model - catalog identity plus the derived metadata a sync pass
/// maintains.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "servers")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Catalog Identity ────────────────────────────────────────────────────
    /// Stable catalog key, unique across the table.
    pub slug: String,
    /// Repository source URL as recorded in the catalog.
    #[sea_orm(column_type = "Text", nullable)]
    pub source_url: Option<String>,
    /// Owner login parsed from the source URL.
    pub owner: Option<String>,
    /// Repository name parsed from the source URL.
    pub name: Option<String>,

    // ─── Statistics ──────────────────────────────────────────────────────────
    /// Star count.
    pub stars: Option<i32>,
    /// Fork count.
    pub forks: Option<i32>,
    /// Watcher count.
    pub watchers: Option<i32>,
    /// Open issue count.
    pub open_issues: Option<i32>,

    // ─── Upstream Timestamps ─────────────────────────────────────────────────
    /// When the repository was created upstream.
    pub repo_created_at: Option<DateTimeWithTimeZone>,
    /// When the repository was last updated upstream.
    pub last_updated: Option<DateTimeWithTimeZone>,

    // ─── Quality ─────────────────────────────────────────────────────────────
    /// Aggregate quality score (mean of the four sub-scores).
    pub quality_score: Option<i32>,
    pub quality_documentation: Option<i32>,
    pub quality_maintenance: Option<i32>,
    pub quality_community: Option<i32>,
    pub quality_performance: Option<i32>,
    /// Derived complexity category.
    pub complexity: Option<Complexity>,
    /// Derived maturity category.
    pub maturity: Option<Maturity>,
    /// Heuristic first-party signal.
    #[sea_orm(default_value = false)]
    pub is_official: bool,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// When the row was created.
    pub created_at: DateTimeWithTimeZone,
    /// When the row was last modified.
    pub updated_at: DateTimeWithTimeZone,
    /// When a sync pass last committed for this server.
    pub synced_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installation::Entity")]
    Installation,
    #[sea_orm(has_many = "super::tech_stack::Entity")]
    TechStack,
    #[sea_orm(has_many = "super::readme::Entity")]
    Readme,
}

impl Related<super::installation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installation.def()
    }
}

impl Related<super::tech_stack::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TechStack.def()
    }
}

impl Related<super::readme::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Readme.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
