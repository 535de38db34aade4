//! README entity - latest decoded README content per server.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The current README for a server, keyed by (server, filename). History is
/// not kept; latest content wins.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "server_readmes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning server.
    pub server_id: Uuid,
    /// Logical filename, e.g. `README.md`.
    pub filename: String,
    /// Decoded README text.
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// SHA-256 hex digest of the content.
    pub content_hash: String,
    /// Content length in bytes.
    pub size_bytes: i64,
    /// When the content last changed.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::server::Entity",
        from = "Column::ServerId",
        to = "super::server::Column::Id"
    )]
    Server,
}

impl Related<super::server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Server.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
