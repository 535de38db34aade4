//! Installation-method entity - one runnable install command per ecosystem.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One installation command mined from a server's README. At most one row
/// per (server, method); a sync pass replaces the whole set.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "server_installations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning server.
    pub server_id: Uuid,
    /// Ecosystem name (npm, yarn, pip, docker).
    pub method: String,
    /// Canonical install command.
    #[sea_orm(column_type = "Text")]
    pub command: String,
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
