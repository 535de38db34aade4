//! Tech-stack entity - the ranked top languages of a server.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One technology in a server's stack. At most one row per
/// (server, technology); a sync pass replaces the whole set.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "server_tech_stack")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning server.
    pub server_id: Uuid,
    /// Language name as reported by the provider.
    pub technology: String,
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
