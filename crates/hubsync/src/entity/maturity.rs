//! Maturity enum for type-safe categorical storage.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project maturity derived from repository age and popularity.
///
/// `Mature` is part of the stored vocabulary for compatibility with
/// pre-existing rows; the scorer only ever assigns the first three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Maturity {
    #[sea_orm(string_value = "experimental")]
    Experimental,
    #[sea_orm(string_value = "beta")]
    Beta,
    #[sea_orm(string_value = "stable")]
    Stable,
    #[sea_orm(string_value = "mature")]
    Mature,
}

impl std::fmt::Display for Maturity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Maturity::Experimental => write!(f, "experimental"),
            Maturity::Beta => write!(f, "beta"),
            Maturity::Stable => write!(f, "stable"),
            Maturity::Mature => write!(f, "mature"),
        }
    }
}
