//! Common re-exports for convenient entity usage.

pub use super::complexity::Complexity;
pub use super::installation::{
    ActiveModel as InstallationActiveModel, Column as InstallationColumn, Entity as Installation,
    Model as InstallationModel,
};
pub use super::maturity::Maturity;
pub use super::readme::{
    ActiveModel as ReadmeActiveModel, Column as ReadmeColumn, Entity as Readme,
    Model as ReadmeModel,
};
pub use super::server::{
    ActiveModel as ServerActiveModel, Column as ServerColumn, Entity as Server,
    Model as ServerModel,
};
pub use super::tech_stack::{
    ActiveModel as TechStackActiveModel, Column as TechStackColumn, Entity as TechStack,
    Model as TechStackModel,
};
