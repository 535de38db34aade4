//! SeaORM entity definitions for the hubsync database schema.

pub mod complexity;
pub mod installation;
pub mod maturity;
pub mod prelude;
pub mod readme;
pub mod server;
pub mod tech_stack;

pub use complexity::Complexity;
pub use maturity::Maturity;
