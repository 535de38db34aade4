//! Persistence layer: resolves catalog entries to stored rows and applies
//! scored records as per-server all-or-nothing transactions.

mod apply;
mod errors;
mod record;

pub use apply::{apply, find_by_slug};
pub use errors::{Result, StoreError};
pub use record::{ReadmeDocument, ScoredRecord};
