use sea_orm::{DbErr, TransactionError};
use thiserror::Error;

/// Errors that can occur while applying a scored record to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The catalog entry has no row in the store.
    #[error("Server not tracked: {slug}")]
    NotTracked { slug: String },
}

impl StoreError {
    pub fn not_tracked(slug: &str) -> Self {
        Self::NotTracked {
            slug: slug.to_string(),
        }
    }
}

impl From<TransactionError<DbErr>> for StoreError {
    fn from(err: TransactionError<DbErr>) -> Self {
        match err {
            TransactionError::Connection(e) | TransactionError::Transaction(e) => Self::Database(e),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
