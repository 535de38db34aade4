//! Hubsync - catalog metadata synchronizer.
//!
//! Walks a catalog of externally-hosted repositories, fetches their metadata
//! from the hosting provider with rate-limit-aware pacing, derives quality
//! and maturity signals, and persists the result transactionally - one
//! all-or-nothing commit per entity, resumable after interruption.
//!
//! # Features
//!
//! - `migrate` - Enables database migration support. When enabled, you can
//!   use [`connect_and_migrate`] to automatically run migrations on
//!   connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::{Arc, atomic::AtomicBool};
//! use hubsync::{connect_and_migrate, GithubClient, GithubConfig, SyncEngine};
//! use hubsync::http::ReqwestTransport;
//!
//! let db = connect_and_migrate("sqlite://hubsync.db?mode=rwc").await?;
//! let transport = Arc::new(ReqwestTransport::with_timeout(timeout)?);
//! let client = GithubClient::new(transport, GithubConfig::default());
//!
//! let engine = SyncEngine::new(client, db);
//! let catalog = hubsync::catalog::load_catalog(path)?;
//! let report = engine
//!     .run_batch(&catalog, &Default::default(), &AtomicBool::new(false), None)
//!     .await?;
//! ```

pub mod catalog;
pub mod db;
pub mod entity;
pub mod extract;
pub mod github;
pub mod http;
pub mod score;
pub mod store;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use catalog::{CatalogEntry, load_catalog};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use github::{FetchError, GithubClient, GithubConfig, RateLimitInfo};
pub use store::{ReadmeDocument, ScoredRecord, StoreError};
pub use sync::{BatchOptions, BatchReport, EntityOutcome, SkipReason, SyncEngine, SyncError};
