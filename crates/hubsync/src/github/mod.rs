//! GitHub metadata provider: wire types, error taxonomy, and the
//! rate-limit-aware fetch client.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GithubClient, GithubConfig};
pub use error::FetchError;
pub use types::{ContentsEnvelope, LanguageHistogram, RateLimitInfo, RawOwner, RawRepo};
