//! Wire types for the metadata provider's JSON payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Repository owner sub-object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOwner {
    #[serde(default)]
    pub login: String,
    /// "User" or "Organization".
    #[serde(rename = "type", default)]
    pub owner_type: String,
}

/// Raw repository attributes as returned by `/repos/{owner}/{repo}`.
///
/// Ephemeral: consumed once per sync pass, never persisted verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
    #[serde(default)]
    pub watchers_count: i64,
    #[serde(default)]
    pub open_issues_count: i64,
    /// Repository size in KB.
    #[serde(default)]
    pub size: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub owner: RawOwner,
}

/// File-contents envelope from `/repos/{owner}/{repo}/readme`.
///
/// `content` is base64-encoded with embedded newlines.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsEnvelope {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

/// Language-name to byte-count mapping, preserving the provider's key order.
///
/// Insertion order matters downstream: the tech stack is the top-N languages
/// by byte count with ties broken by response order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageHistogram {
    entries: Vec<(String, i64)>,
}

impl LanguageHistogram {
    /// Build from a JSON object, keeping key order. Non-object or non-numeric
    /// values yield an empty histogram rather than an error.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let entries = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_i64().map(|bytes| (k.clone(), bytes)))
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<(String, i64)>) -> Self {
        Self { entries }
    }
}

/// Quota state communicated via response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: u32,
    /// Epoch seconds at which the quota window resets.
    pub reset_epoch: i64,
}
