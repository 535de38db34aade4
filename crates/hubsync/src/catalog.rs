//! Catalog input: the ordered list of servers a batch run walks.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// One catalog entry. Extra fields in the source document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Display name, usually `owner/repo`.
    pub name: String,
    /// Repository source URL; absent or empty means the entry is skipped.
    #[serde(default, alias = "githubUrl")]
    pub github_url: Option<String>,
}

impl CatalogEntry {
    /// Stable key used for store lookups, resume tokens, and logs.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name.replace('/', "_")
    }

    /// Source URL, treating an empty string as absent.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.github_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load the catalog from a JSON array file. A missing or malformed file is
/// fatal to the run; there is no partial catalog.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let entries = serde_json::from_str(&raw)?;
    Ok(entries)
}
