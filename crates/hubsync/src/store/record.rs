//! The fully derived record a sync pass persists for one server.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::entity::{Complexity, Maturity};
use crate::extract::InstallCommand;
use crate::score::QualityScores;

/// Decoded README content destined for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeDocument {
    /// Logical filename, e.g. `README.md`.
    pub filename: String,
    /// Decoded text.
    pub text: String,
}

impl ReadmeDocument {
    /// SHA-256 hex digest of the text.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let digest = Sha256::digest(self.text.as_bytes());
        format!("{digest:x}")
    }

    /// Text length in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> i64 {
        self.text.len() as i64
    }
}

/// Everything the persistence layer writes for one server, already fetched,
/// extracted, and scored. Applying it twice yields the same stored state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRecord {
    pub owner: String,
    pub name: String,

    pub stars: i32,
    pub forks: i32,
    pub watchers: i32,
    pub open_issues: i32,

    pub repo_created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,

    pub scores: QualityScores,
    pub complexity: Complexity,
    pub maturity: Maturity,
    pub is_official: bool,

    pub installations: Vec<InstallCommand>,
    pub tech_stack: Vec<String>,
    pub readme: Option<ReadmeDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_sha256_hex() {
        let doc = ReadmeDocument {
            filename: "README.md".to_string(),
            text: "hello".to_string(),
        };
        assert_eq!(
            doc.content_hash(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(doc.size_bytes(), 5);
    }
}
