//! Heuristic quality scoring.
//!
//! Pure functions, no I/O. Raw provider attributes go in, bounded sub-scores
//! and categorical attributes come out. The formulas are deliberately simple
//! point systems; they produce a stable ranking signal, not a verified
//! quality claim.

use chrono::{DateTime, Utc};

use crate::entity::{Complexity, Maturity};
use crate::github::RawRepo;

/// Fixed placeholder: no computed performance signal exists upstream.
pub const PERFORMANCE_SCORE: i32 = 50;

/// The four bounded sub-scores plus derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityScores {
    pub documentation: i32,
    pub maintenance: i32,
    pub community: i32,
    pub performance: i32,
}

impl QualityScores {
    /// Compute all four sub-scores from a repository snapshot and its
    /// decoded README, evaluated at `now`.
    #[must_use]
    pub fn compute(repo: &RawRepo, readme: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            documentation: documentation_score(readme),
            maintenance: maintenance_score(repo.updated_at, now),
            community: community_score(repo.stargazers_count, repo.forks_count),
            performance: PERFORMANCE_SCORE,
        }
    }

    /// Unweighted mean of the four sub-scores, integer-truncated.
    #[must_use]
    pub fn aggregate(&self) -> i32 {
        (self.documentation + self.maintenance + self.community + self.performance) / 4
    }
}

/// Additive README point system, capped at 100.
///
/// Keyword checks are case-insensitive substring tests against a small fixed
/// vocabulary per category.
#[must_use]
pub fn documentation_score(readme: Option<&str>) -> i32 {
    let Some(text) = readme else {
        return 0;
    };

    let lower = text.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    let mut score = 10; // has a README at all
    if text.len() > 1000 {
        score += 15;
    }
    if has_any(&["install", "setup", "getting started"]) {
        score += 10;
    }
    if has_any(&["usage", "example", "how to"]) {
        score += 10;
    }
    if has_any(&["api", "reference", "documentation"]) {
        score += 20;
    }
    if has_any(&["license", "mit", "apache"]) {
        score += 10;
    }

    score.min(100)
}

/// `min(stars/10, 20) + min(forks/5, 15)`.
///
/// The formula structurally tops out at 35; the nominal 100 cap rarely
/// binds. Preserved as-is rather than rescaled.
#[must_use]
pub fn community_score(stars: i64, forks: i64) -> i32 {
    let stars_points = (stars / 10).min(20);
    let forks_points = (forks / 5).min(15);
    ((stars_points + forks_points) as i32).min(100)
}

/// Recency of the last repository update: +25 within 30 days, +12 within
/// 90 days, else 0.
#[must_use]
pub fn maintenance_score(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i32 {
    let Some(updated) = last_updated else {
        return 0;
    };

    let days = (now - updated).num_days();
    if days < 30 {
        25
    } else if days < 90 {
        12
    } else {
        0
    }
}

/// Complexity from language spread and repository size (as delivered by the
/// provider).
#[must_use]
pub fn complexity(language_count: usize, size: i64) -> Complexity {
    if language_count > 3 || size > 10_000 {
        Complexity::High
    } else if language_count <= 1 && size < 1_000 {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}

/// Maturity from repository age and star count.
///
/// `Mature` exists in the stored vocabulary but is never assigned here.
#[must_use]
pub fn maturity(created_at: Option<DateTime<Utc>>, stars: i64, now: DateTime<Utc>) -> Maturity {
    let Some(created) = created_at else {
        return Maturity::Experimental;
    };

    let age_days = (now - created).num_days();
    if age_days > 365 && stars > 100 {
        Maturity::Stable
    } else if age_days > 180 && stars > 10 {
        Maturity::Beta
    } else {
        Maturity::Experimental
    }
}

/// Known first-party organizations, matched case-insensitively.
const OFFICIAL_ORGS: &[&str] = &[
    "anthropics",
    "anthropic",
    "modelcontextprotocol",
    "microsoft",
    "google",
    "facebook",
    "meta",
    "amazon",
    "apple",
    "netflix",
    "stripe",
    "spotify",
    "github",
    "gitlab",
    "docker",
    "kubernetes",
    "hashicorp",
    "elastic",
    "mongodb",
    "redis",
    "postgresql",
    "mysql",
    "oracle",
    "ibm",
    "intel",
    "nvidia",
    "mozilla",
    "apache",
    "python",
    "nodejs",
    "golang",
    "rust-lang",
    "denoland",
    "npm",
    "cloudflare",
    "vercel",
    "netlify",
    "aws",
    "azure",
    "openai",
    "huggingface",
    "pytorch",
    "tensorflow",
    "jupyter",
];

/// Repo-name tokens that suggest an organization's canonical repository.
const OFFICIAL_NAME_TOKENS: &[&str] = &["official", "core", "foundation"];

/// Heuristic official-ness signal. Not a verified trust claim.
///
/// True when the owner is on the allow-list, or when an organization account
/// carries enough stars (with a lower bar for official-sounding repo names).
#[must_use]
pub fn is_official(owner: &str, owner_type: &str, stars: i64, repo_name: &str) -> bool {
    let owner_lower = owner.to_lowercase();
    if OFFICIAL_ORGS.contains(&owner_lower.as_str()) {
        return true;
    }

    if owner_type.eq_ignore_ascii_case("organization") {
        if stars > 5000 {
            return true;
        }
        if stars > 1000 {
            let name_lower = repo_name.to_lowercase();
            if OFFICIAL_NAME_TOKENS.iter().any(|t| name_lower.contains(t)) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    #[test]
    fn documentation_score_accumulates_per_category() {
        assert_eq!(documentation_score(None), 0);
        assert_eq!(documentation_score(Some("hello")), 10);

        let readme = "## Installation\nnpm install acme-cli\n## License\nMIT";
        assert_eq!(documentation_score(Some(readme)), 30);

        let long_readme = format!("{}{}", "x".repeat(1001), " install usage api license");
        assert_eq!(documentation_score(Some(&long_readme)), 75);
    }

    #[test]
    fn documentation_score_is_monotone_in_categories() {
        let texts = [
            "plain",
            "plain install",
            "plain install usage",
            "plain install usage api",
            "plain install usage api license",
        ];
        let scores: Vec<i32> = texts
            .iter()
            .map(|t| documentation_score(Some(t)))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
        assert!(scores.iter().all(|&s| s <= 100));
    }

    #[test]
    fn community_score_caps_per_component() {
        assert_eq!(community_score(0, 0), 0);
        assert_eq!(community_score(95, 20), 9 + 4);
        assert_eq!(community_score(1234, 340), 35);
        assert_eq!(community_score(1_000_000, 1_000_000), 35);
    }

    #[test]
    fn maintenance_score_buckets_by_recency() {
        let now = Utc::now();
        assert_eq!(maintenance_score(Some(now - Duration::days(5)), now), 25);
        assert_eq!(maintenance_score(Some(now - Duration::days(60)), now), 12);
        assert_eq!(maintenance_score(Some(now - Duration::days(200)), now), 0);
        assert_eq!(maintenance_score(None, now), 0);
    }

    #[test]
    fn aggregate_truncates_mean() {
        let scores = QualityScores {
            documentation: 30,
            maintenance: 25,
            community: 35,
            performance: 50,
        };
        assert_eq!(scores.aggregate(), 35); // 140 / 4
    }

    #[test]
    fn complexity_thresholds() {
        assert_eq!(complexity(1, 500), Complexity::Low);
        assert_eq!(complexity(2, 500), Complexity::Medium);
        assert_eq!(complexity(1, 5_000), Complexity::Medium);
        assert_eq!(complexity(4, 500), Complexity::High);
        assert_eq!(complexity(1, 20_000), Complexity::High);
    }

    #[test]
    fn maturity_requires_age_and_stars() {
        let now = Utc::now();
        let old = Some(now - Duration::days(400));
        let middling = Some(now - Duration::days(200));
        let young = Some(now - Duration::days(30));

        assert_eq!(maturity(old, 500, now), Maturity::Stable);
        assert_eq!(maturity(old, 50, now), Maturity::Beta);
        assert_eq!(maturity(middling, 50, now), Maturity::Beta);
        assert_eq!(maturity(middling, 5, now), Maturity::Experimental);
        assert_eq!(maturity(young, 10_000, now), Maturity::Experimental);
        assert_eq!(maturity(None, 10_000, now), Maturity::Experimental);
    }

    #[test]
    fn official_allow_list_is_case_insensitive() {
        assert!(is_official("Anthropics", "User", 0, "sdk"));
        assert!(is_official("modelcontextprotocol", "Organization", 3, "servers"));
        assert!(!is_official("random-person", "User", 50_000, "thing"));
    }

    #[test]
    fn official_org_heuristics() {
        assert!(is_official("some-org", "Organization", 5001, "thing"));
        assert!(!is_official("some-org", "Organization", 4999, "thing"));
        assert!(is_official("some-org", "Organization", 1500, "widget-core"));
        assert!(!is_official("some-org", "Organization", 1500, "widget"));
    }
}
