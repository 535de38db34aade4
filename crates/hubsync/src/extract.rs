//! Derivation of structured facts from raw provider payloads: owner/name
//! from a source URL, README text from its base64 envelope, installation
//! commands from README prose, and the top-language tech stack.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use thiserror::Error;

use crate::github::{ContentsEnvelope, LanguageHistogram};

/// An `owner/name` repository coordinate parsed from a source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceUrlError {
    #[error("unparseable source URL: {0}")]
    Unparseable(String),

    #[error("source URL has no owner/name path: {0}")]
    NotARepoPath(String),
}

/// Parse `owner` and `name` out of a repository source URL.
///
/// The first two non-empty path segments are taken as owner and name; a
/// trailing `.git` suffix on the name is stripped. Anything without two
/// such segments is rejected.
pub fn parse_source_url(source_url: &str) -> Result<RepoRef, SourceUrlError> {
    let parsed = url::Url::parse(source_url)
        .map_err(|_| SourceUrlError::Unparseable(source_url.to_string()))?;

    let mut segments = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()))
        .ok_or_else(|| SourceUrlError::NotARepoPath(source_url.to_string()))?;

    let owner = segments
        .next()
        .ok_or_else(|| SourceUrlError::NotARepoPath(source_url.to_string()))?;
    let name = segments
        .next()
        .ok_or_else(|| SourceUrlError::NotARepoPath(source_url.to_string()))?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    if name.is_empty() {
        return Err(SourceUrlError::NotARepoPath(source_url.to_string()));
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// Decode a README contents envelope into text.
///
/// The provider delivers base64 with embedded newlines. Any decode failure
/// (unexpected encoding marker, invalid base64, non-UTF-8 bytes) yields
/// `None` and the README is treated as absent.
#[must_use]
pub fn decode_readme(envelope: &ContentsEnvelope) -> Option<String> {
    if envelope.encoding != "base64" {
        return None;
    }

    let compact: String = envelope
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = BASE64.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// Ecosystems whose installation commands are mined from README text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallMethod {
    Npm,
    Yarn,
    Pip,
    Docker,
}

impl InstallMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pip => "pip",
            Self::Docker => "docker",
        }
    }
}

/// A concrete installation command found in a README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub method: InstallMethod,
    pub command: String,
}

/// At most this many commands are kept per ecosystem.
const MAX_COMMANDS_PER_METHOD: usize = 2;

/// Per ecosystem: the patterns that capture a package token, and the
/// canonical command prefix the token is rebuilt with.
static INSTALL_PATTERNS: LazyLock<Vec<(InstallMethod, Vec<Regex>, &'static str)>> =
    LazyLock::new(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("install pattern compiles");
        vec![
            (
                InstallMethod::Npm,
                vec![
                    compile(r"(?i)npm install\s+([^\s`]+)"),
                    compile(r"(?i)npm i\s+([^\s`]+)"),
                ],
                "npm install",
            ),
            (
                InstallMethod::Yarn,
                vec![compile(r"(?i)yarn add\s+([^\s`]+)")],
                "yarn add",
            ),
            (
                InstallMethod::Pip,
                vec![
                    compile(r"(?i)pip install\s+([^\s`]+)"),
                    compile(r"(?i)pip3 install\s+([^\s`]+)"),
                ],
                "pip install",
            ),
            (
                InstallMethod::Docker,
                vec![
                    compile(r"(?i)docker pull\s+([^\s`]+)"),
                    compile(r"(?i)docker run\s+([^\s`]+)"),
                ],
                "docker pull",
            ),
        ]
    });

/// Characters that mark a captured token as a markup placeholder rather than
/// a real package name.
fn looks_like_markup(token: &str) -> bool {
    token.contains(['<', '>', '[', ']'])
}

/// Mine installation commands from README text.
///
/// Captured package tokens are rebuilt into a canonical command per
/// ecosystem (`npm i X` becomes `npm install X`). Per ecosystem, up to
/// [`MAX_COMMANDS_PER_METHOD`] commands are kept in document order;
/// placeholder tokens containing markup characters are discarded.
#[must_use]
pub fn extract_install_commands(readme: &str) -> Vec<InstallCommand> {
    let mut commands = Vec::new();

    for (method, patterns, canonical) in INSTALL_PATTERNS.iter() {
        commands.extend(
            patterns
                .iter()
                .flat_map(|pattern| pattern.captures_iter(readme))
                .filter_map(|c| c.get(1))
                .map(|token| token.as_str().trim())
                .filter(|token| !looks_like_markup(token))
                .take(MAX_COMMANDS_PER_METHOD)
                .map(|token| InstallCommand {
                    method: *method,
                    command: format!("{canonical} {token}"),
                }),
        );
    }

    commands
}

/// Top `limit` languages by byte count, descending.
///
/// The sort is stable, so languages with equal byte counts keep the
/// provider's response order.
#[must_use]
pub fn top_languages(histogram: &LanguageHistogram, limit: usize) -> Vec<String> {
    let mut entries: Vec<(&str, i64)> = histogram.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}
