//! Configuration file support for hubsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `HUBSYNC_`, e.g., `HUBSYNC_DATABASE_URL`)
//! 3. Config file (~/.config/hubsync/config.toml or ./hubsync.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/hubsync/hubsync.db` on
//! Linux (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/hubsync/hubsync.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."  # or use HUBSYNC_GITHUB_TOKEN env var
//! base_delay_ms = 200
//! low_water = 100
//!
//! [sync]
//! progress_every = 25
//! tech_stack_limit = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use hubsync::GithubConfig;
use hubsync::github::client::{DEFAULT_BASE_DELAY_MS, DEFAULT_LOW_WATER};
use hubsync::sync::{DEFAULT_PROGRESS_EVERY, DEFAULT_TECH_STACK_LIMIT};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    /// Defaults to `sqlite://~/.local/state/hubsync/hubsync.db` if not specified.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via HUBSYNC_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// API base URL. Only overridden for testing against a stub server.
    pub api_base: Option<String>,
    /// Base inter-request delay in milliseconds.
    pub base_delay_ms: u64,
    /// Remaining-quota threshold below which pacing scales up.
    pub low_water: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: None,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            low_water: DEFAULT_LOW_WATER,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Emit a progress heartbeat every N entities.
    pub progress_every: usize,
    /// How many languages to keep as the tech stack.
    pub tech_stack_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            progress_every: DEFAULT_PROGRESS_EVERY,
            tech_stack_limit: DEFAULT_TECH_STACK_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/hubsync/config.toml)
    /// 3. Local config file (./hubsync.toml)
    /// 4. Environment variables with HUBSYNC_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        // Add XDG config file if it exists
        if let Some(proj_dirs) = ProjectDirs::from("", "", "hubsync") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Add local config file (higher priority than XDG)
        let local_config = PathBuf::from("hubsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./hubsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // Add HUBSYNC_ prefixed environment variables
        // e.g., HUBSYNC_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("HUBSYNC")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// If no database URL is configured, defaults to
    /// `sqlite://~/.local/state/hubsync/hubsync.db?mode=rwc` on Linux (using
    /// the XDG state directory) or the platform-appropriate equivalent. The
    /// `mode=rwc` parameter enables read-write access and creates the file if
    /// it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("hubsync.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Build the client configuration, with an optional token override from
    /// the command line.
    pub fn github_config(&self, token_override: Option<String>) -> GithubConfig {
        let defaults = GithubConfig::default();
        GithubConfig {
            token: token_override.or_else(|| self.github.token.clone()),
            api_base: self.github.api_base.clone().unwrap_or(defaults.api_base),
            base_delay: Duration::from_millis(self.github.base_delay_ms),
            low_water: self.github.low_water,
        }
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/hubsync` or `~/.local/state/hubsync`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hubsync").map(|dirs| {
            // state_dir() returns None on macOS/Windows, fall back to data_dir
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
