//! Hubsync CLI - command-line interface for the catalog synchronizer.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::limits::OutputFormat;

#[derive(Parser)]
#[command(name = "hubsync")]
#[command(version)]
#[command(about = "Catalog metadata synchronizer for GitHub-hosted repositories")]
#[command(
    long_about = "Hubsync walks a catalog of repositories, fetches their metadata from the \
GitHub API with rate-limit-aware pacing, derives quality and maturity \
signals, and persists everything to a local database. Each entity commits \
atomically, so an interrupted run can be resumed from the last committed \
entry."
)]
#[command(after_long_help = r#"EXAMPLES
    Apply database migrations:
        $ hubsync migrate up

    Sync every entity in a catalog file:
        $ hubsync sync catalog.json

    Resume an interrupted run:
        $ hubsync sync catalog.json --resume acme_widget

    Re-sync one entity, or preview it without persisting:
        $ hubsync sync-one acme_widget
        $ hubsync sync-one acme_widget --dry-run --output json

    Show remaining API quota:
        $ hubsync limits

    Generate shell completions:
        $ hubsync completions bash > ~/.local/share/bash-completion/completions/hubsync

CONFIGURATION
    Hubsync reads configuration from:
      1. ~/.config/hubsync/config.toml (or $XDG_CONFIG_HOME/hubsync/config.toml)
      2. ./hubsync.toml in the current directory
      3. Environment variables (HUBSYNC_* prefix, e.g., HUBSYNC_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    HUBSYNC_DATABASE_URL      Database connection string (default: ~/.local/state/hubsync/hubsync.db)
    HUBSYNC_GITHUB_TOKEN      GitHub personal access token
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Sync a catalog of repositories against the database
    Sync {
        /// Path to the catalog JSON file
        catalog: PathBuf,

        /// Resume from this entity (slug or catalog name); earlier entries
        /// are not visited
        #[arg(short, long)]
        resume: Option<String>,

        /// Process at most this many entities
        #[arg(short, long)]
        limit: Option<usize>,

        /// GitHub API token (overrides config and environment)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Sync a single tracked entity by slug
    SyncOne {
        /// Entity slug (catalog name with '/' replaced by '_')
        slug: String,

        /// Fetch and score, but print the derived record instead of persisting
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Output format for --dry-run
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// GitHub API token (overrides config and environment)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Show current rate limit status
    Limits {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// GitHub API token (overrides config and environment)
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up graceful shutdown handler (Ctrl+C)
    shutdown::setup_shutdown_handler();

    // Initialize tracing for non-TTY mode (structured logging)
    // Only initialize if not connected to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("hubsync=info,hubsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    // Handle commands that don't require database access first
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        Commands::Limits { output, token } => {
            commands::limits::handle_limits(*output, token.clone(), &config).await?;
            return Ok(());
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        // Warn if using a relative path (can cause issues depending on cwd)
        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Sync {
            catalog,
            resume,
            limit,
            token,
        } => {
            commands::sync::handle_sync(&catalog, resume, limit, token, &config, &database_url)
                .await?;
        }
        Commands::SyncOne {
            slug,
            dry_run,
            output,
            token,
        } => {
            commands::sync::handle_sync_one(&slug, dry_run, output, token, &config, &database_url)
                .await?;
        }
        Commands::Limits { .. } | Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
