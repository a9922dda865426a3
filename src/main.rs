//! # ragkb CLI
//!
//! Manage RAG knowledge bases on a remote document/vector-store API.
//!
//! ## Usage
//!
//! ```bash
//! ragkb --config ./config/ragkb.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragkb kb list` | List knowledge bases |
//! | `ragkb kb create <name>` | Create a knowledge base |
//! | `ragkb kb delete <name>` | Delete a knowledge base (asks first) |
//! | `ragkb docs list` | List documents |
//! | `ragkb docs delete <id>` | Delete a document (asks first) |
//! | `ragkb upload <files>...` | Upload files concurrently |
//! | `ragkb search "<query>"` | Semantic search |
//! | `ragkb stats` | Vector-store statistics |
//! | `ragkb health` | Server health check |
//! | `ragkb shell` | Interactive session |
//!
//! ## Examples
//!
//! ```bash
//! ragkb kb create support-docs --description "Support articles"
//! ragkb upload --kb support-docs docs/refunds.md docs/shipping.pdf
//! ragkb search "refund policy" --limit 5
//! RAGKB_API_URL=http://10.0.0.5:8000 ragkb stats
//! ```

use clap::{Parser, Subcommand};
use ragkb::{commands, config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "./config/ragkb.toml";

/// ragkb: upload, search and manage RAG knowledge bases.
///
/// Settings come from a TOML file; without one the built-in defaults are
/// used (API at `http://localhost:8000/api/rag`).
#[derive(Parser)]
#[command(name = "ragkb", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to `./config/ragkb.toml`
    /// when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding the config file and `RAGKB_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage knowledge bases.
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },

    /// Manage documents.
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },

    /// Upload files into a knowledge base.
    ///
    /// All files are sent concurrently. The batch reports how many
    /// succeeded and how many failed; one failure never stops the others.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target knowledge base (defaults to `view.default_knowledge_base`).
        #[arg(long)]
        kb: Option<String>,
    },

    /// Search ingested documents.
    Search {
        query: String,

        /// Restrict the search to one knowledge base.
        #[arg(long)]
        kb: Option<String>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show vector-store statistics.
    Stats,

    /// Check that the API server is reachable and healthy.
    Health,

    /// Start an interactive session.
    Shell,
}

#[derive(Subcommand)]
enum KbAction {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        name: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DocsAction {
    List,
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let (path, required) = match &cli.config {
        Some(p) => (p.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    let mut cfg = config::load_config(&path, required)?;
    if let Some(url) = cli.api_url {
        cfg.api.base_url = url;
        config::validate(&cfg)?;
    }

    match cli.command {
        Commands::Kb { action } => match action {
            KbAction::List => commands::run_kb_list(&cfg).await?,
            KbAction::Create { name, description } => {
                commands::run_kb_create(&cfg, &name, description).await?
            }
            KbAction::Delete { name, yes } => commands::run_kb_delete(&cfg, &name, yes).await?,
        },
        Commands::Docs { action } => match action {
            DocsAction::List => commands::run_docs_list(&cfg).await?,
            DocsAction::Delete { id, yes } => commands::run_docs_delete(&cfg, &id, yes).await?,
        },
        Commands::Upload { files, kb } => commands::run_upload(&cfg, &files, kb).await?,
        Commands::Search { query, kb, limit } => {
            commands::run_search(&cfg, &query, kb, limit).await?
        }
        Commands::Stats => commands::run_stats(&cfg).await?,
        Commands::Health => commands::run_health(&cfg).await?,
        Commands::Shell => commands::run_shell(&cfg).await?,
    }

    Ok(())
}
