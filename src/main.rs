//! # docchat CLI
//!
//! The `docchat` binary answers questions about local documents and
//! summarizes them on request.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./config/docchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat ask --file report.pdf "What is the total?"` | One-shot ingest + query |
//! | `docchat chat --file report.pdf` | Interactive chat session |
//! | `docchat serve` | Start the HTTP JSON API |
//! | `docchat history show` | Print the persisted transcript |
//! | `docchat history clear` | Delete the persisted transcript |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docchat::{chat, config, history, server};

/// docchat — ask questions about your documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file falls back to built-in defaults.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "A conversational question-answering and summarization assistant for local documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest documents and answer a single question.
    ///
    /// Routes the question to the summarization or answering path, prints
    /// the post-processed reply, and exits.
    Ask {
        /// The question (or "summarize ..." request).
        question: String,

        /// Document to ingest; repeat for multiple files.
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },

    /// Start an interactive chat session.
    ///
    /// Documents can be passed up front with `--file` or loaded from the
    /// prompt with `/load`. The transcript is persisted between runs.
    Chat {
        /// Document to ingest on startup; repeat for multiple files.
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },

    /// Start the HTTP JSON API.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// ingestion, query, and transcript endpoints.
    Serve,

    /// Inspect or clear the persisted transcript.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print the persisted transcript.
    Show,
    /// Delete the persisted transcript.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ask { question, files } => {
            chat::run_ask(&cfg, &files, &question).await?;
        }
        Commands::Chat { files } => {
            chat::run_chat(&cfg, &files).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::History { action } => match action {
            HistoryAction::Show => {
                for entry in history::load_transcript(&cfg.history.path)? {
                    println!("{:?}: {}", entry.role, entry.content);
                }
            }
            HistoryAction::Clear => {
                history::save_transcript(&cfg.history.path, &[])?;
                println!("Chat history has been deleted.");
            }
        },
    }

    Ok(())
}
