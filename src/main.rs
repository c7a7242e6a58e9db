//! # Journal Recall CLI (`jrnl`)
//!
//! The `jrnl` binary is the interface to a local semantic index over
//! OCR'd journal entries. It provides commands for ingesting OCR output,
//! searching, listing, deleting with automatic snapshots, and managing
//! backups.
//!
//! ## Usage
//!
//! ```bash
//! jrnl [--config PATH] [--db PATH] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `jrnl ingest <dir>` | Index new journal entries from an OCR output directory |
//! | `jrnl search "<query>"` | Semantic search over indexed chunks |
//! | `jrnl stats` | Index totals and date range |
//! | `jrnl list` | Every indexed entry with chunk and word counts |
//! | `jrnl delete <date>` | Snapshot, then remove one entry |
//! | `jrnl clear` | Snapshot, then remove everything |
//! | `jrnl backup` | Take a manual snapshot |
//! | `jrnl restore <path>` | Replace the index with a snapshot |
//! | `jrnl backups` | List available snapshots, newest first |
//!
//! ## Examples
//!
//! ```bash
//! # Index a batch of OCR output
//! jrnl ingest ./ocr_output
//!
//! # Semantic search
//! jrnl search "camping trips with dad" -n 10
//!
//! # Restrict search to a date range
//! jrnl search "snow" --from 2025-01-01 --to 2025-01-31
//!
//! # Remove one day's entry (snapshot taken first)
//! jrnl delete 2025-01-15 --yes
//!
//! # Roll back to a snapshot
//! jrnl restore ./vector_db_backups/backup_20250115_093012_441_pre-delete
//! ```

mod backup;
mod chunk;
mod config;
mod embedding;
mod error;
mod ingest;
mod lifecycle;
mod models;
mod search;
mod stats;
mod store;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::store::sqlite::SqliteStore;

/// Journal Recall — a local semantic index over handwritten journal
/// entries that have been through OCR.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; without one, built-in defaults apply and `--db` picks the index
/// location.
#[derive(Parser)]
#[command(
    name = "jrnl",
    about = "Journal Recall — semantic search over OCR'd journal entries",
    version,
    long_about = "Journal Recall ingests dated journal text produced by an OCR pipeline, \
    chunks it on sentence boundaries, embeds each chunk, and stores everything in a local \
    SQLite index supporting semantic search, date-range queries, and snapshot-protected \
    deletion."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; built-in defaults are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Index directory, overriding `[index] path` from the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest journal entries from an OCR output directory.
    ///
    /// Expects `text/YYYY-MM-DD.txt` files with matching
    /// `metadata/YYYY-MM-DD.json` sidecars. Already-indexed chunks are
    /// skipped, so re-running over the same directory is safe.
    Ingest {
        /// OCR output directory containing `text/` and `metadata/`.
        source: PathBuf,

        /// Override `[chunking] chunk_size` (characters per chunk).
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Override `[chunking] overlap` (characters shared between chunks).
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Search indexed entries semantically.
    ///
    /// Embeds the query and returns the nearest chunks by cosine
    /// distance. With `--from`/`--to`, results are restricted to that
    /// inclusive date range.
    Search {
        /// The search query.
        query: String,

        /// Maximum number of results.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Start of an inclusive date range (YYYY-MM-DD). Requires `--to`.
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End of an inclusive date range (YYYY-MM-DD). Requires `--from`.
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Show index statistics: entry, chunk, and word totals plus the
    /// covered date range.
    Stats,

    /// List every indexed entry with its chunk and word counts,
    /// oldest first.
    List,

    /// Delete one entry by date.
    ///
    /// Takes a snapshot before anything is removed, then deletes every
    /// chunk for the date. Asks for confirmation unless `--yes`.
    Delete {
        /// Entry date (YYYY-MM-DD).
        date: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Delete every entry in the index.
    ///
    /// Takes a snapshot first. Requires typing `DELETE ALL` at the
    /// prompt unless `--yes` is given.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Take a manual snapshot of the index.
    Backup,

    /// Replace the live index with a snapshot.
    ///
    /// The snapshot directory must be one produced by `jrnl backup` or an
    /// automatic pre-delete snapshot. The live index is swapped out
    /// atomically via a staging copy.
    Restore {
        /// Path to the snapshot directory.
        backup_path: PathBuf,
    },

    /// List available snapshots, newest first.
    Backups,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref(), cli.db.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, mut config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Ingest {
            source,
            chunk_size,
            overlap,
        } => {
            if let Some(size) = chunk_size {
                config.chunking.chunk_size = size;
            }
            if let Some(overlap) = overlap {
                config.chunking.overlap = overlap;
            }
            config::validate(&config)?;
            let store = open_store(&config).await?;
            ingest::run_ingest(&config, &store, &source).await?;
            store.close().await;
        }

        Commands::Search {
            query,
            limit,
            from,
            to,
        } => {
            let k = limit.unwrap_or(config.retrieval.default_k);
            let store = open_store(&config).await?;
            match (from, to) {
                (Some(from), Some(to)) => {
                    search::run_search_range(&store, &from, &to, Some(&query), k).await?
                }
                _ => search::run_search(&store, &query, k).await?,
            }
            store.close().await;
        }

        Commands::Stats => {
            let store = open_store(&config).await?;
            stats::run_stats(&store).await?;
            store.close().await;
        }

        Commands::List => {
            let store = open_store(&config).await?;
            stats::run_list(&store).await?;
            store.close().await;
        }

        Commands::Delete { date, yes } => {
            if !yes && !confirm(&format!("Delete all chunks for {}? [y/N] ", date), "y")? {
                println!("Aborted.");
                return Ok(());
            }
            let store = open_store(&config).await?;
            let deleted =
                lifecycle::delete_by_date(&store, &date, config.backup.max_backups).await?;
            if deleted > 0 {
                println!("Deleted {} chunk(s) for {}.", deleted, date);
            }
            store.close().await;
        }

        Commands::Clear { yes } => {
            if !yes
                && !confirm(
                    "This removes EVERY indexed entry. Type DELETE ALL to continue: ",
                    "DELETE ALL",
                )?
            {
                println!("Aborted.");
                return Ok(());
            }
            let store = open_store(&config).await?;
            let deleted = lifecycle::clear_all(&store, config.backup.max_backups).await?;
            if deleted > 0 {
                println!("Deleted {} chunk(s).", deleted);
            }
            store.close().await;
        }

        Commands::Backup => {
            let store = open_store(&config).await?;
            store.flush_wal().await?;
            store.close().await;
            let path = backup::snapshot(&config.index.path, "manual", config.backup.max_backups)?;
            println!("Snapshot created: {}", path.display());
        }

        Commands::Restore { backup_path } => {
            // The live index must be closed during the swap, so no store
            // is opened here.
            backup::restore(&config.index.path, &backup_path)?;
            println!("Index restored from {}.", backup_path.display());
        }

        Commands::Backups => {
            backup::run_backups(&config.index.path)?;
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let embedder = embedding::create_embedder(&config.embedding)?;
    Ok(SqliteStore::open(&config.index.path, embedder).await?)
}

/// Prompt on stdout and compare the trimmed reply against `expected`
/// (case-insensitively for single-letter confirmations).
fn confirm(prompt: &str, expected: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut reply = String::new();
    io::stdin().read_line(&mut reply)?;
    let reply = reply.trim();
    if expected.len() == 1 {
        Ok(reply.eq_ignore_ascii_case(expected))
    } else {
        Ok(reply == expected)
    }
}
