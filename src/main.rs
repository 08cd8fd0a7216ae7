mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use reverie::config::ReverieConfig;

#[derive(Parser)]
#[command(name = "reverie", version, about = "Offline-first memory diary store")]
struct Cli {
    /// Config file to use instead of ~/.reverie/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save a diary entry
    Save(cli::save::SaveArgs),
    /// List all entries, newest first
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by id
    Delete {
        id: String,
    },
    /// Import entries left in the legacy key-value file
    Migrate,
    /// Look up an oracle report by access code
    Oracle {
        code: String,
    },
    /// Check store health and remote configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ReverieConfig::load_from(path)?,
        None => ReverieConfig::load()?,
    };

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let engine = cli::build_engine(&config)?;

    // The explicit `migrate` command reports its own outcome.
    if !matches!(cli.command, Command::Migrate) {
        cli::migrate::run_startup(&engine, &config).await;
    }

    match cli.command {
        Command::Save(args) => cli::save::save(&engine, args).await?,
        Command::List { json } => cli::list::list(&engine, json).await?,
        Command::Delete { id } => cli::delete::delete(&engine, &id).await,
        Command::Migrate => cli::migrate::migrate(&engine, &config).await,
        Command::Oracle { code } => cli::oracle::oracle(&config, &code).await?,
        Command::Doctor => cli::doctor::doctor(&engine, &config)?,
    }

    Ok(())
}
