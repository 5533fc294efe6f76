//! Sprig CLI - train plant classifiers and manage versioned model artifacts
//!
//! This CLI provides a `sprig` command that runs the training loop and moves
//! its checkpoints in and out of the artifact store.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::types::{DownloadArgs, ModelArgs, TrainArgs, UploadArgs, VersionArgs};

/// Sprig - classifier training with versioned, checksum-verified model storage
#[derive(Parser, Debug)]
#[command(name = "sprig", author, version, about = "Sprig - train classifiers and version their checkpoints")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Configuration file (defaults to ~/.sprig/config.toml and ./.sprigrc)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a classifier
    ///
    /// Reads a JSONL dataset, trains with early stopping, writes checkpoints to
    /// the output directory and optionally uploads the best one.
    Train(TrainArgs),

    /// Upload a checkpoint as a new model version
    Upload(UploadArgs),

    /// Download and verify a model version
    Download(DownloadArgs),

    /// List committed versions of a model, newest first
    List(ModelArgs),

    /// Print the latest version of a model
    Latest(ModelArgs),

    /// Show the manifest of a version
    Show(VersionArgs),

    /// Delete every object of a version
    Delete(VersionArgs),
}

fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cli_config = config::CliConfig::load(args.config.as_deref())?;

    let level = args.log_level.as_deref().or(cli_config.log_level.as_deref()).map_or(Level::INFO, parse_level);
    // Logs go to stderr so --json output stays parseable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Train(cmd) => commands::train::execute(cmd, &cli_config).await,
        Command::Upload(cmd) => commands::upload::execute(cmd, &cli_config).await,
        Command::Download(cmd) => commands::download::execute(cmd, &cli_config).await,
        Command::List(cmd) => commands::versions::list(cmd, &cli_config).await,
        Command::Latest(cmd) => commands::versions::latest(cmd, &cli_config).await,
        Command::Show(cmd) => commands::versions::show(cmd, &cli_config).await,
        Command::Delete(cmd) => commands::versions::delete(cmd, &cli_config).await,
    }
}
