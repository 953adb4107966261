//! Stockdrop — FTP drop-folder watcher that replaces the shop's stock feed file.
//!
//! # Usage
//!
//! ```text
//! stockdrop [--config <path>] run
//! stockdrop [--config <path>] sweep [--dir <path>] [--dry-run]
//! stockdrop [--config <path>] upload <file>
//! stockdrop [--config <path>] rewrite-headers <file.csv>
//! stockdrop [--config <path>] config [--json]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigArgs, headers::RewriteHeadersArgs, sweep::SweepArgs, upload::UploadArgs,
};
use stockdrop_core::{config, Settings};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stockdrop",
    version,
    about = "Watch an FTP drop folder and publish each new file to the shop",
    long_about = None,
)]
struct Cli {
    /// Settings file (defaults to <config_dir>/stockdrop/config.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the watcher, uploader and retention sweeper in the foreground.
    Run,

    /// Delete files older than the retention window once.
    Sweep(SweepArgs),

    /// Upload a single file, replacing nothing.
    Upload(UploadArgs),

    /// Rename CSV headers into a `_processed.csv` sibling.
    RewriteHeaders(RewriteHeadersArgs),

    /// Print the effective settings.
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    match cli.command {
        Commands::Run => {
            stockdrop_daemon::start_blocking(settings).context("daemon exited with error")
        }
        Commands::Sweep(args) => args.run(&settings),
        Commands::Upload(args) => args.run(&settings),
        Commands::RewriteHeaders(args) => args.run(&settings),
        Commands::Config(args) => args.run(&settings),
    }
}

fn load_settings(path: Option<&std::path::Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => config::load_at(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => config::load().context("failed to load settings")?,
    };
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

/// Current-thread tokio runtime for one-shot commands.
pub(crate) fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
