//! `stockdrop sweep` — one retention pass over the drop folder.

use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::Args;
use stockdrop_core::Settings;
use stockdrop_daemon::sweep_at;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Directory to sweep (defaults to the configured watch directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// List what would be deleted without deleting anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SweepArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let dir = self.dir.unwrap_or_else(|| settings.watch_dir.clone());
        let report = crate::block_on(sweep_at(
            &dir,
            settings.retention_age(),
            SystemTime::now(),
            self.dry_run,
        ))?
        .with_context(|| format!("failed to sweep {}", dir.display()))?;

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        println!(
            "{prefix}✓ '{}' swept ({} examined, {} deleted, {} failed)",
            dir.display(),
            report.examined,
            report.deleted.len(),
            report.failed
        );
        let marker = if self.dry_run { "~" } else { "✗" };
        for path in &report.deleted {
            println!("  {marker}  {}", path.display());
        }
        Ok(())
    }
}
