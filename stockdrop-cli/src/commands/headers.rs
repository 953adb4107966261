//! `stockdrop rewrite-headers` — rename feed headers into a processed copy.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stockdrop_core::{headers, Settings};

#[derive(Args, Debug)]
pub struct RewriteHeadersArgs {
    /// CSV file to read; the original is left untouched.
    pub file: PathBuf,
}

impl RewriteHeadersArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let output = headers::rewrite_file(&self.file, &settings.header_mapping)
            .with_context(|| format!("failed to rewrite headers of {}", self.file.display()))?;
        println!("✓ processed CSV saved to {}", output.display());
        Ok(())
    }
}
