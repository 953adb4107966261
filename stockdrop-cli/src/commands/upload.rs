//! `stockdrop upload` — push one file through the upload protocol.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use stockdrop_core::{Filename, Settings};
use stockdrop_daemon::{connect_remote, init_tracing, probe};
use stockdrop_upload::{UploadContext, UploadOptions, UploadOutcome};

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload.
    pub file: PathBuf,
}

impl UploadArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let _telemetry = init_tracing(settings);

        let name = self
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", self.file.display()))?;
        let filename = Filename::from(name);
        let dir = match self.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let outcome = crate::block_on(async {
            let Some(ready) = probe(&dir, &filename).await else {
                return None;
            };
            let mut context =
                UploadContext::new(connect_remote(settings), UploadOptions::from_settings(settings));
            Some(context.handle(ready).await)
        })?;

        match outcome {
            None => bail!("{} is not a regular file", self.file.display()),
            Some(UploadOutcome::Registered { id }) => {
                println!(
                    "✓ '{filename}' registered as {id} at {}",
                    Utc::now().to_rfc3339()
                );
                Ok(())
            }
            Some(UploadOutcome::Aborted { phase, reason }) => {
                bail!("upload of '{filename}' failed during {phase}: {reason}")
            }
            Some(UploadOutcome::ClientUnavailable) => {
                bail!("remote client unavailable; check the configured secrets")
            }
        }
    }
}
