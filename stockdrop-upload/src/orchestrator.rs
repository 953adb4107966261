//! Replace-on-upload protocol.
//!
//! For each ready file, strictly in order:
//!
//! 1. `ReplacePrevious` — delete the last registered resource (best-effort).
//! 2. `Stage` — ask for a one-time upload target (retried).
//! 3. `Transfer` — POST the file bytes plus the signed parameters.
//! 4. `Register` — create the resource and remember its id.
//!
//! A failed phase ends the attempt. The remembered id changes only when
//! `Register` succeeds.
//!
//! Known gap: step 1 runs before the new file is safely registered. If a
//! later phase fails, the service is left with no registered file until the
//! next successful attempt, even though a valid local file exists.

use std::fmt;
use std::time::Duration;

use stockdrop_core::{ReadyFile, ResourceId, Settings, StagedTarget};

use crate::remote::{FilePart, RegisterRequest, RemoteFiles, StageRequest};
use crate::{error::io_err, RemoteError};

/// Pause between staging attempts.
pub const DEFAULT_STAGE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-attempt constants derived from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub mime_type: String,
    pub label: String,
    /// Extra staging attempts after the first failure.
    pub stage_retries: u32,
    pub stage_retry_delay: Duration,
}

impl UploadOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            mime_type: settings.mime_type.clone(),
            label: settings.label.clone(),
            stage_retries: settings.stage_retries,
            stage_retry_delay: DEFAULT_STAGE_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    ReplacePrevious,
    Stage,
    Transfer,
    Register,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadPhase::ReplacePrevious => "replace_previous",
            UploadPhase::Stage => "stage",
            UploadPhase::Transfer => "transfer",
            UploadPhase::Register => "register",
        };
        f.write_str(name)
    }
}

/// How one upload attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Registered { id: ResourceId },
    Aborted { phase: UploadPhase, reason: String },
    ClientUnavailable,
}

/// Remote client plus the last registered resource id.
///
/// Single writer: `handle` takes `&mut self`, so whichever task owns the
/// context is the only one that can read or replace the remembered id.
pub struct UploadContext<R> {
    remote: Option<R>,
    last_uploaded: Option<ResourceId>,
    options: UploadOptions,
}

impl<R: RemoteFiles> UploadContext<R> {
    /// `remote` is `None` when credentials could not be loaded; every attempt
    /// then ends with [`UploadOutcome::ClientUnavailable`].
    pub fn new(remote: Option<R>, options: UploadOptions) -> Self {
        Self {
            remote,
            last_uploaded: None,
            options,
        }
    }

    pub fn with_last_uploaded(mut self, id: ResourceId) -> Self {
        self.last_uploaded = Some(id);
        self
    }

    pub fn last_uploaded(&self) -> Option<&ResourceId> {
        self.last_uploaded.as_ref()
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// Run the four phases for `file`. Never fails; every error is logged
    /// with its phase and reported in the outcome.
    pub async fn handle(&mut self, file: ReadyFile) -> UploadOutcome {
        let Some(remote) = self.remote.as_ref() else {
            tracing::error!(
                filename = %file.filename,
                "remote client not initialized; skipping upload"
            );
            return UploadOutcome::ClientUnavailable;
        };

        tracing::info!(filename = %file.filename, size = file.size, "upload started");

        let mut replaced = false;
        if let Some(previous) = &self.last_uploaded {
            match remote.delete(previous).await {
                Ok(()) => {
                    tracing::info!(
                        filename = %file.filename,
                        phase = %UploadPhase::ReplacePrevious,
                        resource = %previous,
                        "deleted previous resource"
                    );
                    replaced = true;
                }
                Err(err) => tracing::warn!(
                    filename = %file.filename,
                    phase = %UploadPhase::ReplacePrevious,
                    resource = %previous,
                    error = %err,
                    "could not delete previous resource; continuing"
                ),
            }
        }

        let request = StageRequest {
            filename: file.filename.as_str().to_owned(),
            mime_type: self.options.mime_type.clone(),
            size: file.size,
        };
        let target = match stage_with_retries(remote, &request, &self.options).await {
            Ok(target) => target,
            Err(err) => return abort(&file, UploadPhase::Stage, err, replaced),
        };

        if let Err(err) = transfer(remote, &target, &file, &self.options).await {
            return abort(&file, UploadPhase::Transfer, err, replaced);
        }

        let register = RegisterRequest {
            resource_url: target.resource_url.clone(),
            label: format!("{} {}", self.options.label, file.filename),
            filename: file.filename.as_str().to_owned(),
        };
        let id = match remote.register(&register).await {
            Ok(id) => id,
            Err(err) => return abort(&file, UploadPhase::Register, err, replaced),
        };

        tracing::info!(
            filename = %file.filename,
            phase = %UploadPhase::Register,
            resource = %id,
            "upload registered"
        );
        self.last_uploaded = Some(id.clone());
        UploadOutcome::Registered { id }
    }
}

async fn stage_with_retries<R: RemoteFiles>(
    remote: &R,
    request: &StageRequest,
    options: &UploadOptions,
) -> Result<StagedTarget, RemoteError> {
    let mut attempt = 0u32;
    loop {
        match remote.stage(request).await {
            Ok(target) => return Ok(target),
            Err(err) if attempt < options.stage_retries => {
                attempt += 1;
                tracing::warn!(
                    filename = %request.filename,
                    phase = %UploadPhase::Stage,
                    attempt,
                    retries = options.stage_retries,
                    error = %err,
                    "staging failed; retrying"
                );
                if !options.stage_retry_delay.is_zero() {
                    tokio::time::sleep(options.stage_retry_delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }
}

async fn transfer<R: RemoteFiles>(
    remote: &R,
    target: &StagedTarget,
    file: &ReadyFile,
    options: &UploadOptions,
) -> Result<(), RemoteError> {
    let contents = tokio::fs::read(&file.path)
        .await
        .map_err(|e| io_err(&file.path, e))?;
    let part = FilePart {
        filename: file.filename.as_str().to_owned(),
        mime_type: options.mime_type.clone(),
        contents,
    };
    remote.transfer(target, part).await?;
    tracing::info!(
        filename = %file.filename,
        phase = %UploadPhase::Transfer,
        "file transferred to staged target"
    );
    Ok(())
}

fn abort(file: &ReadyFile, phase: UploadPhase, err: RemoteError, replaced: bool) -> UploadOutcome {
    tracing::error!(
        filename = %file.filename,
        phase = %phase,
        error = %err,
        "upload aborted"
    );
    if replaced {
        tracing::warn!(
            filename = %file.filename,
            phase = %phase,
            "previous resource was already deleted; no file is registered until the next successful upload"
        );
    }
    UploadOutcome::Aborted {
        phase,
        reason: err.to_string(),
    }
}
