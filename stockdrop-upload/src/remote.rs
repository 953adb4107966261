//! The remote file service as seen by the upload orchestrator.
//!
//! Four calls, each independent of the others: stage a one-time upload
//! target, transfer bytes to it, register the transferred bytes as a
//! resource, and delete a previously registered resource.

use async_trait::async_trait;

use stockdrop_core::{ResourceId, StagedTarget};

use crate::RemoteError;

/// Arguments for [`RemoteFiles::stage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRequest {
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

/// The file part appended last to the transfer form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub mime_type: String,
    pub contents: Vec<u8>,
}

/// Arguments for [`RemoteFiles::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub resource_url: String,
    pub label: String,
    pub filename: String,
}

#[async_trait]
pub trait RemoteFiles: Send + Sync {
    async fn stage(&self, request: &StageRequest) -> Result<StagedTarget, RemoteError>;

    /// POST `file` plus every signed parameter of `target` to its upload URL.
    async fn transfer(&self, target: &StagedTarget, file: FilePart) -> Result<(), RemoteError>;

    async fn register(&self, request: &RegisterRequest) -> Result<ResourceId, RemoteError>;

    async fn delete(&self, id: &ResourceId) -> Result<(), RemoteError>;
}
