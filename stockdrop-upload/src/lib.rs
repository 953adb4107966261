//! # stockdrop-upload
//!
//! Replace-on-upload orchestration against a remote file service.
//!
//! Build an [`UploadContext`] around any [`RemoteFiles`] implementation
//! (in production, [`ShopifyFiles`]) and call [`UploadContext::handle`] once
//! per ready file.

pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod shopify;

pub use error::RemoteError;
pub use orchestrator::{UploadContext, UploadOptions, UploadOutcome, UploadPhase};
pub use remote::{FilePart, RegisterRequest, RemoteFiles, StageRequest};
pub use shopify::ShopifyFiles;
