//! Stockdrop core library — domain types, settings, secrets, CSV headers.
//!
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`ConfigError`], [`HeaderError`]
//! - [`config`] — YAML settings load / validate
//! - [`secrets`] — Docker secret files and [`Credentials`]
//! - [`headers`] — feed header renaming

pub mod config;
pub mod error;
pub mod headers;
pub mod secrets;
pub mod types;

pub use config::{LogFormat, Settings, ShopifySettings};
pub use error::{ConfigError, HeaderError};
pub use secrets::Credentials;
pub use types::{Filename, FormParam, ReadyFile, ResourceId, StagedTarget};
