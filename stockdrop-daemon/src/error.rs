use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watcher, sweeper and daemon runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("config error: {0}")]
    Config(#[from] stockdrop_core::ConfigError),

    #[error("remote error: {0}")]
    Remote(#[from] stockdrop_upload::RemoteError),

    #[error("invalid sentry DSN: {0}")]
    Dsn(#[from] sentry::types::ParseDsnError),

    #[error("daemon runtime error: {0}")]
    Runtime(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
