//! Error types for stockdrop-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading settings or secrets.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the settings file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error (printing effective settings).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A setting holds a value the daemon cannot run with.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The secret file is missing or unreadable.
    #[error("required secret '{name}' not found or unreadable at {path}: {source}")]
    SecretUnreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The secret file exists but holds only whitespace.
    #[error("required secret '{name}' is empty")]
    SecretEmpty { name: String },
}

/// Errors raised by CSV header rewriting.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV file is empty")]
    Empty,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
