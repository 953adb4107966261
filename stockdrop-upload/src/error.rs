//! Error types for stockdrop-upload.

use std::path::PathBuf;

use thiserror::Error;

/// All errors a remote file service call can produce.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Connection, TLS or body decoding failure.
    #[error("HTTP error during {operation}: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status. `body` is kept for diagnostics.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// GraphQL `errors` or mutation `userErrors`.
    #[error("{operation} rejected by service: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },

    /// A field the protocol requires was absent from the response.
    #[error("{operation} response is missing `{field}`")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// Reading the local file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn http_err(operation: &'static str) -> impl FnOnce(reqwest::Error) -> RemoteError {
    move |source| RemoteError::Http { operation, source }
}
