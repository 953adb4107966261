//! Domain types shared by the watcher, the upload orchestrator and the CLI.
//!
//! All path fields use `PathBuf`; filenames are kept as the bare directory
//! entry name the watcher reported.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Bare name of an entry in the watched directory (no directory component).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Filename(pub String);

impl Filename {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the name carries the transport's in-progress write prefix.
    pub fn is_transport_temp(&self, prefix: &str) -> bool {
        !prefix.is_empty() && self.0.starts_with(prefix)
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Filename {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Filename {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a resource registered with the remote file service
/// (e.g. `gid://shopify/GenericFile/123`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// A debounced filename whose path was confirmed to be a regular file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyFile {
    pub filename: Filename,
    pub path: PathBuf,
    /// Byte size taken from the probe's metadata lookup.
    pub size: u64,
}

/// One signed form field returned by the staging call. Replayed verbatim
/// and in order when transferring the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormParam {
    pub name: String,
    pub value: String,
}

impl FormParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One-time upload target handed out by the staging call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedTarget {
    pub upload_url: String,
    /// Locator the register call uses to reference the transferred bytes.
    pub resource_url: String,
    pub parameters: Vec<FormParam>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_temp_prefix_matches_only_at_start() {
        assert!(Filename::from(".in.stock.csv").is_transport_temp(".in."));
        assert!(!Filename::from("stock.in.csv").is_transport_temp(".in."));
        assert!(!Filename::from("stock.csv").is_transport_temp(".in."));
    }

    #[test]
    fn empty_prefix_never_matches() {
        assert!(!Filename::from(".in.stock.csv").is_transport_temp(""));
    }
}
