//! Discovery error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating and loading unit modules.
///
/// Only [`DiscoveryError::RootUnreadable`] and [`DiscoveryError::UnknownModule`]
/// abort a scan. The per-file variants are collected as
/// [`crate::ScanIssue`]s and the scan moves on.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The configured root does not exist or cannot be listed.
    #[error("checks root {path} is unreadable: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A module file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A module file is not valid TOML or does not match the module schema.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A module file parsed but declares something invalid.
    #[error("invalid module {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// The directory walk itself failed for an entry.
    #[error("walk error: {0}")]
    Walk(String),

    /// A scoped scan named a module with no file beneath the root.
    #[error("unknown module '{module}'")]
    UnknownModule { module: String },
}
