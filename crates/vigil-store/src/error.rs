//! Result store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from result store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The qualified name cannot be used as a store key.
    #[error("Invalid result key '{0}'")]
    InvalidName(String),

    /// Reading or writing a result file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored result could not be decoded.
    #[error("Corrupt result in {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
