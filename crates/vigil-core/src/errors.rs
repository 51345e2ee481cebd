//! Cross-cutting error types for vigil.
//!
//! Domain-specific errors (`DiscoveryError`, `StoreError`, `RunnerError`) are
//! defined in their respective crates. The CLI converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any vigil crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Lookup returned no result.
    #[error("Not found: {kind} {name}")]
    NotFound { kind: String, name: String },

    /// A run status transition was attempted that is not allowed.
    #[error("Invalid state transition for {name}: from {from} to {to}")]
    InvalidTransition {
        name: String,
        from: String,
        to: String,
    },

    /// A name or value failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
