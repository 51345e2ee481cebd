//! Job runner error types.

use thiserror::Error;
use vigil_store::StoreError;

/// Errors returned synchronously by the job runner.
///
/// Execution-phase problems never appear here; they are captured in the run's
/// result instead.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No unit with this qualified name is registered.
    #[error("Unknown unit: {0}")]
    NotFound(String),

    /// A run for this unit is already pending or running.
    #[error("Unit {0} is already running")]
    AlreadyRunning(String),

    /// Every worker is busy and the queue policy is `reject`.
    #[error("No worker capacity for {0}")]
    NoCapacity(String),

    /// The runner has been shut down, or a run ended without a result.
    #[error("Runner is closed")]
    Closed,

    /// Reading the last stored result failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
