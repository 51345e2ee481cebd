//! Faults raised by sub-check code.

use std::any::Any;

use thiserror::Error;
use vigil_core::data::DataError;

/// An error raised by a sub-check or lifecycle hook.
///
/// Faults never escape a run: the engine turns each one into a synthetic
/// `failure` record and marks the run errored.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Fault {
    message: String,
}

impl Fault {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build a fault from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new(format!("panicked: {detail}"))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DataError> for Fault {
    fn from(error: DataError) -> Self {
        Self::new(error.to_string())
    }
}

impl From<anyhow::Error> for Fault {
    fn from(error: anyhow::Error) -> Self {
        Self::new(format!("{error:#}"))
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
