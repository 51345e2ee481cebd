//! # vigil-store
//!
//! Durable home for finished run results.
//!
//! One slot per qualified name holds the latest [`RunResult`]; an optional
//! bounded history keeps earlier ones. Writes are last-writer-wins and a
//! reader never observes a partially written result.
//!
//! - [`MemoryResultStore`]: in-process, `Arc` swap under a short lock
//! - [`FileResultStore`]: JSON file per unit (atomic rename) plus JSONL history

mod error;
mod file;
mod memory;

use std::sync::Arc;

use vigil_config::{StoreBackend, StoreConfig};
use vigil_core::entities::RunResult;
use vigil_core::names;

pub use error::StoreError;
pub use file::FileResultStore;
pub use memory::MemoryResultStore;

/// Storage for finished results, keyed by qualified name.
pub trait ResultStore: Send + Sync {
    /// Replace the latest result for `result.qualified_name` and append it to
    /// history when retention is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the name is invalid or the write fails.
    fn put(&self, result: &RunResult) -> Result<(), StoreError>;

    /// Latest result, or `None` if the unit has never been stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the stored result cannot be read.
    fn get(&self, qualified_name: &str) -> Result<Option<RunResult>, StoreError>;

    /// Retained results, oldest first. Empty when history is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the history cannot be read.
    fn history(&self, qualified_name: &str) -> Result<Vec<RunResult>, StoreError>;

    /// Remove the latest result and history. Returns whether anything existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if removal fails.
    fn delete(&self, qualified_name: &str) -> Result<bool, StoreError>;

    /// Qualified names with a stored result, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be listed.
    fn names(&self) -> Result<Vec<String>, StoreError>;
}

/// Build the store selected by configuration.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file store directory cannot be created.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn ResultStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryResultStore::new(config.history_limit))),
        StoreBackend::File => Ok(Arc::new(FileResultStore::open(
            &config.dir,
            config.history_limit,
        )?)),
    }
}

/// Reject names that are not `<module>.<unit>`; they double as file names.
fn validate_name(qualified_name: &str) -> Result<(), StoreError> {
    names::split(qualified_name)
        .map(drop)
        .map_err(|_| StoreError::InvalidName(qualified_name.to_string()))
}
