//! In-process result store.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use vigil_core::entities::RunResult;

use crate::error::StoreError;
use crate::{ResultStore, validate_name};

#[derive(Debug, Default)]
struct Slot {
    latest: Option<Arc<RunResult>>,
    history: VecDeque<Arc<RunResult>>,
}

/// Results held in memory, lost on exit.
///
/// Each slot stores an `Arc` so a `put` is a pointer swap under a short write
/// lock; readers clone the `Arc` and never see a partial result.
#[derive(Debug)]
pub struct MemoryResultStore {
    slots: RwLock<BTreeMap<String, Slot>>,
    history_limit: usize,
}

impl MemoryResultStore {
    /// Store keeping up to `history_limit` results per unit. Zero disables history.
    #[must_use]
    pub const fn new(history_limit: usize) -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
            history_limit,
        }
    }
}

impl Default for MemoryResultStore {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ResultStore for MemoryResultStore {
    fn put(&self, result: &RunResult) -> Result<(), StoreError> {
        validate_name(&result.qualified_name)?;
        let shared = Arc::new(result.clone());
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(result.qualified_name.clone()).or_default();
        slot.latest = Some(Arc::clone(&shared));
        if self.history_limit > 0 {
            slot.history.push_back(shared);
            while slot.history.len() > self.history_limit {
                slot.history.pop_front();
            }
        }
        Ok(())
    }

    fn get(&self, qualified_name: &str) -> Result<Option<RunResult>, StoreError> {
        validate_name(qualified_name)?;
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots
            .get(qualified_name)
            .and_then(|slot| slot.latest.as_deref().cloned()))
    }

    fn history(&self, qualified_name: &str) -> Result<Vec<RunResult>, StoreError> {
        validate_name(qualified_name)?;
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots
            .get(qualified_name)
            .map(|slot| slot.history.iter().map(|r| (**r).clone()).collect())
            .unwrap_or_default())
    }

    fn delete(&self, qualified_name: &str) -> Result<bool, StoreError> {
        validate_name(qualified_name)?;
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.remove(qualified_name).is_some())
    }

    fn names(&self) -> Result<Vec<String>, StoreError> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots
            .iter()
            .filter(|(_, slot)| slot.latest.is_some())
            .map(|(name, _)| name.clone())
            .collect())
    }
}
