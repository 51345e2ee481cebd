//! Resolution of unit descriptors to runnable units.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use vigil_core::entities::{Implementation, UnitDescriptor};

use crate::rules::RuleUnit;
use crate::unit::CheckUnit;

/// A descriptor could not be turned into a runnable unit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unit '{unit}' names implementation '{key}', which is not registered")]
    UnknownImplementation { unit: String, key: String },

    #[error("sub-check '{check}' of unit '{unit}' has no rule")]
    MissingRule { unit: String, check: String },
}

/// Native implementations by key, plus the built-in rule unit.
///
/// Resolution happens when a run starts, never at discovery time.
#[derive(Clone, Default)]
pub struct UnitLoader {
    native: BTreeMap<String, Arc<dyn CheckUnit>>,
}

impl UnitLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native implementation under `key`, replacing any previous one.
    pub fn register(&mut self, key: impl Into<String>, unit: impl CheckUnit + 'static) -> &mut Self {
        self.register_arc(key, Arc::new(unit))
    }

    pub fn register_arc(&mut self, key: impl Into<String>, unit: Arc<dyn CheckUnit>) -> &mut Self {
        let key = key.into();
        if self.native.insert(key.clone(), unit).is_some() {
            tracing::debug!(%key, "replaced native implementation");
        }
        self
    }

    /// Registered native keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.native.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.native.contains_key(key)
    }

    /// Resolve a descriptor to its runnable unit.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownImplementation`] for an unregistered
    /// native key and [`ResolveError::MissingRule`] for a rules unit with a
    /// rule-less sub-check.
    pub fn load(&self, descriptor: &UnitDescriptor) -> Result<Arc<dyn CheckUnit>, ResolveError> {
        match &descriptor.implementation {
            Implementation::Rules => Ok(Arc::new(RuleUnit::from_descriptor(descriptor)?)),
            Implementation::Native(key) => self.native.get(key).cloned().ok_or_else(|| {
                ResolveError::UnknownImplementation {
                    unit: descriptor.qualified_name.clone(),
                    key: key.clone(),
                }
            }),
        }
    }
}

impl fmt::Debug for UnitLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitLoader")
            .field("native", &self.native.keys().collect::<Vec<_>>())
            .finish()
    }
}
