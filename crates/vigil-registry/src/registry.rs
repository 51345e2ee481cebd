//! Shared registry whose catalog is replaced wholesale on rescan.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use vigil_core::entities::UnitDescriptor;

use crate::catalog::Catalog;
use crate::error::DiscoveryError;
use crate::scan::scan;

/// Owner of the current [`Catalog`] for a checks root.
///
/// Readers take an `Arc` snapshot and never observe a half-built catalog.
/// A rescan builds a complete new catalog first and swaps it in under a
/// short write lock, so runs already holding a descriptor keep using it.
#[derive(Debug)]
pub struct Registry {
    root: PathBuf,
    current: RwLock<Arc<Catalog>>,
}

impl Registry {
    /// Scan `root` and build a registry from the result.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::RootUnreadable`] if `root` cannot be listed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DiscoveryError> {
        let root = root.into();
        let catalog = scan(&root)?;
        Ok(Self::with_catalog(root, catalog))
    }

    /// Wrap an already-built catalog.
    #[must_use]
    pub fn with_catalog(root: impl Into<PathBuf>, catalog: Catalog) -> Self {
        Self {
            root: root.into(),
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The current catalog.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Descriptor for a qualified name in the current catalog.
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<Arc<UnitDescriptor>> {
        self.snapshot().get(qualified_name)
    }

    /// Rescan the root and swap in the new catalog.
    ///
    /// On error the previous catalog stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::RootUnreadable`] if the root has become
    /// unreadable.
    pub fn rescan(&self) -> Result<Arc<Catalog>, DiscoveryError> {
        let fresh = Arc::new(scan(&self.root)?);
        self.replace(Arc::clone(&fresh));
        tracing::info!(
            root = %self.root.display(),
            units = fresh.len(),
            issues = fresh.issues().len(),
            "registry rescanned"
        );
        Ok(fresh)
    }

    /// Swap in a catalog built elsewhere.
    pub fn replace(&self, catalog: Arc<Catalog>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = catalog;
    }
}
