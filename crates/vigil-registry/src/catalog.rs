//! Immutable result of one discovery scan.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use vigil_core::entities::UnitDescriptor;

use crate::error::DiscoveryError;

/// A malformed or unreadable module file skipped during a scan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanIssue {
    pub path: PathBuf,
    pub message: String,
}

impl ScanIssue {
    #[must_use]
    pub fn new(path: &Path, error: &DiscoveryError) -> Self {
        Self {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// One loaded module and its units in display order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: String,
    pub source: PathBuf,
    pub units: Vec<String>,
}

/// Mapping from qualified name to descriptor, plus module display order.
///
/// Catalogs are built once per scan and then shared read-only behind an
/// `Arc`; a rescan builds a new catalog instead of patching this one.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    units: BTreeMap<String, Arc<UnitDescriptor>>,
    modules: BTreeMap<String, ModuleEntry>,
    issues: Vec<ScanIssue>,
}

impl Catalog {
    /// Build a catalog directly from descriptors, grouping them by module.
    #[must_use]
    pub fn from_units(units: Vec<UnitDescriptor>) -> Self {
        let mut grouped: BTreeMap<String, Vec<UnitDescriptor>> = BTreeMap::new();
        for unit in units {
            grouped.entry(unit.module.clone()).or_default().push(unit);
        }
        let mut catalog = Self::default();
        for (module, mut units) in grouped {
            crate::module_file::sort_for_display(&mut units);
            let source = units
                .first()
                .map(|unit| unit.source.clone())
                .unwrap_or_default();
            catalog.insert_module(&module, &source, units);
        }
        catalog
    }

    pub(crate) fn insert_module(&mut self, module: &str, source: &Path, units: Vec<UnitDescriptor>) {
        let names = units
            .iter()
            .map(|unit| unit.qualified_name.clone())
            .collect();
        for unit in units {
            self.units.insert(unit.qualified_name.clone(), Arc::new(unit));
        }
        self.modules.insert(
            module.to_string(),
            ModuleEntry {
                name: module.to_string(),
                source: source.to_path_buf(),
                units: names,
            },
        );
    }

    pub(crate) fn push_issue(&mut self, issue: ScanIssue) {
        self.issues.push(issue);
    }

    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<Arc<UnitDescriptor>> {
        self.units.get(qualified_name).cloned()
    }

    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    /// Loaded modules, ordered by name.
    #[must_use]
    pub fn modules(&self) -> Vec<&ModuleEntry> {
        self.modules.values().collect()
    }

    /// Every unit: modules by name, units within a module by display order.
    #[must_use]
    pub fn units(&self) -> Vec<Arc<UnitDescriptor>> {
        self.modules
            .values()
            .flat_map(|module| module.units.iter())
            .filter_map(|name| self.units.get(name).cloned())
            .collect()
    }

    /// Units of one module in display order; empty if the module is unknown.
    #[must_use]
    pub fn units_in(&self, module: &str) -> Vec<Arc<UnitDescriptor>> {
        self.modules
            .get(module)
            .map(|entry| {
                entry
                    .units
                    .iter()
                    .filter_map(|name| self.units.get(name).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
