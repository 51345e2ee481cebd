//! Directory scan producing a [`Catalog`].
//!
//! Every `*.toml` file beneath the root is one module, named by its relative
//! path with separators replaced by dots. Hidden entries and the reserved
//! namespace marker are skipped. A file whose path does not map back from its
//! module name (a `.` inside a file or directory name) is reported, never
//! loaded. Files are visited in sorted order so two scans of an unchanged
//! tree produce identical catalogs.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use vigil_core::names;

use crate::catalog::{Catalog, ScanIssue};
use crate::error::DiscoveryError;
use crate::module_file::parse_module;

/// Reserved file marking a directory as a unit namespace. Never a module.
pub const NAMESPACE_MARKER: &str = "_namespace.toml";

const MODULE_EXTENSION: &str = "toml";

/// Scan the whole root.
///
/// # Errors
///
/// Returns [`DiscoveryError::RootUnreadable`] if `root` cannot be listed.
/// Malformed module files do not fail the scan; they are reported in
/// [`Catalog::issues`].
pub fn scan(root: &Path) -> Result<Catalog, DiscoveryError> {
    ensure_readable(root)?;

    let mut catalog = Catalog::default();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let error = DiscoveryError::Walk(error.to_string());
                tracing::warn!(%error, "skipping unreadable entry");
                catalog.push_issue(ScanIssue::new(root, &error));
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(module) = module_name(root, path) else {
            continue;
        };
        if module_path(root, &module) != path {
            let error = DiscoveryError::Invalid {
                path: path.to_path_buf(),
                reason: format!(
                    "module '{module}' would be addressed as {}; dots are not allowed in module file or directory names",
                    module_path(root, &module).display()
                ),
            };
            tracing::warn!(path = %path.display(), %error, "skipping unaddressable module file");
            catalog.push_issue(ScanIssue::new(path, &error));
            continue;
        }
        load_into(&mut catalog, &module, path);
    }

    tracing::debug!(
        root = %root.display(),
        modules = catalog.modules().len(),
        units = catalog.len(),
        issues = catalog.issues().len(),
        "scan complete"
    );
    Ok(catalog)
}

/// Scan only the named modules.
///
/// # Errors
///
/// Returns [`DiscoveryError::RootUnreadable`] if `root` cannot be listed and
/// [`DiscoveryError::UnknownModule`] if a module has no file beneath it.
pub fn scan_modules(root: &Path, modules: &[String]) -> Result<Catalog, DiscoveryError> {
    ensure_readable(root)?;

    let mut catalog = Catalog::default();
    for module in modules {
        let path = module_path(root, module);
        if !names::is_module_name(module) || !path.is_file() {
            return Err(DiscoveryError::UnknownModule {
                module: module.clone(),
            });
        }
        if catalog.module(module).is_some() {
            continue;
        }
        load_into(&mut catalog, module, &path);
    }
    Ok(catalog)
}

/// Path a module name maps to beneath `root`.
#[must_use]
pub fn module_path(root: &Path, module: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in module.split('.') {
        path.push(part);
    }
    path.set_extension(MODULE_EXTENSION);
    path
}

/// Module name for a file beneath `root`, or `None` if the file is not a module.
#[must_use]
pub fn module_name(root: &Path, path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(MODULE_EXTENSION) {
        return None;
    }
    if path.file_name().and_then(|name| name.to_str()) == Some(NAMESPACE_MARKER) {
        return None;
    }
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("."))
}

fn ensure_readable(root: &Path) -> Result<(), DiscoveryError> {
    std::fs::read_dir(root)
        .map(drop)
        .map_err(|source| DiscoveryError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })
}

fn load_into(catalog: &mut Catalog, module: &str, path: &Path) {
    match load_module(module, path) {
        Ok(units) => catalog.insert_module(module, path, units),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "skipping malformed unit module");
            catalog.push_issue(ScanIssue::new(path, &error));
        }
    }
}

fn load_module(
    module: &str,
    path: &Path,
) -> Result<Vec<vigil_core::entities::UnitDescriptor>, DiscoveryError> {
    if !names::is_module_name(module) {
        return Err(DiscoveryError::Invalid {
            path: path.to_path_buf(),
            reason: format!("'{module}' is not a valid module name"),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_module(module, path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("checks/net.toml", Some("net"))]
    #[case("checks/net/cabling.toml", Some("net.cabling"))]
    #[case("checks/_namespace.toml", None)]
    #[case("checks/net/_namespace.toml", None)]
    #[case("checks/README.md", None)]
    fn module_names(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            module_name(Path::new("checks"), Path::new(path)).as_deref(),
            expected
        );
    }

    #[test]
    fn module_path_maps_dots_to_dirs() {
        assert_eq!(
            module_path(Path::new("checks"), "net.cabling"),
            PathBuf::from("checks/net/cabling.toml")
        );
    }

    #[test]
    fn missing_root_is_unreadable() {
        let err = scan(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DiscoveryError::RootUnreadable { .. }));
    }
}
