//! # vigil-registry
//!
//! Discovery of operator-authored check units.
//!
//! A checks root holds TOML module files; each module declares one or more
//! units with their ordered sub-checks. Scanning produces descriptors only:
//! no unit code is resolved or executed until a run starts.
//!
//! - [`scan`] / [`scan_modules`] walk the root and build a [`Catalog`]
//! - [`Registry`] owns the current catalog and swaps it atomically on rescan
//! - Malformed module files are skipped and reported as [`ScanIssue`]s

mod catalog;
mod error;
mod module_file;
mod registry;
mod scan;

pub use catalog::{Catalog, ModuleEntry, ScanIssue};
pub use error::DiscoveryError;
pub use module_file::{parse_module, sort_for_display};
pub use registry::Registry;
pub use scan::{NAMESPACE_MARKER, module_name, module_path, scan, scan_modules};
