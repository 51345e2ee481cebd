//! Unit source and data snapshot locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_root() -> PathBuf {
    PathBuf::from("checks")
}

fn default_snapshot() -> PathBuf {
    PathBuf::from("data.json")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChecksConfig {
    /// Root directory scanned for unit module files.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// JSON snapshot backing the read-only data source.
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
        }
    }
}
