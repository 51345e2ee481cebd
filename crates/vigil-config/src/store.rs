//! Result store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_dir() -> PathBuf {
    PathBuf::from(".vigil/results")
}

const fn default_history_limit() -> usize {
    10
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Results live only as long as the process.
    Memory,
    /// Results are written as JSON files under `dir`.
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Results retained per unit besides the latest one. `0` disables history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            dir: default_dir(),
            history_limit: default_history_limit(),
        }
    }
}
