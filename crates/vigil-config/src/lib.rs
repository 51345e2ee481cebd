//! # vigil-config
//!
//! Layered configuration loading for vigil using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VIGIL_*` prefix, `__` as separator)
//! 2. An explicit config file, or project-level `vigil.toml`
//! 3. User-level `~/.config/vigil/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VIGIL_RUNNER__MAX_WORKERS` -> `runner.max_workers`,
//! `VIGIL_STORE__DIR` -> `store.dir`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use vigil_config::VigilConfig;
//!
//! let config = VigilConfig::load_with_dotenv().expect("config");
//! println!("checks root: {}", config.checks.root.display());
//! ```

mod checks;
mod error;
mod runner;
mod schedule;
mod store;

pub use checks::{ChecksConfig, DataConfig};
pub use error::ConfigError;
pub use runner::{MAX_TIMEOUT_SECS, QueuePolicy, RunnerConfig};
pub use schedule::ScheduleConfig;
pub use store::{StoreBackend, StoreConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "VIGIL_";

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "vigil.toml";

const SECTIONS: &[&str] = &["CHECKS", "DATA", "RUNNER", "STORE"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VigilConfig {
    #[serde(default)]
    pub checks: ChecksConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub schedules: Vec<ScheduleConfig>,
}

impl VigilConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `explicit` instead of the project-local
    /// `vigil.toml` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if `explicit` does not exist, and
    /// [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit.filter(|path| !path.is_file()) {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Explicit file, else project-local config
        match explicit {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
                if local_path.exists() {
                    figment = figment.merge(Toml::file(local_path));
                }
            }
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values the runtime cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runner.validate()?;
        for schedule in &self.schedules {
            schedule.validate()?;
        }
        Ok(())
    }

    /// Warnings for env keys that look like single-underscore section typos
    /// (`VIGIL_RUNNER_MAX_WORKERS` instead of `VIGIL_RUNNER__MAX_WORKERS`).
    pub fn env_warnings<I>(env: I) -> Vec<String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut warnings = Vec::new();
        for (key, _) in env {
            let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            for section in SECTIONS {
                let single = format!("{section}_");
                let double = format!("{section}__");
                if rest.starts_with(&single) && !rest.starts_with(&double) {
                    let field = &rest[single.len()..];
                    warnings.push(format!(
                        "{key} is ignored. Use double underscores (example: {ENV_PREFIX}{section}__{field})."
                    ));
                }
            }
        }
        warnings
    }

    /// Log [`Self::env_warnings`] for the current process environment.
    pub fn warn_misspelled_env() {
        for warning in Self::env_warnings(std::env::vars()) {
            tracing::warn!("{warning}");
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vigil").join("config.toml"))
    }
}
