//! Job runner configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

const fn default_max_workers() -> usize {
    4
}

/// Upper bound for `default_timeout_secs`: one week.
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

const fn default_timeout_secs() -> u64 {
    300
}

const fn default_hard_cutoff_grace_ms() -> u64 {
    250
}

/// What to do with a submission when every worker is busy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePolicy {
    /// Wait (FIFO) for a free worker.
    #[default]
    Queue,
    /// Refuse the submission immediately.
    Reject,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Maximum number of units executing at once.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    #[serde(default)]
    pub queue_policy: QueuePolicy,

    /// Timeout for units that do not declare their own.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Extra time granted past the deadline before a run is cut off without
    /// waiting for the current sub-check to return.
    #[serde(default = "default_hard_cutoff_grace_ms")]
    pub hard_cutoff_grace_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            queue_policy: QueuePolicy::default(),
            default_timeout_secs: default_timeout_secs(),
            hard_cutoff_grace_ms: default_hard_cutoff_grace_ms(),
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    #[must_use]
    pub const fn hard_cutoff_grace(&self) -> Duration {
        Duration::from_millis(self.hard_cutoff_grace_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runner.max_workers".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.default_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runner.default_timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.default_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "runner.default_timeout_secs".into(),
                reason: format!("must be at most {MAX_TIMEOUT_SECS}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RunnerConfig::default();
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.queue_policy, QueuePolicy::Queue);
        assert_eq!(config.default_timeout(), Duration::from_secs(300));
        assert_eq!(config.hard_cutoff_grace(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let config = RunnerConfig {
            max_workers: 0,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "runner.max_workers"
        ));
    }

    #[test]
    fn oversized_default_timeout_is_invalid() {
        let config = RunnerConfig {
            default_timeout_secs: u64::MAX,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "runner.default_timeout_secs"
        ));

        let at_limit = RunnerConfig {
            default_timeout_secs: MAX_TIMEOUT_SECS,
            ..RunnerConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }
}
