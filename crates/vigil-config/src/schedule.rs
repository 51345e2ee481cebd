//! Periodic run schedules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Qualified name of the unit to submit.
    pub unit: String,
    /// Interval between submissions.
    pub every_secs: u64,
}

impl ScheduleConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.every_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.every_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: format!("schedules[{}].every_secs", self.unit),
                reason: "must be at least 1".into(),
            });
        }
        if self.unit.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "schedules.unit".into(),
                reason: "must name a unit".into(),
            });
        }
        Ok(())
    }
}
