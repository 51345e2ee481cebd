use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::LogLevel;

/// Per-level record counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Tally {
    pub success: u32,
    pub info: u32,
    pub warning: u32,
    pub failure: u32,
}

impl Tally {
    /// Count one record at `level`. Neutral (`default`) records are ignored.
    pub const fn count(&mut self, level: LogLevel) {
        match level {
            LogLevel::Default => {}
            LogLevel::Success => self.success += 1,
            LogLevel::Info => self.info += 1,
            LogLevel::Warning => self.warning += 1,
            LogLevel::Failure => self.failure += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.success + self.info + self.warning + self.failure
    }

    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failure > 0
    }
}

/// Tally for one named sub-check (or lifecycle hook).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CheckTally {
    pub name: String,
    #[serde(flatten)]
    pub tally: Tally,
}

impl CheckTally {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tally: Tally::default(),
        }
    }
}
