use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CheckTally, LogRecord, Tally};
use crate::enums::{LogLevel, Outcome};

/// Immutable snapshot of a finished run, as persisted by the result store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RunResult {
    pub run_id: u64,
    pub qualified_name: String,
    pub outcome: Outcome,
    pub checks: Vec<CheckTally>,
    pub records: Vec<LogRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunResult {
    /// Sum of all per-check tallies.
    #[must_use]
    pub fn totals(&self) -> Tally {
        self.checks.iter().fold(Tally::default(), |mut acc, check| {
            acc.success += check.tally.success;
            acc.info += check.tally.info;
            acc.warning += check.tally.warning;
            acc.failure += check.tally.failure;
            acc
        })
    }

    /// Tally for the named sub-check, if it was declared or logged.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckTally> {
        self.checks.iter().find(|check| check.name == name)
    }

    /// Records emitted by the named sub-check, in emission order.
    pub fn records_for<'a>(&'a self, check: &'a str) -> impl Iterator<Item = &'a LogRecord> {
        self.records.iter().filter(move |record| record.check == check)
    }

    /// Records at the given level, in emission order.
    pub fn records_at(&self, level: LogLevel) -> impl Iterator<Item = &LogRecord> {
        self.records.iter().filter(move |record| record.level == level)
    }
}
