use serde::Serialize;
use vigil_core::entities::{LogRecord, RunResult};
use vigil_core::enums::Outcome;

use crate::output::TableRow;

/// One line per finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub unit: String,
    pub run_id: u64,
    pub outcome: Outcome,
    pub success: u32,
    pub info: u32,
    pub warning: u32,
    pub failure: u32,
    pub duration_ms: u64,
}

impl From<&RunResult> for RunSummary {
    fn from(result: &RunResult) -> Self {
        let totals = result.totals();
        Self {
            unit: result.qualified_name.clone(),
            run_id: result.run_id,
            outcome: result.outcome,
            success: totals.success,
            info: totals.info,
            warning: totals.warning,
            failure: totals.failure,
            duration_ms: result.duration_ms,
        }
    }
}

impl TableRow for RunSummary {
    fn headers() -> &'static [&'static str] {
        &["unit", "run", "outcome", "success", "info", "warning", "failure", "ms"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.unit.clone(),
            self.run_id.to_string(),
            self.outcome.to_string(),
            self.success.to_string(),
            self.info.to_string(),
            self.warning.to_string(),
            self.failure.to_string(),
            self.duration_ms.to_string(),
        ]
    }
}

/// One line per log record of a result.
#[derive(Debug, Clone, Serialize)]
pub struct RecordRow {
    pub time: String,
    pub check: String,
    pub level: String,
    pub subject: String,
    pub message: String,
}

impl From<&LogRecord> for RecordRow {
    fn from(record: &LogRecord) -> Self {
        Self {
            time: record.timestamp.format("%H:%M:%S%.3f").to_string(),
            check: record.check.clone(),
            level: record.level.to_string(),
            subject: record
                .subject
                .as_ref()
                .map(vigil_core::entities::ObjectRef::label)
                .unwrap_or_default(),
            message: record.message.clone().unwrap_or_default(),
        }
    }
}

impl TableRow for RecordRow {
    fn headers() -> &'static [&'static str] {
        &["time", "check", "level", "subject", "message"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.time.clone(),
            self.check.clone(),
            self.level.clone(),
            self.subject.clone(),
            self.message.clone(),
        ]
    }
}
