use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::LogLevel;

/// Opaque reference to an inspected object.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub object_type: String,
    pub id: String,
    pub display: Option<String>,
}

impl ObjectRef {
    #[must_use]
    pub fn new(object_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            id: id.into(),
            display: None,
        }
    }

    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Human-readable label: the display name if known, else `type:id`.
    #[must_use]
    pub fn label(&self) -> String {
        self.display
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.object_type, self.id))
    }
}

/// One timestamped observation emitted by a sub-check. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LogRecord {
    pub check: String,
    pub level: LogLevel,
    pub subject: Option<ObjectRef>,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}
