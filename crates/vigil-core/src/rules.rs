//! Declarative rule definitions.
//!
//! A rule is the body of a sub-check written as data inside a unit module
//! file. The engine's built-in rule unit evaluates these against the
//! read-only data source; this module only defines their shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::LogLevel;

/// Default level for objects that violate a rule.
const fn default_violation_level() -> LogLevel {
    LogLevel::Failure
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Every object of `object_type` must carry a non-null `field`.
    RequireField {
        object_type: String,
        field: String,
        #[serde(default = "default_violation_level")]
        level: LogLevel,
    },
    /// No two objects of `object_type` may share a value for `field`.
    UniqueField { object_type: String, field: String },
    /// `field` must hold one of `values`.
    AllowedValues {
        object_type: String,
        field: String,
        values: Vec<Value>,
    },
    /// `field` must hold the id of an existing `target_type` object.
    ReferenceExists {
        object_type: String,
        field: String,
        target_type: String,
    },
    /// At least `min` objects of `object_type` must exist.
    MinCount { object_type: String, min: usize },
}

impl Rule {
    /// The object type this rule inspects.
    #[must_use]
    pub fn object_type(&self) -> &str {
        match self {
            Self::RequireField { object_type, .. }
            | Self::UniqueField { object_type, .. }
            | Self::AllowedValues { object_type, .. }
            | Self::ReferenceExists { object_type, .. }
            | Self::MinCount { object_type, .. } => object_type,
        }
    }

    /// Check the rule's own parameters for obvious mistakes.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when a parameter is empty or a
    /// violation level would never be reported.
    pub fn validate(&self) -> Result<(), String> {
        if self.object_type().trim().is_empty() {
            return Err("object_type must not be empty".to_string());
        }
        match self {
            Self::RequireField { field, level, .. } => {
                if field.trim().is_empty() {
                    return Err("field must not be empty".to_string());
                }
                if matches!(level, LogLevel::Success | LogLevel::Default) {
                    return Err(format!("violation level '{level}' would hide violations"));
                }
            }
            Self::UniqueField { field, .. } => {
                if field.trim().is_empty() {
                    return Err("field must not be empty".to_string());
                }
            }
            Self::AllowedValues { field, values, .. } => {
                if field.trim().is_empty() {
                    return Err("field must not be empty".to_string());
                }
                if values.is_empty() {
                    return Err("values must list at least one allowed value".to_string());
                }
            }
            Self::ReferenceExists {
                field, target_type, ..
            } => {
                if field.trim().is_empty() || target_type.trim().is_empty() {
                    return Err("field and target_type must not be empty".to_string());
                }
            }
            Self::MinCount { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_require_field_with_default_level() {
        let rule: Rule = serde_json::from_value(serde_json::json!({
            "kind": "require_field",
            "object_type": "dcim.device",
            "field": "serial",
        }))
        .unwrap();
        assert_eq!(
            rule,
            Rule::RequireField {
                object_type: "dcim.device".into(),
                field: "serial".into(),
                level: LogLevel::Failure,
            }
        );
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_kind() {
        let parsed: Result<Rule, _> = serde_json::from_value(serde_json::json!({
            "kind": "regex_match",
            "object_type": "dcim.device",
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_success_violation_level() {
        let rule = Rule::RequireField {
            object_type: "dcim.device".into(),
            field: "serial".into(),
            level: LogLevel::Success,
        };
        assert!(rule.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_allowed_values() {
        let rule = Rule::AllowedValues {
            object_type: "dcim.device".into(),
            field: "status".into(),
            values: vec![],
        };
        assert!(rule.validate().is_err());
    }
}
