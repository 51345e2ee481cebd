use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rules::Rule;

/// Longest timeout a unit or the runner default may declare: one week.
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// How a unit's sub-checks are executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum Implementation {
    /// Every sub-check carries a declarative [`Rule`] run by the built-in rule unit.
    Rules,
    /// Sub-checks are dispatched by name to a unit registered in the plugin
    /// catalog under this key.
    Native(String),
}

/// One named sub-check inside a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubCheckSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

/// Loadable description of a check unit, produced by discovery.
///
/// Descriptors are data only. Nothing here references live code; the engine
/// resolves [`Implementation`] to a runnable unit at the moment a run starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDescriptor {
    pub qualified_name: String,
    pub module: String,
    pub name: String,
    pub description: String,
    pub timeout_secs: Option<u64>,
    pub display_order: Option<u32>,
    pub implementation: Implementation,
    pub checks: Vec<SubCheckSpec>,
    pub source: PathBuf,
}

impl UnitDescriptor {
    /// Unit-declared timeout override, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Timeout that applies to a run: the unit's override, else `default`,
    /// capped at [`MAX_TIMEOUT_SECS`].
    #[must_use]
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout()
            .unwrap_or(default)
            .min(Duration::from_secs(MAX_TIMEOUT_SECS))
    }

    /// Sub-check names in execution order.
    pub fn check_names(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|check| check.name.as_str())
    }

    #[must_use]
    pub fn check(&self, name: &str) -> Option<&SubCheckSpec> {
        self.checks.iter().find(|check| check.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(timeout_secs: Option<u64>) -> UnitDescriptor {
        UnitDescriptor {
            qualified_name: "net.CablingReport".into(),
            module: "net".into(),
            name: "CablingReport".into(),
            description: String::new(),
            timeout_secs,
            display_order: None,
            implementation: Implementation::Native("net.cabling".into()),
            checks: vec![
                SubCheckSpec {
                    name: "test_a".into(),
                    rule: None,
                },
                SubCheckSpec {
                    name: "test_b".into(),
                    rule: None,
                },
            ],
            source: PathBuf::from("checks/net.toml"),
        }
    }

    #[test]
    fn effective_timeout_prefers_override() {
        let default = Duration::from_secs(300);
        assert_eq!(
            descriptor(Some(5)).effective_timeout(default),
            Duration::from_secs(5)
        );
        assert_eq!(descriptor(None).effective_timeout(default), default);
    }

    #[test]
    fn effective_timeout_is_capped() {
        assert_eq!(
            descriptor(Some(u64::MAX)).effective_timeout(Duration::from_secs(300)),
            Duration::from_secs(MAX_TIMEOUT_SECS)
        );
    }

    #[test]
    fn check_names_keep_declared_order() {
        let d = descriptor(None);
        let names: Vec<&str> = d.check_names().collect();
        assert_eq!(names, ["test_a", "test_b"]);
    }

    #[test]
    fn implementation_serializes_tagged() {
        let json = serde_json::to_value(Implementation::Native("net.cabling".into())).unwrap();
        assert_eq!(json["kind"], "native");
        assert_eq!(json["key"], "net.cabling");
        let rules = serde_json::to_value(Implementation::Rules).unwrap();
        assert_eq!(rules["kind"], "rules");
    }
}
