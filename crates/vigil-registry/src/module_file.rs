//! Unit module file format.
//!
//! ```toml
//! report_order = ["CablingReport"]
//!
//! [[unit]]
//! name = "CablingReport"
//! description = "Every cable must terminate on both ends."
//! timeout_secs = 60
//!
//! [[unit.check]]
//! name = "test_b_side"
//! [unit.check.rule]
//! kind = "reference_exists"
//! object_type = "dcim.cable"
//! field = "termination_b"
//! target_type = "dcim.interface"
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use vigil_core::entities::{Implementation, MAX_TIMEOUT_SECS, SubCheckSpec, UnitDescriptor};
use vigil_core::names::{self, RESERVED_CHECK_NAMES};
use vigil_core::rules::Rule;

use crate::error::DiscoveryError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleFile {
    #[serde(default)]
    report_order: Vec<String>,
    #[serde(default)]
    unit: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    name: String,
    #[serde(default)]
    description: String,
    timeout_secs: Option<u64>,
    implementation: Option<String>,
    #[serde(default)]
    check: Vec<CheckEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckEntry {
    name: String,
    rule: Option<Rule>,
}

/// Parse one module file into descriptors sorted by display order.
///
/// # Errors
///
/// Returns [`DiscoveryError::Parse`] for TOML or schema errors and
/// [`DiscoveryError::Invalid`] for semantic problems (bad or duplicate names,
/// zero timeouts, declarative checks without a rule).
pub fn parse_module(
    module: &str,
    source: &Path,
    text: &str,
) -> Result<Vec<UnitDescriptor>, DiscoveryError> {
    let file: ModuleFile = toml::from_str(text).map_err(|e| DiscoveryError::Parse {
        path: source.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let invalid = |reason: String| DiscoveryError::Invalid {
        path: source.to_path_buf(),
        reason,
    };

    let mut seen_units = HashSet::new();
    let mut units = Vec::with_capacity(file.unit.len());
    for entry in file.unit {
        if !names::is_identifier(&entry.name) {
            return Err(invalid(format!("'{}' is not a valid unit name", entry.name)));
        }
        if !seen_units.insert(entry.name.clone()) {
            return Err(invalid(format!("unit '{}' is declared twice", entry.name)));
        }
        match entry.timeout_secs {
            Some(0) => {
                return Err(invalid(format!("unit '{}' has a zero timeout", entry.name)));
            }
            Some(secs) if secs > MAX_TIMEOUT_SECS => {
                return Err(invalid(format!(
                    "unit '{}' timeout of {secs}s exceeds the {MAX_TIMEOUT_SECS}s limit",
                    entry.name
                )));
            }
            _ => {}
        }

        let implementation = match entry.implementation {
            Some(key) if key.trim().is_empty() => {
                return Err(invalid(format!(
                    "unit '{}' has an empty implementation key",
                    entry.name
                )));
            }
            Some(key) => Implementation::Native(key),
            None => Implementation::Rules,
        };

        let checks = parse_checks(&entry.name, entry.check, &implementation).map_err(invalid)?;
        let display_order = file
            .report_order
            .iter()
            .position(|name| *name == entry.name)
            .and_then(|rank| u32::try_from(rank).ok());

        units.push(UnitDescriptor {
            qualified_name: names::qualify(module, &entry.name),
            module: module.to_string(),
            name: entry.name,
            description: entry.description,
            timeout_secs: entry.timeout_secs,
            display_order,
            implementation,
            checks,
            source: source.to_path_buf(),
        });
    }

    for name in &file.report_order {
        if !seen_units.contains(name) {
            tracing::warn!(
                module,
                unit = %name,
                "report_order names a unit that is not declared; ignoring"
            );
        }
    }

    sort_for_display(&mut units);
    Ok(units)
}

fn parse_checks(
    unit: &str,
    entries: Vec<CheckEntry>,
    implementation: &Implementation,
) -> Result<Vec<SubCheckSpec>, String> {
    let mut seen = HashSet::new();
    let mut checks = Vec::with_capacity(entries.len());
    for entry in entries {
        if !names::is_identifier(&entry.name) {
            return Err(format!(
                "'{}' in unit '{unit}' is not a valid check name",
                entry.name
            ));
        }
        if RESERVED_CHECK_NAMES.contains(&entry.name.as_str()) {
            return Err(format!(
                "'{}' in unit '{unit}' is a reserved name",
                entry.name
            ));
        }
        if !seen.insert(entry.name.clone()) {
            return Err(format!(
                "check '{}' is declared twice in unit '{unit}'",
                entry.name
            ));
        }
        match (&entry.rule, implementation) {
            (None, Implementation::Rules) => {
                return Err(format!(
                    "check '{}' in unit '{unit}' needs a rule (or the unit an implementation)",
                    entry.name
                ));
            }
            (Some(rule), _) => rule
                .validate()
                .map_err(|reason| format!("check '{}' in unit '{unit}': {reason}", entry.name))?,
            (None, Implementation::Native(_)) => {}
        }
        checks.push(SubCheckSpec {
            name: entry.name,
            rule: entry.rule,
        });
    }
    Ok(checks)
}

/// Units with a declared rank come first (ascending), the rest follow in
/// lexicographic order of their names.
pub fn sort_for_display(units: &mut [UnitDescriptor]) {
    units.sort_by(|a, b| match (a.display_order, b.display_order) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}
