//! Qualified name helpers.
//!
//! A check unit is addressed as `<module>.<unit>`. Module names may themselves
//! contain dots (`net.cabling`), unit names never do, so the split is always on
//! the last dot.

use crate::errors::CoreError;

/// Label under which the pre-run hook's records are tallied.
pub const PRE_RUN: &str = "pre_run";

/// Label under which the post-run hook's records are tallied.
pub const POST_RUN: &str = "post_run";

/// Label used when a unit cannot be resolved to an implementation.
pub const LOAD: &str = "load";

/// Sub-check names reserved for lifecycle bookkeeping.
pub const RESERVED_CHECK_NAMES: &[&str] = &[PRE_RUN, POST_RUN, LOAD];

/// Whether `name` is a plain identifier: `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `module` is a dot-separated sequence of identifiers.
#[must_use]
pub fn is_module_name(module: &str) -> bool {
    !module.is_empty() && module.split('.').all(is_identifier)
}

/// Join a module and unit name into a qualified name.
#[must_use]
pub fn qualify(module: &str, unit: &str) -> String {
    format!("{module}.{unit}")
}

/// Split a qualified name into `(module, unit)`.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] if the name has no dot or either part is
/// not a valid identifier path.
pub fn split(qualified: &str) -> Result<(&str, &str), CoreError> {
    let (module, unit) = qualified.rsplit_once('.').ok_or_else(|| {
        CoreError::Validation(format!(
            "'{qualified}' is not a qualified name (expected <module>.<unit>)"
        ))
    })?;
    if !is_module_name(module) || !is_identifier(unit) {
        return Err(CoreError::Validation(format!(
            "'{qualified}' is not a valid qualified name"
        )));
    }
    Ok((module, unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CablingReport", true)]
    #[case("_private", true)]
    #[case("test_a1", true)]
    #[case("", false)]
    #[case("1abc", false)]
    #[case("has-dash", false)]
    #[case("has.dot", false)]
    fn identifiers(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(name), expected);
    }

    #[test]
    fn split_uses_last_dot() {
        assert_eq!(
            split("net.cabling.CablingReport").unwrap(),
            ("net.cabling", "CablingReport")
        );
        assert_eq!(split("net.CablingReport").unwrap(), ("net", "CablingReport"));
    }

    #[rstest]
    #[case("CablingReport")]
    #[case(".CablingReport")]
    #[case("net.")]
    #[case("net..Report")]
    fn split_rejects_malformed(#[case] name: &str) {
        assert!(split(name).is_err());
    }

    #[test]
    fn qualify_roundtrips_with_split() {
        let name = qualify("dcim", "DeviceReport");
        assert_eq!(split(&name).unwrap(), ("dcim", "DeviceReport"));
    }
}
