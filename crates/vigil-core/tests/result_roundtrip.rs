//! Serde roundtrip and JsonSchema validation tests for persisted result types.

use chrono::Utc;
use schemars::schema_for;
use vigil_core::entities::*;
use vigil_core::enums::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn record(check: &str, level: LogLevel, message: Option<&str>) -> LogRecord {
    LogRecord {
        check: check.into(),
        level,
        subject: Some(ObjectRef::new("dcim.cable", "7").with_display("cable-7")),
        message: message.map(str::to_string),
        timestamp: Utc::now(),
    }
}

roundtrip_and_validate!(
    failed_result_roundtrip,
    RunResult,
    RunResult {
        run_id: 42,
        qualified_name: "net.CablingReport".into(),
        outcome: Outcome::Failed,
        checks: vec![
            CheckTally {
                name: "test_a".into(),
                tally: Tally {
                    success: 1,
                    ..Tally::default()
                },
            },
            CheckTally {
                name: "test_b".into(),
                tally: Tally {
                    failure: 1,
                    ..Tally::default()
                },
            },
        ],
        records: vec![
            record("test_a", LogLevel::Success, None),
            record("test_b", LogLevel::Failure, Some("missing link")),
        ],
        started_at: Utc::now(),
        finished_at: Utc::now(),
        duration_ms: 12,
    }
);

roundtrip_and_validate!(
    empty_result_roundtrip,
    RunResult,
    RunResult {
        run_id: 1,
        qualified_name: "dcim.Empty".into(),
        outcome: Outcome::Passed,
        checks: vec![],
        records: vec![],
        started_at: Utc::now(),
        finished_at: Utc::now(),
        duration_ms: 0,
    }
);

roundtrip_and_validate!(
    neutral_record_roundtrip,
    LogRecord,
    LogRecord {
        check: "test_a".into(),
        level: LogLevel::Default,
        subject: None,
        message: Some("annotation".into()),
        timestamp: Utc::now(),
    }
);

#[test]
fn totals_sum_all_checks() {
    let result = RunResult {
        run_id: 3,
        qualified_name: "net.CablingReport".into(),
        outcome: Outcome::Failed,
        checks: vec![
            CheckTally {
                name: "test_a".into(),
                tally: Tally {
                    success: 2,
                    info: 1,
                    ..Tally::default()
                },
            },
            CheckTally {
                name: "test_b".into(),
                tally: Tally {
                    warning: 1,
                    failure: 3,
                    ..Tally::default()
                },
            },
        ],
        records: vec![record("test_b", LogLevel::Failure, Some("missing link"))],
        started_at: Utc::now(),
        finished_at: Utc::now(),
        duration_ms: 5,
    };

    let totals = result.totals();
    assert_eq!(totals.success, 2);
    assert_eq!(totals.info, 1);
    assert_eq!(totals.warning, 1);
    assert_eq!(totals.failure, 3);
    assert_eq!(result.records_for("test_b").count(), 1);
    assert_eq!(result.records_at(LogLevel::Failure).count(), 1);
    assert!(result.check("test_c").is_none());
}
