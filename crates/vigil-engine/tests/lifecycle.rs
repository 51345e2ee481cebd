//! End-to-end runs through the engine with native and rules units.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use vigil_core::data::MemorySource;
use vigil_core::entities::{Implementation, ObjectRef, RunResult, SubCheckSpec, UnitDescriptor};
use vigil_core::enums::{LogLevel, Outcome};
use vigil_core::names;
use vigil_core::rules::Rule;
use vigil_engine::{Engine, Fault, FnUnit, UnitLoader};

fn descriptor(qualified: &str, key: Option<&str>, checks: &[&str]) -> Arc<UnitDescriptor> {
    let (module, name) = names::split(qualified).unwrap();
    Arc::new(UnitDescriptor {
        qualified_name: qualified.into(),
        module: module.into(),
        name: name.into(),
        description: String::new(),
        timeout_secs: None,
        display_order: None,
        implementation: key.map_or(Implementation::Rules, |key| Implementation::Native(key.into())),
        checks: checks
            .iter()
            .map(|name| SubCheckSpec {
                name: (*name).into(),
                rule: None,
            })
            .collect(),
        source: PathBuf::from("checks/test.toml"),
    })
}

fn engine(loader: UnitLoader) -> Engine {
    Engine::new(loader, Duration::from_secs(30))
}

#[test]
fn cabling_report_fails_with_ordered_records() {
    let mut loader = UnitLoader::new();
    loader.register(
        "net.cabling",
        FnUnit::new()
            .check("test_a", |ctx| {
                ctx.success(ObjectRef::new("dcim.cable", "1"), None);
                Ok(())
            })
            .check("test_b", |ctx| {
                ctx.failure(ObjectRef::new("dcim.cable", "2"), Some("missing link"));
                Ok(())
            }),
    );

    let result = engine(loader).run(
        1,
        descriptor("net.CablingReport", Some("net.cabling"), &["test_a", "test_b"]),
        &MemorySource::empty(),
    );

    assert_eq!(result.outcome, Outcome::Failed);
    let levels: Vec<LogLevel> = result.records.iter().map(|r| r.level).collect();
    assert_eq!(levels, [LogLevel::Success, LogLevel::Failure]);
    assert_eq!(result.records[1].message.as_deref(), Some("missing link"));
    assert_eq!(result.records[1].check, "test_b");
    let names: Vec<&str> = result.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["test_a", "test_b"]);
}

#[test]
fn fault_yields_errored_and_post_run_still_runs() {
    let post_ran = Arc::new(AtomicBool::new(false));
    let mut loader = UnitLoader::new();
    loader.register(
        "faulty",
        FnUnit::new()
            .check("test_only", |_ctx| Err(Fault::new("database exploded")))
            .post_run({
                let post_ran = Arc::clone(&post_ran);
                move |_ctx| {
                    post_ran.store(true, Ordering::SeqCst);
                    Ok(())
                }
            }),
    );

    let result = engine(loader).run(1, descriptor("net.Faulty", Some("faulty"), &["test_only"]), &MemorySource::empty());

    assert_eq!(result.outcome, Outcome::Errored);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].level, LogLevel::Failure);
    assert_eq!(result.records[0].check, "test_only");
    assert_eq!(result.records[0].message.as_deref(), Some("database exploded"));
    assert!(post_ran.load(Ordering::SeqCst));
}

#[test]
fn fault_does_not_stop_later_sub_checks() {
    let mut loader = UnitLoader::new();
    loader.register(
        "mixed",
        FnUnit::new()
            .check("test_a", |_ctx| panic!("index out of range"))
            .check("test_b", |ctx| {
                ctx.success(None, None);
                Ok(())
            }),
    );

    let result = engine(loader).run(1, descriptor("net.Mixed", Some("mixed"), &["test_a", "test_b"]), &MemorySource::empty());

    assert_eq!(result.outcome, Outcome::Errored);
    assert_eq!(result.check("test_b").unwrap().tally.success, 1);
    assert!(
        result.records[0]
            .message
            .as_deref()
            .unwrap()
            .contains("index out of range")
    );
}

#[test]
fn pre_run_fault_skips_every_sub_check() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut loader = UnitLoader::new();
    loader.register(
        "setup",
        FnUnit::new()
            .pre_run(|_ctx| Err(Fault::new("no credentials")))
            .check("test_a", {
                let calls = Arc::clone(&calls);
                move |_ctx| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
    );

    let result = engine(loader).run(1, descriptor("net.Setup", Some("setup"), &["test_a"]), &MemorySource::empty());

    assert_eq!(result.outcome, Outcome::Errored);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.records[0].check, names::PRE_RUN);
}

#[test]
fn post_run_fault_keeps_outcome() {
    let mut loader = UnitLoader::new();
    loader.register(
        "cleanup",
        FnUnit::new()
            .check("test_a", |ctx| {
                ctx.success(None, None);
                Ok(())
            })
            .post_run(|_ctx| Err(Fault::new("cleanup failed"))),
    );

    let result = engine(loader).run(1, descriptor("net.Cleanup", Some("cleanup"), &["test_a"]), &MemorySource::empty());

    assert_eq!(result.outcome, Outcome::Passed);
    assert_eq!(result.check(names::POST_RUN).unwrap().tally.failure, 1);
}

#[test]
fn unknown_implementation_finalizes_errored() {
    let result = engine(UnitLoader::new()).run(
        1,
        descriptor("net.Ghost", Some("not.registered"), &["test_a"]),
        &MemorySource::empty(),
    );

    assert_eq!(result.outcome, Outcome::Errored);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].check, names::LOAD);
    assert!(result.records[0].message.as_deref().unwrap().contains("not.registered"));
}

#[test]
fn neutral_log_does_not_change_outcome() {
    let mut loader = UnitLoader::new();
    loader.register(
        "quiet",
        FnUnit::new().check("test_a", |ctx| {
            ctx.log("looked at 0 cables");
            Ok(())
        }),
    );

    let result = engine(loader).run(1, descriptor("net.Quiet", Some("quiet"), &["test_a"]), &MemorySource::empty());

    assert_eq!(result.outcome, Outcome::Passed);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.totals().total(), 0);
}

#[test]
fn timeout_keeps_prefix_and_skips_remaining_checks() {
    let ran_b = Arc::new(AtomicBool::new(false));
    let mut loader = UnitLoader::new();
    loader.register(
        "slow",
        FnUnit::new()
            .check("test_a", |ctx| {
                ctx.success(None, Some("first"));
                while !ctx.should_stop() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                ctx.success(None, Some("too late"));
                Ok(())
            })
            .check("test_b", {
                let ran_b = Arc::clone(&ran_b);
                move |_ctx| {
                    ran_b.store(true, Ordering::SeqCst);
                    Ok(())
                }
            }),
    );

    let engine = Engine::new(loader, Duration::from_millis(100));
    let result = engine.run(1, descriptor("net.Slow", Some("slow"), &["test_a", "test_b"]), &MemorySource::empty());

    assert_eq!(result.outcome, Outcome::TimedOut);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].message.as_deref(), Some("first"));
    assert!(!ran_b.load(Ordering::SeqCst));
}

#[test]
fn longer_timeout_extends_the_same_record_prefix() {
    let mut loader = UnitLoader::new();
    loader.register(
        "steady",
        FnUnit::new()
            .check("test_a", |ctx| {
                ctx.success(None, Some("a1"));
                ctx.info(None, Some("a2"));
                Ok(())
            })
            .check("test_b", |ctx| {
                ctx.warning(None, Some("b1"));
                for _ in 0..30 {
                    if ctx.should_stop() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(5));
                }
                ctx.success(None, Some("b2"));
                Ok(())
            })
            .check("test_c", |ctx| {
                ctx.success(None, Some("c1"));
                Ok(())
            }),
    );
    let unit = descriptor("net.Steady", Some("steady"), &["test_a", "test_b", "test_c"]);
    let keys = |result: &RunResult| {
        result
            .records
            .iter()
            .map(|r| (r.check.clone(), r.level, r.message.clone()))
            .collect::<Vec<_>>()
    };

    let short = Engine::new(loader.clone(), Duration::from_millis(50)).run(1, Arc::clone(&unit), &MemorySource::empty());
    let long = Engine::new(loader, Duration::from_secs(30)).run(2, unit, &MemorySource::empty());

    assert_eq!(short.outcome, Outcome::TimedOut);
    assert_eq!(long.outcome, Outcome::Passed);
    let (short_keys, long_keys) = (keys(&short), keys(&long));
    assert!(short_keys.len() < long_keys.len());
    assert_eq!(&long_keys[..short_keys.len()], &short_keys[..]);
    assert_eq!(long_keys.len(), 5);
}

#[test]
fn cancel_before_start_stops_at_first_checkpoint() {
    let mut loader = UnitLoader::new();
    loader.register(
        "cancellable",
        FnUnit::new().check("test_a", |ctx| {
            ctx.success(None, None);
            Ok(())
        }),
    );
    let engine = engine(loader);
    let execution = engine.prepare(7, descriptor("net.Cancel", Some("cancellable"), &["test_a"]));
    execution.cancel.cancel();

    let result = engine.execute(&execution, &MemorySource::empty());
    assert_eq!(result.outcome, Outcome::Cancelled);
    assert_eq!(result.run_id, 7);
    assert!(result.records.is_empty());
}

#[test]
fn rules_unit_runs_against_snapshot() {
    let data = MemorySource::from_value(json!({
        "dcim.cable": [
            { "id": 1, "label": "c1", "termination_b": 7 },
            { "id": 2, "label": "c2" }
        ],
        "dcim.interface": [ { "id": 7, "name": "eth0" } ]
    }))
    .unwrap();
    let mut desc = (*descriptor("net.CablingRules", None, &[])).clone();
    desc.checks = vec![SubCheckSpec {
        name: "test_terminated".into(),
        rule: Some(Rule::ReferenceExists {
            object_type: "dcim.cable".into(),
            field: "termination_b".into(),
            target_type: "dcim.interface".into(),
        }),
    }];

    let result = engine(UnitLoader::new()).run(1, Arc::new(desc), &data);

    assert_eq!(result.outcome, Outcome::Failed);
    let tally = result.check("test_terminated").unwrap().tally;
    assert_eq!((tally.success, tally.failure), (1, 1));
    assert_eq!(result.records[1].message.as_deref(), Some("missing link"));
}
