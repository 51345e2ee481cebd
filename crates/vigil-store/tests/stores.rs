//! Behaviour shared by both result store backends.

use std::sync::Arc;
use std::thread;

use chrono::Utc;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;
use vigil_config::{StoreBackend, StoreConfig};
use vigil_core::entities::{CheckTally, LogRecord, RunResult};
use vigil_core::enums::{LogLevel, Outcome};
use vigil_store::{FileResultStore, MemoryResultStore, ResultStore, StoreError, open_store};

fn result(name: &str, run_id: u64, outcome: Outcome) -> RunResult {
    let now = Utc::now();
    let mut check = CheckTally::new("test_a");
    check.tally.count(LogLevel::Success);
    RunResult {
        run_id,
        qualified_name: name.into(),
        outcome,
        checks: vec![check],
        records: vec![LogRecord {
            check: "test_a".into(),
            level: LogLevel::Success,
            subject: None,
            message: Some(format!("run {run_id}")),
            timestamp: now,
        }],
        started_at: now,
        finished_at: now,
        duration_ms: 3,
    }
}

#[derive(Debug, Clone, Copy)]
enum Backend {
    Memory,
    File,
}

fn store(backend: Backend, history_limit: usize) -> (Arc<dyn ResultStore>, Option<TempDir>) {
    match backend {
        Backend::Memory => (Arc::new(MemoryResultStore::new(history_limit)), None),
        Backend::File => {
            let dir = tempfile::tempdir().unwrap();
            let store = FileResultStore::open(dir.path(), history_limit).unwrap();
            (Arc::new(store), Some(dir))
        }
    }
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::File)]
fn get_returns_exact_latest_result(#[case] backend: Backend) {
    let (store, _dir) = store(backend, 5);
    assert!(store.get("net.CablingReport").unwrap().is_none());

    let first = result("net.CablingReport", 1, Outcome::Passed);
    let second = result("net.CablingReport", 2, Outcome::Failed);
    store.put(&first).unwrap();
    store.put(&second).unwrap();

    assert_eq!(store.get("net.CablingReport").unwrap(), Some(second));
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::File)]
fn history_is_bounded_and_oldest_first(#[case] backend: Backend) {
    let (store, _dir) = store(backend, 2);
    for run_id in 1..=4 {
        store
            .put(&result("net.CablingReport", run_id, Outcome::Passed))
            .unwrap();
    }
    let ids: Vec<u64> = store
        .history("net.CablingReport")
        .unwrap()
        .iter()
        .map(|r| r.run_id)
        .collect();
    assert_eq!(ids, [3, 4]);
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::File)]
fn zero_history_limit_keeps_only_latest(#[case] backend: Backend) {
    let (store, _dir) = store(backend, 0);
    store
        .put(&result("net.CablingReport", 1, Outcome::Passed))
        .unwrap();
    assert!(store.history("net.CablingReport").unwrap().is_empty());
    assert!(store.get("net.CablingReport").unwrap().is_some());
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::File)]
fn delete_and_names(#[case] backend: Backend) {
    let (store, _dir) = store(backend, 3);
    store.put(&result("net.PowerReport", 1, Outcome::Passed)).unwrap();
    store
        .put(&result("dcim.sites.SiteReport", 1, Outcome::Failed))
        .unwrap();

    assert_eq!(
        store.names().unwrap(),
        ["dcim.sites.SiteReport", "net.PowerReport"]
    );
    assert!(store.delete("net.PowerReport").unwrap());
    assert!(!store.delete("net.PowerReport").unwrap());
    assert!(store.get("net.PowerReport").unwrap().is_none());
    assert_eq!(store.names().unwrap(), ["dcim.sites.SiteReport"]);
}

#[rstest]
#[case(Backend::Memory)]
#[case(Backend::File)]
fn rejects_names_that_are_not_qualified(#[case] backend: Backend) {
    let (store, _dir) = store(backend, 3);
    let err = store
        .put(&result("../escape", 1, Outcome::Passed))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(name) if name == "../escape"));
}

#[rstest]
#[case(Backend::Memory, "nodot")]
#[case(Backend::Memory, "../escape")]
#[case(Backend::File, "nodot")]
#[case(Backend::File, "../escape")]
fn reads_and_deletes_reject_unqualified_names(#[case] backend: Backend, #[case] name: &str) {
    let (store, _dir) = store(backend, 3);
    store.put(&result("net.PowerReport", 1, Outcome::Passed)).unwrap();

    assert!(matches!(store.get(name), Err(StoreError::InvalidName(n)) if n == name));
    assert!(matches!(store.history(name), Err(StoreError::InvalidName(n)) if n == name));
    assert!(matches!(store.delete(name), Err(StoreError::InvalidName(n)) if n == name));
    assert_eq!(store.names().unwrap(), ["net.PowerReport"]);
}

#[test]
fn readers_never_see_partial_results() {
    let (store, _dir) = store(Backend::File, 0);
    store
        .put(&result("net.CablingReport", 0, Outcome::Passed))
        .unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for run_id in 1..50 {
                store
                    .put(&result("net.CablingReport", run_id, Outcome::Passed))
                    .unwrap();
            }
        })
    };
    for _ in 0..200 {
        let seen = store.get("net.CablingReport").unwrap().unwrap();
        assert_eq!(seen.records[0].message, Some(format!("run {}", seen.run_id)));
    }
    writer.join().unwrap();
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        backend: StoreBackend::File,
        dir: dir.path().join("results"),
        history_limit: 3,
    };
    open_store(&config)
        .unwrap()
        .put(&result("net.CablingReport", 9, Outcome::Errored))
        .unwrap();

    let reopened = open_store(&config).unwrap();
    let latest = reopened.get("net.CablingReport").unwrap().unwrap();
    assert_eq!(latest.run_id, 9);
    assert_eq!(latest.outcome, Outcome::Errored);
    assert_eq!(reopened.history("net.CablingReport").unwrap().len(), 1);
}

#[test]
fn corrupt_latest_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileResultStore::open(dir.path(), 0).unwrap();
    std::fs::write(dir.path().join("net.CablingReport.json"), "{ not json").unwrap();
    assert!(matches!(
        store.get("net.CablingReport"),
        Err(StoreError::Corrupt { .. })
    ));
}
