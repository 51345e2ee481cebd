//! Per-run collection of log records and tallies.
//!
//! One [`ResultAggregator`] exists per run. Sub-check code writes to it
//! through a [`crate::CheckContext`]; the runner may seal it from another
//! thread when a run is cut off. All state sits behind a single mutex so a
//! snapshot taken at any moment is internally consistent.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use vigil_core::entities::{CheckTally, LogRecord, ObjectRef, RunResult};
use vigil_core::enums::{LogLevel, Outcome};
use vigil_core::names;

use crate::fault::Fault;

/// Identity and timing of one run, needed to build its [`RunResult`].
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub run_id: u64,
    pub qualified_name: String,
    pub started_at: DateTime<Utc>,
    pub started: Instant,
}

impl RunMeta {
    #[must_use]
    pub fn start(run_id: u64, qualified_name: impl Into<String>) -> Self {
        Self {
            run_id,
            qualified_name: qualified_name.into(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Pre-run hook and sub-checks; the deadline applies.
    Checks,
    /// Post-run hook; the outcome is frozen and the deadline no longer applies.
    PostRun,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    current: Option<String>,
    checks: Vec<CheckTally>,
    records: Vec<LogRecord>,
    errored: bool,
    interrupted: Option<Outcome>,
    frozen: Option<Outcome>,
    closed: Option<Outcome>,
}

impl State {
    fn tally_mut(&mut self, name: &str) -> &mut CheckTally {
        let index = match self.checks.iter().position(|check| check.name == name) {
            Some(index) => index,
            None => {
                self.checks.push(CheckTally::new(name));
                self.checks.len() - 1
            }
        };
        &mut self.checks[index]
    }

    fn interrupt(&mut self, outcome: Outcome) {
        self.interrupted = Some(self.interrupted.map_or(outcome, |prev| prev.max(outcome)));
    }

    fn live_outcome(&self) -> Outcome {
        let mut outcome = if self.checks.iter().any(|check| check.tally.has_failures()) {
            Outcome::Failed
        } else {
            Outcome::Passed
        };
        if let Some(interrupted) = self.interrupted {
            outcome = outcome.max(interrupted);
        }
        if self.errored {
            outcome = outcome.max(Outcome::Errored);
        }
        outcome
    }

    fn outcome(&self) -> Outcome {
        let base = self.frozen.unwrap_or_else(|| self.live_outcome());
        self.closed.map_or(base, |closed| base.max(closed))
    }
}

/// Thread-safe sink for one run's records.
#[derive(Debug)]
pub struct ResultAggregator {
    deadline: Option<Instant>,
    state: Mutex<State>,
}

impl ResultAggregator {
    /// Aggregator with a zeroed tally pre-created for each declared sub-check.
    pub fn new<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deadline: None,
            state: Mutex::new(State {
                phase: Phase::Checks,
                current: None,
                checks: declared.into_iter().map(CheckTally::new).collect(),
                records: Vec::new(),
                errored: false,
                interrupted: None,
                frozen: None,
                closed: None,
            }),
        }
    }

    /// Reject records arriving at or after `deadline` until the post-run phase.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attribute subsequent records to `check`.
    pub fn begin(&self, check: &str) {
        self.lock().current = Some(check.to_string());
    }

    /// Append one record to the current sub-check.
    ///
    /// Returns `false` if the record was dropped because the run is closed or
    /// past its deadline. A record dropped for the deadline marks the run
    /// timed out.
    pub fn record(&self, level: LogLevel, subject: Option<ObjectRef>, message: Option<String>) -> bool {
        let mut state = self.lock();
        if state.closed.is_some() {
            return false;
        }
        if state.phase == Phase::Checks && self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            state.interrupt(Outcome::TimedOut);
            return false;
        }
        let check = state
            .current
            .clone()
            .unwrap_or_else(|| names::LOAD.to_string());
        if level.is_tallied() {
            state.tally_mut(&check).tally.count(level);
        }
        state.records.push(LogRecord {
            check,
            level,
            subject,
            message,
            timestamp: Utc::now(),
        });
        true
    }

    /// Record a fault as a synthetic failure and mark the run errored.
    ///
    /// The errored flag sticks even if the failure record itself is dropped.
    pub fn record_fault(&self, fault: &Fault) -> bool {
        self.lock().errored = true;
        self.record(LogLevel::Failure, None, Some(fault.message().to_string()))
    }

    /// Mark the run as stopped early by timeout or cancellation.
    pub fn interrupt(&self, outcome: Outcome) {
        self.lock().interrupt(outcome);
    }

    /// Freeze the outcome and switch to the post-run phase.
    ///
    /// Records from the post-run hook are still kept but can no longer change
    /// the outcome. Returns the frozen outcome.
    pub fn begin_post_run(&self) -> Outcome {
        let mut state = self.lock();
        let outcome = state.live_outcome();
        state.frozen = Some(outcome);
        state.phase = Phase::PostRun;
        state.current = Some(names::POST_RUN.to_string());
        outcome
    }

    /// Seal the aggregator: every later record is dropped.
    ///
    /// Used by the runner when a run is cut off or cancelled while its code is
    /// still executing.
    pub fn close(&self, outcome: Outcome) {
        let mut state = self.lock();
        state.closed = Some(state.closed.map_or(outcome, |prev| prev.max(outcome)));
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed.is_some()
    }

    /// Outcome if the run were finalized now.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.lock().outcome()
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    /// Snapshot the run into an immutable [`RunResult`].
    ///
    /// May be called more than once; each call reflects the records accepted
    /// so far.
    #[must_use]
    pub fn finalize(&self, meta: &RunMeta) -> RunResult {
        let state = self.lock();
        let elapsed = meta.started.elapsed();
        RunResult {
            run_id: meta.run_id,
            qualified_name: meta.qualified_name.clone(),
            outcome: state.outcome(),
            checks: state.checks.clone(),
            records: state.records.clone(),
            started_at: meta.started_at,
            finished_at: Utc::now(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
