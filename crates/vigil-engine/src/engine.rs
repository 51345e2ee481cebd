//! Lifecycle of a single run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use vigil_core::data::DataSource;
use vigil_core::entities::{RunResult, UnitDescriptor};
use vigil_core::enums::Outcome;
use vigil_core::names;

use crate::aggregator::{ResultAggregator, RunMeta};
use crate::cancel::CancelToken;
use crate::context::CheckContext;
use crate::fault::Fault;
use crate::loader::UnitLoader;

/// Everything belonging to one run that outlives the engine call.
///
/// The runner keeps a clone of the `Arc`s so it can seal the aggregator and
/// snapshot a result even while unit code is still executing.
#[derive(Debug, Clone)]
pub struct Execution {
    pub meta: RunMeta,
    pub descriptor: Arc<UnitDescriptor>,
    pub aggregator: Arc<ResultAggregator>,
    pub cancel: CancelToken,
    pub deadline: Instant,
}

impl Execution {
    /// Stop accepting records and cancel cooperative code.
    pub fn interrupt(&self, outcome: Outcome) {
        self.aggregator.close(outcome);
        self.cancel.cancel();
    }

    /// Snapshot of the run as it stands.
    #[must_use]
    pub fn snapshot(&self) -> RunResult {
        self.aggregator.finalize(&self.meta)
    }
}

/// Executes units: resolution, hooks, sub-checks, timeout, and result.
#[derive(Debug, Clone)]
pub struct Engine {
    loader: Arc<UnitLoader>,
    default_timeout: Duration,
}

impl Engine {
    #[must_use]
    pub fn new(loader: UnitLoader, default_timeout: Duration) -> Self {
        Self {
            loader: Arc::new(loader),
            default_timeout,
        }
    }

    #[must_use]
    pub fn loader(&self) -> &UnitLoader {
        &self.loader
    }

    #[must_use]
    pub fn effective_timeout(&self, descriptor: &UnitDescriptor) -> Duration {
        descriptor.effective_timeout(self.default_timeout)
    }

    /// Set up a run without starting it. The timeout clock starts here.
    #[must_use]
    pub fn prepare(&self, run_id: u64, descriptor: Arc<UnitDescriptor>) -> Execution {
        self.prepare_with(run_id, descriptor, CancelToken::new())
    }

    /// Like [`Engine::prepare`], sharing a cancel token created earlier.
    #[must_use]
    pub fn prepare_with(
        &self,
        run_id: u64,
        descriptor: Arc<UnitDescriptor>,
        cancel: CancelToken,
    ) -> Execution {
        let meta = RunMeta::start(run_id, descriptor.qualified_name.clone());
        let deadline = deadline_after(meta.started, self.effective_timeout(&descriptor));
        let aggregator = ResultAggregator::new(descriptor.check_names()).with_deadline(deadline);
        Execution {
            meta,
            descriptor,
            aggregator: Arc::new(aggregator),
            cancel,
            deadline,
        }
    }

    /// Prepare and execute in one call on the current thread.
    ///
    /// Cooperative only: a sub-check that never returns blocks the caller.
    /// The runner adds the hard cutoff.
    #[must_use]
    pub fn run(&self, run_id: u64, descriptor: Arc<UnitDescriptor>, data: &dyn DataSource) -> RunResult {
        let execution = self.prepare(run_id, descriptor);
        self.execute(&execution, data)
    }

    /// Execute a prepared run to completion and return its result.
    ///
    /// Never fails: faults, panics, and resolution errors all end up in the
    /// result as `errored`.
    #[must_use]
    pub fn execute(&self, execution: &Execution, data: &dyn DataSource) -> RunResult {
        let descriptor = execution.descriptor.as_ref();
        let sink = execution.aggregator.as_ref();
        let ctx = CheckContext::new(descriptor, data, sink, &execution.cancel);
        let span = tracing::info_span!(
            "run",
            unit = %descriptor.qualified_name,
            run_id = execution.meta.run_id
        );
        let _guard = span.enter();

        let unit = match self.loader.load(descriptor) {
            Ok(unit) => unit,
            Err(error) => {
                tracing::warn!(%error, "unit could not be resolved");
                sink.begin(names::LOAD);
                sink.record_fault(&Fault::new(error.to_string()));
                sink.begin_post_run();
                return execution.snapshot();
            }
        };

        sink.begin(names::PRE_RUN);
        let prepared = match guarded(|| unit.pre_run(&ctx)) {
            Ok(()) => true,
            Err(fault) => {
                tracing::warn!(fault = %fault, "pre-run hook failed; skipping sub-checks");
                sink.record_fault(&fault);
                false
            }
        };

        if prepared {
            for check in descriptor.check_names() {
                if let Some(outcome) = checkpoint(execution) {
                    tracing::info!(check, outcome = %outcome, "run stopped before sub-check");
                    sink.interrupt(outcome);
                    break;
                }
                sink.begin(check);
                tracing::debug!(check, "sub-check started");
                if let Err(fault) = guarded(|| unit.run_check(check, &ctx)) {
                    tracing::warn!(check, fault = %fault, "sub-check faulted");
                    sink.record_fault(&fault);
                }
            }
            if let Some(outcome) = checkpoint(execution) {
                sink.interrupt(outcome);
            }
        }

        let outcome = sink.begin_post_run();
        if let Err(fault) = guarded(|| unit.post_run(&ctx)) {
            tracing::warn!(fault = %fault, "post-run hook failed");
            sink.record_fault(&fault);
        }

        let result = execution.snapshot();
        tracing::info!(
            outcome = %outcome,
            records = result.records.len(),
            duration_ms = result.duration_ms,
            "run finished"
        );
        result
    }
}

/// Cancellation or deadline observed between sub-checks.
/// `start + timeout`, saturating at the furthest instant the platform clock
/// can represent.
#[must_use]
pub fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    if let Some(deadline) = start.checked_add(timeout) {
        return deadline;
    }
    let mut step = timeout;
    let mut deadline = start;
    while !step.is_zero() {
        match deadline.checked_add(step) {
            Some(next) => deadline = next,
            None => step /= 2,
        }
    }
    deadline
}

fn checkpoint(execution: &Execution) -> Option<Outcome> {
    if execution.cancel.is_cancelled() {
        Some(Outcome::Cancelled)
    } else if Instant::now() >= execution.deadline {
        Some(Outcome::TimedOut)
    } else {
        None
    }
}

/// Run unit code, turning a panic into a [`Fault`].
fn guarded<F>(step: F) -> Result<(), Fault>
where
    F: FnOnce() -> Result<(), Fault>,
{
    catch_unwind(AssertUnwindSafe(step)).unwrap_or_else(|payload| Err(Fault::from_panic(payload.as_ref())))
}
