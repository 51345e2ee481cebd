//! Bounded, deduplicating execution of check units.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use vigil_config::{QueuePolicy, RunnerConfig};
use vigil_core::data::DataSource;
use vigil_core::entities::{RunResult, UnitDescriptor};
use vigil_core::enums::Outcome;
use vigil_engine::{CancelToken, Engine, Execution, Fault, deadline_after};
use vigil_registry::Registry;
use vigil_store::ResultStore;

use crate::error::RunnerError;
use crate::state::{RunHandle, RunState, UnitStatus, advance};

#[derive(Debug)]
struct ActiveRun {
    run_id: u64,
    cancel: CancelToken,
    state: watch::Receiver<RunState>,
}

struct Inner {
    engine: Engine,
    registry: Arc<Registry>,
    data: Arc<dyn DataSource>,
    store: Arc<dyn ResultStore>,
    workers: Arc<Semaphore>,
    policy: QueuePolicy,
    grace: Duration,
    active: Mutex<HashMap<String, ActiveRun>>,
    next_run_id: AtomicU64,
}

impl Inner {
    fn active(&self) -> MutexGuard<'_, HashMap<String, ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Accepts run submissions and executes them on a bounded worker pool.
///
/// At most one run per qualified name is in flight. Each run executes on a
/// blocking thread; the runner enforces the unit's timeout with a hard
/// cutoff, stores the result, and only then frees the unit's slot.
#[derive(Clone)]
pub struct JobRunner {
    inner: Arc<Inner>,
}

impl JobRunner {
    #[must_use]
    pub fn new(
        engine: Engine,
        registry: Arc<Registry>,
        data: Arc<dyn DataSource>,
        store: Arc<dyn ResultStore>,
        config: &RunnerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                registry,
                data,
                store,
                workers: Arc::new(Semaphore::new(config.max_workers)),
                policy: config.queue_policy,
                grace: config.hard_cutoff_grace(),
                active: Mutex::new(HashMap::new()),
                next_run_id: AtomicU64::new(1),
            }),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.inner.store
    }

    /// Start a run of `qualified_name` and return immediately.
    ///
    /// # Errors
    ///
    /// - [`RunnerError::NotFound`] if the unit is not registered
    /// - [`RunnerError::AlreadyRunning`] if a run for it is in flight
    /// - [`RunnerError::NoCapacity`] if all workers are busy under the
    ///   `reject` policy
    /// - [`RunnerError::Closed`] after [`JobRunner::close`]
    pub fn submit(&self, qualified_name: &str) -> Result<RunHandle, RunnerError> {
        let inner = &self.inner;
        if inner.workers.is_closed() {
            return Err(RunnerError::Closed);
        }
        let descriptor = inner
            .registry
            .get(qualified_name)
            .ok_or_else(|| RunnerError::NotFound(qualified_name.to_string()))?;

        let mut active = inner.active();
        if active.contains_key(qualified_name) {
            tracing::debug!(unit = qualified_name, "submission rejected: already running");
            return Err(RunnerError::AlreadyRunning(qualified_name.to_string()));
        }
        let permit = match inner.policy {
            QueuePolicy::Queue => None,
            QueuePolicy::Reject => Some(
                Arc::clone(&inner.workers)
                    .try_acquire_owned()
                    .map_err(|_| RunnerError::NoCapacity(qualified_name.to_string()))?,
            ),
        };

        let run_id = inner.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancelToken::new();
        let (tx, rx) = watch::channel(RunState::Pending);
        active.insert(
            qualified_name.to_string(),
            ActiveRun {
                run_id,
                cancel: cancel.clone(),
                state: rx.clone(),
            },
        );
        drop(active);

        tracing::info!(unit = qualified_name, run_id, "run submitted");
        tokio::spawn(drive(
            Arc::clone(inner),
            descriptor,
            run_id,
            cancel.clone(),
            tx,
            permit,
        ));

        Ok(RunHandle {
            run_id,
            qualified_name: qualified_name.to_string(),
            cancel,
            state: rx,
        })
    }

    /// Cancel a run through its handle.
    pub fn cancel(&self, handle: &RunHandle) {
        handle.cancel();
    }

    /// Cancel the in-flight run of a unit. Returns whether one existed.
    pub fn cancel_unit(&self, qualified_name: &str) -> bool {
        self.inner.active().get(qualified_name).is_some_and(|run| {
            run.cancel.cancel();
            true
        })
    }

    /// Cancel every in-flight run. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let active = self.inner.active();
        for run in active.values() {
            run.cancel.cancel();
        }
        active.len()
    }

    /// Current run status, or the last stored result.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Store`] if the stored result cannot be read.
    pub fn status(&self, qualified_name: &str) -> Result<UnitStatus, RunnerError> {
        if let Some(run) = self.inner.active().get(qualified_name) {
            return Ok(UnitStatus::Active {
                run_id: run.run_id,
                status: run.state.borrow().status(),
            });
        }
        Ok(self
            .inner
            .store
            .get(qualified_name)?
            .map_or(UnitStatus::Unknown, |result| UnitStatus::Finished(Arc::new(result))))
    }

    /// Qualified names with a run in flight, sorted.
    #[must_use]
    pub fn active_units(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.active().keys().cloned().collect();
        names.sort();
        names
    }

    /// Refuse new submissions. Queued runs finish as cancelled; running ones
    /// continue.
    pub fn close(&self) {
        self.inner.workers.close();
    }
}

/// Drive one accepted run from pending to stored result.
async fn drive(
    inner: Arc<Inner>,
    descriptor: Arc<UnitDescriptor>,
    run_id: u64,
    cancel: CancelToken,
    tx: watch::Sender<RunState>,
    permit: Option<OwnedSemaphorePermit>,
) {
    let unit = descriptor.qualified_name.clone();
    let permit = match permit {
        Some(permit) => Some(permit),
        None => tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            acquired = Arc::clone(&inner.workers).acquire_owned() => acquired.ok(),
        },
    };

    let execution = Arc::new(inner.engine.prepare_with(run_id, descriptor, cancel.clone()));
    let result = match permit {
        Some(permit) => {
            advance(&tx, &unit, RunState::Running);
            execute(&inner, &execution, &cancel, permit).await
        }
        None => {
            tracing::info!(unit, run_id, "run cancelled before start");
            execution.interrupt(Outcome::Cancelled);
            execution.snapshot()
        }
    };
    let result = Arc::new(result);

    let store = Arc::clone(&inner.store);
    let to_store = Arc::clone(&result);
    match tokio::task::spawn_blocking(move || store.put(&to_store)).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => tracing::error!(unit, run_id, %error, "failed to store result"),
        Err(error) => tracing::error!(unit, run_id, %error, "store task failed"),
    }

    {
        let mut active = inner.active();
        if active.get(&unit).is_some_and(|run| run.run_id == run_id) {
            active.remove(&unit);
        }
    }
    advance(&tx, &unit, RunState::Finished(result));
}

/// Run the engine on a blocking thread, bounded by the hard cutoff.
async fn execute(
    inner: &Inner,
    execution: &Arc<Execution>,
    cancel: &CancelToken,
    permit: OwnedSemaphorePermit,
) -> RunResult {
    let unit = execution.meta.qualified_name.as_str();
    let run_id = execution.meta.run_id;
    let mut blocking = {
        let engine = inner.engine.clone();
        let data = Arc::clone(&inner.data);
        let execution = Arc::clone(execution);
        // The permit lives as long as the thread does, so abandoned runs
        // still count against capacity.
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            engine.execute(&execution, data.as_ref())
        })
    };
    let cutoff = tokio::time::Instant::from_std(deadline_after(execution.deadline, inner.grace));

    tokio::select! {
        biased;
        joined = &mut blocking => finish_joined(execution, joined),
        () = tokio::time::sleep_until(cutoff) => {
            tracing::warn!(unit, run_id, "hard cutoff reached; abandoning run");
            execution.interrupt(Outcome::TimedOut);
            execution.snapshot()
        }
        () = cancel.cancelled() => {
            execution.aggregator.interrupt(Outcome::Cancelled);
            match tokio::time::timeout(inner.grace, &mut blocking).await {
                Ok(joined) => finish_joined(execution, joined),
                Err(_) => {
                    tracing::warn!(unit, run_id, "cancelled run did not stop in time; abandoning");
                    execution.interrupt(Outcome::Cancelled);
                    execution.snapshot()
                }
            }
        }
    }
}

fn finish_joined(
    execution: &Execution,
    joined: Result<RunResult, tokio::task::JoinError>,
) -> RunResult {
    match joined {
        Ok(result) => result,
        Err(error) => {
            execution
                .aggregator
                .record_fault(&Fault::new(format!("run task failed: {error}")));
            execution.snapshot()
        }
    }
}
