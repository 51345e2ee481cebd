//! Observable state of one run.

use std::sync::Arc;

use tokio::sync::watch;
use vigil_core::entities::RunResult;
use vigil_core::enums::RunStatus;
use vigil_engine::CancelToken;

use crate::error::RunnerError;

/// Where a run currently is.
#[derive(Debug, Clone)]
pub enum RunState {
    Pending,
    Running,
    Finished(Arc<RunResult>),
}

impl RunState {
    #[must_use]
    pub fn status(&self) -> RunStatus {
        match self {
            Self::Pending => RunStatus::Pending,
            Self::Running => RunStatus::Running,
            Self::Finished(result) => result.outcome.terminal_status(),
        }
    }
}

/// Move a run to its next state, warning on a transition the lifecycle forbids.
pub(crate) fn advance(tx: &watch::Sender<RunState>, unit: &str, next: RunState) {
    let from = tx.borrow().status();
    let to = next.status();
    if !from.can_transition_to(to) {
        tracing::warn!(unit, %from, %to, "unexpected run state transition");
    }
    tx.send_replace(next);
}

/// Caller's view of a submitted run. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub(crate) run_id: u64,
    pub(crate) qualified_name: String,
    pub(crate) cancel: CancelToken,
    pub(crate) state: watch::Receiver<RunState>,
}

impl RunHandle {
    #[must_use]
    pub const fn run_id(&self) -> u64 {
        self.run_id
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.state.borrow().status()
    }

    /// Request cancellation. Takes effect at the next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to finish and return its result.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Closed`] if the runner dropped the run without
    /// finishing it.
    pub async fn wait(&self) -> Result<Arc<RunResult>, RunnerError> {
        let mut state = self.state.clone();
        let finished = state
            .wait_for(|state| matches!(state, RunState::Finished(_)))
            .await
            .map_err(|_| RunnerError::Closed)?;
        match &*finished {
            RunState::Finished(result) => Ok(Arc::clone(result)),
            RunState::Pending | RunState::Running => Err(RunnerError::Closed),
        }
    }
}

/// Answer to [`crate::JobRunner::status`].
#[derive(Debug, Clone)]
pub enum UnitStatus {
    /// A run is pending or running.
    Active { run_id: u64, status: RunStatus },
    /// Nothing in flight; this is the last stored result.
    Finished(Arc<RunResult>),
    /// Never run, or its result was deleted.
    Unknown,
}
