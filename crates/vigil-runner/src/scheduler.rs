//! Periodic submission of configured units.

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use vigil_config::ScheduleConfig;

use crate::error::RunnerError;
use crate::runner::JobRunner;

/// Submits each scheduled unit on its own interval until shutdown.
pub struct Scheduler {
    runner: JobRunner,
    schedules: Vec<ScheduleConfig>,
}

impl Scheduler {
    #[must_use]
    pub const fn new(runner: JobRunner, schedules: Vec<ScheduleConfig>) -> Self {
        Self { runner, schedules }
    }

    /// Run every schedule until `shutdown` fires or its sender is dropped.
    ///
    /// The first submission of each schedule happens immediately.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) {
        tracing::info!(schedules = self.schedules.len(), "scheduler started");
        let mut tasks = JoinSet::new();
        for schedule in self.schedules {
            tasks.spawn(tick_loop(
                self.runner.clone(),
                schedule,
                shutdown.resubscribe(),
            ));
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                tracing::error!(%error, "schedule task failed");
            }
        }
        tracing::info!("scheduler stopped");
    }
}

async fn tick_loop(
    runner: JobRunner,
    schedule: ScheduleConfig,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(schedule.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            received = shutdown.recv() => match received {
                Ok(()) | Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "scheduler shutdown receiver lagged");
                }
            },
            _ = ticker.tick() => match runner.submit(&schedule.unit) {
                Ok(handle) => {
                    tracing::info!(unit = %schedule.unit, run_id = handle.run_id(), "scheduled run submitted");
                }
                Err(RunnerError::AlreadyRunning(_)) => {
                    tracing::info!(unit = %schedule.unit, "previous run still in flight; tick skipped");
                }
                Err(error) => {
                    tracing::warn!(unit = %schedule.unit, %error, "scheduled submission failed");
                }
            },
        }
    }
}
