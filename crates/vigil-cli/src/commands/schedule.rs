use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::sync::broadcast;
use vigil_registry::Registry;
use vigil_runner::Scheduler;

use crate::cli::GlobalFlags;
use crate::context::AppContext;

/// How long active runs may take to settle after Ctrl-C.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Handle `vigil schedule`: submit configured units until Ctrl-C.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if ctx.config.schedules.is_empty() {
        bail!("no [[schedules]] configured");
    }

    let root = ctx.checks_root();
    let registry = Arc::new(
        Registry::open(root).with_context(|| format!("failed to scan {}", root.display()))?,
    );
    for schedule in &ctx.config.schedules {
        if registry.get(&schedule.unit).is_none() {
            tracing::warn!(unit = %schedule.unit, "scheduled unit not found; its runs will be skipped");
        }
    }

    let runner = ctx.runner(registry)?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let scheduler = Scheduler::new(runner.clone(), ctx.config.schedules.clone());
    let task = tokio::spawn(scheduler.run(shutdown_rx));

    if !flags.quiet {
        eprintln!(
            "vigil: {} schedule(s) active; press Ctrl-C to stop",
            ctx.config.schedules.len()
        );
    }
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    let _ = shutdown_tx.send(());
    runner.close();
    let cancelled = runner.cancel_all();
    tracing::info!(cancelled, "shutting down scheduler");

    if let Err(error) = task.await {
        tracing::error!(%error, "scheduler task failed");
    }
    drain(&runner).await;
    Ok(())
}

async fn drain(runner: &vigil_runner::JobRunner) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while !runner.active_units().is_empty() {
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(units = ?runner.active_units(), "runs still active at exit");
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
