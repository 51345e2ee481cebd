//! # vigil-runner
//!
//! Asynchronous front door for executing check units.
//!
//! - [`JobRunner`] accepts submissions by qualified name, refuses duplicates
//!   with [`RunnerError::AlreadyRunning`], bounds concurrency with a worker
//!   pool that queues or rejects, enforces the hard timeout cutoff, and hands
//!   every finished result to the result store
//! - [`RunHandle`] lets the caller poll, await, or cancel its run
//! - [`Scheduler`] submits configured units on fixed intervals

mod error;
mod runner;
mod scheduler;
mod state;

pub use error::RunnerError;
pub use runner::JobRunner;
pub use scheduler::Scheduler;
pub use state::{RunHandle, RunState, UnitStatus};
