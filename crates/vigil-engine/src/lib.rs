//! # vigil-engine
//!
//! Runs one check unit and aggregates what it reports.
//!
//! - [`Engine`] resolves a descriptor, calls the pre-run hook, each declared
//!   sub-check in order, and the post-run hook, then builds a [`RunResult`]
//! - [`ResultAggregator`] collects records and per-check tallies for one run
//!   and derives the outcome
//! - [`CheckContext`] is the only surface unit code sees: read-only data, the
//!   log sink, and the stop signal
//! - [`UnitLoader`] maps native implementation keys to [`CheckUnit`]s; rules
//!   units resolve to the built-in [`RuleUnit`]
//!
//! [`RunResult`]: vigil_core::entities::RunResult

mod aggregator;
mod cancel;
mod context;
mod engine;
mod fault;
mod loader;
pub mod rules;
mod unit;

pub use aggregator::{ResultAggregator, RunMeta};
pub use cancel::CancelToken;
pub use context::CheckContext;
pub use engine::{Engine, Execution, deadline_after};
pub use fault::Fault;
pub use loader::{ResolveError, UnitLoader};
pub use rules::RuleUnit;
pub use unit::{CheckUnit, FnUnit};
