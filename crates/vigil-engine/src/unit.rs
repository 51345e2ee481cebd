//! The capability every runnable check unit provides.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::context::CheckContext;
use crate::fault::Fault;

/// A runnable check unit.
///
/// The engine calls [`CheckUnit::pre_run`] once, then
/// [`CheckUnit::run_check`] for each declared sub-check in order, then
/// [`CheckUnit::post_run`] once. Calls are synchronous and run on a blocking
/// worker thread; a panic is caught and treated like a returned [`Fault`].
pub trait CheckUnit: Send + Sync {
    /// Setup before the first sub-check. A fault here skips every sub-check.
    ///
    /// # Errors
    ///
    /// Any [`Fault`] marks the run errored.
    fn pre_run(&self, _ctx: &CheckContext<'_>) -> Result<(), Fault> {
        Ok(())
    }

    /// Run the sub-check called `name`.
    ///
    /// # Errors
    ///
    /// Any [`Fault`] marks the run errored; later sub-checks still run.
    fn run_check(&self, name: &str, ctx: &CheckContext<'_>) -> Result<(), Fault>;

    /// Cleanup after the last sub-check. Always called, even after a fault.
    ///
    /// # Errors
    ///
    /// A [`Fault`] is recorded but does not change the run outcome.
    fn post_run(&self, _ctx: &CheckContext<'_>) -> Result<(), Fault> {
        Ok(())
    }
}

type Step = Arc<dyn Fn(&CheckContext<'_>) -> Result<(), Fault> + Send + Sync>;

/// A [`CheckUnit`] assembled from closures.
///
/// ```ignore
/// let unit = FnUnit::new()
///     .check("test_a", |ctx| {
///         ctx.success(None, None);
///         Ok(())
///     });
/// ```
#[derive(Clone, Default)]
pub struct FnUnit {
    pre_run: Option<Step>,
    checks: BTreeMap<String, Step>,
    post_run: Option<Step>,
}

impl FnUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn check<F>(mut self, name: impl Into<String>, step: F) -> Self
    where
        F: Fn(&CheckContext<'_>) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), Arc::new(step));
        self
    }

    #[must_use]
    pub fn pre_run<F>(mut self, step: F) -> Self
    where
        F: Fn(&CheckContext<'_>) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.pre_run = Some(Arc::new(step));
        self
    }

    #[must_use]
    pub fn post_run<F>(mut self, step: F) -> Self
    where
        F: Fn(&CheckContext<'_>) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.post_run = Some(Arc::new(step));
        self
    }
}

impl fmt::Debug for FnUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnUnit")
            .field("pre_run", &self.pre_run.is_some())
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .field("post_run", &self.post_run.is_some())
            .finish()
    }
}

impl CheckUnit for FnUnit {
    fn pre_run(&self, ctx: &CheckContext<'_>) -> Result<(), Fault> {
        self.pre_run.as_ref().map_or(Ok(()), |step| step(ctx))
    }

    fn run_check(&self, name: &str, ctx: &CheckContext<'_>) -> Result<(), Fault> {
        let step = self
            .checks
            .get(name)
            .ok_or_else(|| Fault::new(format!("unit has no sub-check named '{name}'")))?;
        step(ctx)
    }

    fn post_run(&self, ctx: &CheckContext<'_>) -> Result<(), Fault> {
        self.post_run.as_ref().map_or(Ok(()), |step| step(ctx))
    }
}
