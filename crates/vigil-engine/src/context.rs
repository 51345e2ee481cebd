//! Handle passed to sub-check code.

use std::time::Instant;

use vigil_core::data::DataSource;
use vigil_core::entities::{ObjectRef, UnitDescriptor};
use vigil_core::enums::LogLevel;

use crate::aggregator::ResultAggregator;
use crate::cancel::CancelToken;

/// Everything a sub-check may touch: read-only data, the log sink, and the
/// stop signal. Nothing else of the engine is reachable from unit code.
pub struct CheckContext<'a> {
    descriptor: &'a UnitDescriptor,
    data: &'a dyn DataSource,
    sink: &'a ResultAggregator,
    cancel: &'a CancelToken,
}

impl<'a> CheckContext<'a> {
    #[must_use]
    pub fn new(
        descriptor: &'a UnitDescriptor,
        data: &'a dyn DataSource,
        sink: &'a ResultAggregator,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            descriptor,
            data,
            sink,
            cancel,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &UnitDescriptor {
        self.descriptor
    }

    #[must_use]
    pub fn data(&self) -> &dyn DataSource {
        self.data
    }

    /// True once the run has been cancelled or has passed its deadline.
    ///
    /// Long loops should poll this and return early.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled()
            || self.sink.is_closed()
            || self
                .sink
                .deadline()
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Emit a record. Returns `false` if the run no longer accepts records.
    pub fn record(
        &self,
        level: LogLevel,
        subject: impl Into<Option<ObjectRef>>,
        message: Option<&str>,
    ) -> bool {
        self.sink
            .record(level, subject.into(), message.map(str::to_string))
    }

    /// Neutral annotation; kept in the log, never tallied.
    pub fn log(&self, message: &str) -> bool {
        self.record(LogLevel::Default, None, Some(message))
    }

    pub fn success(&self, subject: impl Into<Option<ObjectRef>>, message: Option<&str>) -> bool {
        self.record(LogLevel::Success, subject, message)
    }

    pub fn info(&self, subject: impl Into<Option<ObjectRef>>, message: Option<&str>) -> bool {
        self.record(LogLevel::Info, subject, message)
    }

    pub fn warning(&self, subject: impl Into<Option<ObjectRef>>, message: Option<&str>) -> bool {
        self.record(LogLevel::Warning, subject, message)
    }

    pub fn failure(&self, subject: impl Into<Option<ObjectRef>>, message: Option<&str>) -> bool {
        self.record(LogLevel::Failure, subject, message)
    }
}
