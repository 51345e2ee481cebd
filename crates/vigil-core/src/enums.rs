//! Log levels, run lifecycle states, and overall outcomes.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`RunStatus`] is a state machine and provides `allowed_next_states()` so the
//! runner can reject illegal transitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// LogLevel
// ---------------------------------------------------------------------------

/// Level of a single log record emitted by a sub-check.
///
/// `Default` is a neutral annotation: it is kept in the record stream but is
/// never tallied and never influences the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Default,
    Success,
    Info,
    Warning,
    Failure,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Failure => "failure",
        }
    }

    /// Whether records at this level count toward a check's tally.
    #[must_use]
    pub const fn is_tallied(self) -> bool {
        !matches!(self, Self::Default)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Overall status of a finished run.
///
/// Precedence when several conditions hold at once, highest first:
///
/// ```text
/// errored > cancelled > timed_out > failed > passed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    TimedOut,
    Cancelled,
    Errored,
}

impl Outcome {
    /// Rank used to combine conditions; the higher rank wins.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
            Self::TimedOut => 2,
            Self::Cancelled => 3,
            Self::Errored => 4,
        }
    }

    /// Return whichever of the two outcomes takes precedence.
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }

    #[must_use]
    pub const fn is_passed(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The terminal [`RunStatus`] a run with this outcome ends in.
    #[must_use]
    pub const fn terminal_status(self) -> RunStatus {
        match self {
            Self::Passed => RunStatus::Completed,
            Self::Failed => RunStatus::Failed,
            Self::TimedOut => RunStatus::TimedOut,
            Self::Cancelled => RunStatus::Cancelled,
            Self::Errored => RunStatus::Errored,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a single run.
///
/// ```text
/// pending → running → completed
///                   → failed
///                   → errored
///                   → timed_out
///                   → cancelled
/// pending → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Errored,
    TimedOut,
    Cancelled,
}

impl RunStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Running, Self::Cancelled],
            Self::Running => &[
                Self::Completed,
                Self::Failed,
                Self::Errored,
                Self::TimedOut,
                Self::Cancelled,
            ],
            Self::Completed | Self::Failed | Self::Errored | Self::TimedOut | Self::Cancelled => {
                &[]
            }
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_next_states().is_empty()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(level_default, LogLevel, LogLevel::Default, "default");
    test_serde_roundtrip!(level_failure, LogLevel, LogLevel::Failure, "failure");
    test_serde_roundtrip!(outcome_timed_out, Outcome, Outcome::TimedOut, "timed_out");
    test_serde_roundtrip!(status_timed_out, RunStatus, RunStatus::TimedOut, "timed_out");

    #[test]
    fn default_level_is_not_tallied() {
        assert!(!LogLevel::Default.is_tallied());
        assert!(LogLevel::Info.is_tallied());
        assert!(LogLevel::Failure.is_tallied());
    }

    #[test]
    fn outcome_precedence_orders_errored_highest() {
        assert_eq!(Outcome::Passed.max(Outcome::Failed), Outcome::Failed);
        assert_eq!(Outcome::Failed.max(Outcome::TimedOut), Outcome::TimedOut);
        assert_eq!(Outcome::TimedOut.max(Outcome::Cancelled), Outcome::Cancelled);
        assert_eq!(Outcome::Errored.max(Outcome::TimedOut), Outcome::Errored);
        assert_eq!(Outcome::Errored.max(Outcome::Passed), Outcome::Errored);
    }

    #[test]
    fn pending_can_only_start_or_cancel() {
        assert!(RunStatus::Pending.can_transition_to(RunStatus::Running));
        assert!(RunStatus::Pending.can_transition_to(RunStatus::Cancelled));
        assert!(!RunStatus::Pending.can_transition_to(RunStatus::Completed));
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Errored,
            RunStatus::TimedOut,
            RunStatus::Cancelled,
        ] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
        assert!(!RunStatus::Running.is_terminal());
    }

    #[test]
    fn outcomes_map_to_terminal_statuses() {
        assert_eq!(Outcome::Passed.terminal_status(), RunStatus::Completed);
        assert_eq!(Outcome::Errored.terminal_status(), RunStatus::Errored);
        assert!(RunStatus::Running.can_transition_to(Outcome::TimedOut.terminal_status()));
    }
}
