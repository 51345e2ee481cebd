//! Value types produced and consumed by the check pipeline.
//!
//! All structs derive `Serialize` and `Deserialize`; the persisted ones also
//! derive `JsonSchema` so stored results can be validated and documented.

mod descriptor;
mod log_record;
mod result;
mod tally;

pub use descriptor::{Implementation, MAX_TIMEOUT_SECS, SubCheckSpec, UnitDescriptor};
pub use log_record::{LogRecord, ObjectRef};
pub use result::RunResult;
pub use tally::{CheckTally, Tally};
