//! Download job model and its lifecycle state machine.

mod state;
mod types;

pub use state::TransitionError;
pub use types::{unix_timestamp, DownloadJob, DownloadResult, FailureKind, JobId, JobStatus};
