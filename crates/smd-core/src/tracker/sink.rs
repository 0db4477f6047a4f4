//! Progress callback handed to fetchers.

use super::JobTracker;
use crate::job::JobId;

/// Reports a fetcher's progress into the tracker for one job.
///
/// Reports that arrive after the job left the transfer phase (cancelled,
/// timed out) are dropped; the fetcher does not need to care.
#[derive(Clone)]
pub struct ProgressSink {
    tracker: JobTracker,
    job_id: JobId,
}

impl ProgressSink {
    pub(super) fn new(tracker: JobTracker, job_id: JobId) -> Self {
        Self { tracker, job_id }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Percentage in [0, 100]. The first report moves the job to `downloading`.
    pub fn report(&self, percent: f32) {
        if let Err(e) = self.tracker.record_progress(self.job_id, percent) {
            tracing::debug!(job_id = %self.job_id, "progress report dropped: {}", e);
        }
    }

    /// Transfer finished; post-processing (conversion, muxing) begins.
    pub fn begin_processing(&self) {
        if let Err(e) = self.tracker.begin_processing(self.job_id) {
            tracing::debug!(job_id = %self.job_id, "processing report dropped: {}", e);
        }
    }
}
