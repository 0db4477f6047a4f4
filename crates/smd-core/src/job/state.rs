//! Transitions on a job snapshot. Each returns whether the snapshot changed,
//! or a `TransitionError` leaving the job untouched.

use super::types::{unix_timestamp, DownloadJob, DownloadResult, FailureKind, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition {from} -> {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

impl DownloadJob {
    fn check(&self, to: JobStatus) -> Result<(), TransitionError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.status,
                to,
            })
        }
    }

    fn touch(&mut self) {
        self.updated_at = unix_timestamp();
    }

    /// `queued -> starting`: the fetcher is about to be invoked.
    pub fn start(&mut self) -> Result<bool, TransitionError> {
        self.check(JobStatus::Starting)?;
        self.status = JobStatus::Starting;
        self.touch();
        Ok(true)
    }

    /// Records a progress report. The first report moves `starting` to
    /// `downloading`; later reports never lower the percentage. NaN is ignored.
    pub fn record_progress(&mut self, percent: f32) -> Result<bool, TransitionError> {
        let mut changed = false;
        match self.status {
            JobStatus::Downloading => {}
            JobStatus::Starting => {
                self.status = JobStatus::Downloading;
                self.progress = 0.0;
                changed = true;
            }
            from => {
                return Err(TransitionError {
                    from,
                    to: JobStatus::Downloading,
                })
            }
        }
        if !percent.is_nan() {
            let clamped = percent.clamp(0.0, 100.0);
            if clamped > self.progress {
                self.progress = clamped;
                changed = true;
            }
        }
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    /// `starting|downloading -> processing`.
    pub fn begin_processing(&mut self) -> Result<bool, TransitionError> {
        self.check(JobStatus::Processing)?;
        self.status = JobStatus::Processing;
        self.touch();
        Ok(true)
    }

    /// Terminal success; progress is pinned to 100.
    pub fn complete(&mut self, result: DownloadResult) -> Result<bool, TransitionError> {
        self.check(JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.progress = 100.0;
        self.result = Some(result);
        self.error = None;
        self.error_kind = None;
        self.touch();
        Ok(true)
    }

    /// Terminal failure from any non-terminal state.
    pub fn fail(
        &mut self,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Result<bool, TransitionError> {
        self.check(JobStatus::Error)?;
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".to_string();
        }
        self.status = JobStatus::Error;
        self.result = None;
        self.error = Some(message);
        self.error_kind = Some(kind);
        self.touch();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ContentType, OutputFormat, Platform};

    fn job() -> DownloadJob {
        DownloadJob::new(
            Platform::Youtube,
            ContentType::Video,
            OutputFormat::Audio,
            "https://youtu.be/abc",
        )
    }

    fn result() -> DownloadResult {
        DownloadResult {
            title: "t".into(),
            filename: "t.mp3".into(),
            file_size: 3,
            format: OutputFormat::Audio,
        }
    }

    #[test]
    fn happy_path() {
        let mut j = job();
        assert!(j.start().unwrap());
        assert!(j.record_progress(10.0).unwrap());
        assert_eq!(j.status, JobStatus::Downloading);
        assert!(j.begin_processing().unwrap());
        assert!(j.complete(result()).unwrap());
        assert_eq!(j.status, JobStatus::Completed);
        assert_eq!(j.progress, 100.0);
        assert!(j.result.is_some());
        assert!(j.error.is_none());
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut j = job();
        j.start().unwrap();
        j.record_progress(40.0).unwrap();
        assert!(!j.record_progress(20.0).unwrap());
        assert_eq!(j.progress, 40.0);
        assert!(!j.record_progress(40.0).unwrap());
        assert!(!j.record_progress(f32::NAN).unwrap());
        assert!(j.record_progress(250.0).unwrap());
        assert_eq!(j.progress, 100.0);
    }

    #[test]
    fn first_report_changes_status_even_at_zero() {
        let mut j = job();
        j.start().unwrap();
        assert!(j.record_progress(0.0).unwrap());
        assert_eq!(j.status, JobStatus::Downloading);
    }

    #[test]
    fn progress_rejected_outside_transfer_states() {
        let mut j = job();
        let err = j.record_progress(5.0).unwrap_err();
        assert_eq!(err.from, JobStatus::Queued);

        j.start().unwrap();
        j.begin_processing().unwrap();
        let err = j.record_progress(95.0).unwrap_err();
        assert_eq!(err.from, JobStatus::Processing);
        assert_eq!(j.status, JobStatus::Processing);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut j = job();
        j.start().unwrap();
        j.complete(result()).unwrap();
        assert!(j.fail(FailureKind::Fetch, "late").is_err());
        assert!(j.begin_processing().is_err());
        assert!(j.start().is_err());
        assert_eq!(j.status, JobStatus::Completed);
        assert!(j.error.is_none());

        let mut k = job();
        k.fail(FailureKind::Cancelled, "cancelled by user").unwrap();
        assert!(k.complete(result()).is_err());
        assert!(k.result.is_none());
        assert_eq!(k.error.as_deref(), Some("cancelled by user"));
        assert_eq!(k.error_kind, Some(FailureKind::Cancelled));
    }

    #[test]
    fn empty_failure_message_is_replaced() {
        let mut j = job();
        j.fail(FailureKind::Fetch, "  ").unwrap();
        assert_eq!(j.error.as_deref(), Some("unknown error"));
    }

    #[test]
    fn processing_cannot_go_back() {
        let mut j = job();
        j.start().unwrap();
        j.begin_processing().unwrap();
        let err = j.begin_processing().unwrap_err();
        assert_eq!(
            err,
            TransitionError {
                from: JobStatus::Processing,
                to: JobStatus::Processing
            }
        );
    }
}
