//! Polling progress reporter for terminal front-ends.
//!
//! Polls a job's status at a fixed interval and hands every snapshot that
//! differs from the previous one to a callback, until the job is terminal.

use std::time::Duration;

use crate::error::TrackerError;
use crate::job::{DownloadJob, JobId, JobStatus};
use crate::tracker::JobTracker;

/// Polls `job_id` every `interval`, calling `on_snapshot` whenever status or
/// progress changed. Returns the terminal snapshot.
pub async fn poll_until_terminal<F>(
    tracker: &JobTracker,
    job_id: JobId,
    interval: Duration,
    mut on_snapshot: F,
) -> Result<DownloadJob, TrackerError>
where
    F: FnMut(&DownloadJob),
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last: Option<(JobStatus, f32)> = None;
    loop {
        ticker.tick().await;
        let job = tracker.get_status(job_id)?;
        let seen = (job.status, job.progress);
        if last != Some(seen) {
            on_snapshot(&job);
            last = Some(seen);
        }
        if job.status.is_terminal() {
            return Ok(job);
        }
    }
}

/// One-line human rendering of a snapshot.
pub fn render_line(job: &DownloadJob) -> String {
    match job.status {
        JobStatus::Downloading | JobStatus::Processing => {
            format!("[{}] {:>5.1}%  {}", job.status, job.progress, job.source_url)
        }
        JobStatus::Completed => match &job.result {
            Some(result) => format!(
                "[completed] {} ({}, {:.1} MiB)",
                result.filename,
                result.format,
                result.file_size as f64 / 1_048_576.0
            ),
            None => "[completed]".to_string(),
        },
        JobStatus::Error => format!(
            "[error] {}",
            job.error.as_deref().unwrap_or("unknown error")
        ),
        JobStatus::Queued | JobStatus::Starting => {
            format!("[{}] {}", job.status, job.source_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{DownloadResult, FailureKind};
    use crate::platform::{ContentType, OutputFormat, Platform};
    use crate::tracker::TrackerSettings;

    fn job() -> DownloadJob {
        DownloadJob::new(
            Platform::Tiktok,
            ContentType::Video,
            OutputFormat::Best,
            "https://www.tiktok.com/@a/video/1",
        )
    }

    #[test]
    fn render_progress_and_terminal_states() {
        let mut j = job();
        assert_eq!(render_line(&j), "[queued] https://www.tiktok.com/@a/video/1");
        j.start().unwrap();
        j.record_progress(42.0).unwrap();
        assert_eq!(
            render_line(&j),
            "[downloading]  42.0%  https://www.tiktok.com/@a/video/1"
        );
        let mut done = j.clone();
        done.complete(DownloadResult {
            title: "t".into(),
            filename: "tiktok_1_abcd1234.mp4".into(),
            file_size: 2 * 1_048_576,
            format: OutputFormat::Best,
        })
        .unwrap();
        assert_eq!(
            render_line(&done),
            "[completed] tiktok_1_abcd1234.mp4 (best, 2.0 MiB)"
        );
        j.fail(FailureKind::Fetch, "fetch failed: gone").unwrap();
        assert_eq!(render_line(&j), "[error] fetch failed: gone");
    }

    #[tokio::test]
    async fn poll_reports_changes_until_terminal() {
        let tracker = JobTracker::new(TrackerSettings::default());
        let j = job();
        tracker.insert(j.clone());
        let writer = tracker.clone();
        let id = j.id;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(15)).await;
            writer.mark_starting(id).unwrap();
            writer.record_progress(id, 50.0).unwrap();
            tokio::time::sleep(Duration::from_millis(15)).await;
            writer.fail(id, FailureKind::Fetch, "fetch failed: x").unwrap();
        });

        let mut seen = Vec::new();
        let last = poll_until_terminal(&tracker, id, Duration::from_millis(5), |job| {
            seen.push(job.status)
        })
        .await
        .unwrap();
        assert_eq!(last.status, JobStatus::Error);
        assert_eq!(seen.first(), Some(&JobStatus::Queued));
        assert_eq!(seen.last(), Some(&JobStatus::Error));
    }

    #[tokio::test]
    async fn poll_unknown_job_fails_fast() {
        let tracker = JobTracker::new(TrackerSettings::default());
        let err = poll_until_terminal(&tracker, uuid::Uuid::new_v4(), Duration::from_millis(5), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }
}
