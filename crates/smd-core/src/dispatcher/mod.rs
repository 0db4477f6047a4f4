//! Request dispatcher: validates submissions, creates jobs, and starts one
//! runner task per accepted job.

mod run;
mod validate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{InfoError, TrackerError, ValidationError};
use crate::fetcher::{FetcherRegistry, Metadata};
use crate::job::{DownloadJob, JobId};
use crate::platform::Platform;
use crate::tracker::JobTracker;

/// Slack on top of `cancel_grace` when waiting for a runner to exit.
const SETTLE_MARGIN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Directory fetchers write artifacts into.
    pub download_dir: PathBuf,
    /// A running job that publishes no change for this long fails with
    /// `timeout`. Also bounds a metadata preview.
    pub idle_timeout: Duration,
    /// How long a cancelled fetcher may keep running before it is dropped.
    pub cancel_grace: Duration,
}

impl DispatcherSettings {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            idle_timeout: Duration::from_secs(60),
            cancel_grace: Duration::from_secs(2),
        }
    }
}

/// Entry point for every caller (HTTP handlers, `smd get`).
#[derive(Clone)]
pub struct Dispatcher {
    tracker: JobTracker,
    fetchers: FetcherRegistry,
    settings: Arc<DispatcherSettings>,
}

impl Dispatcher {
    pub fn new(tracker: JobTracker, fetchers: FetcherRegistry, settings: DispatcherSettings) -> Self {
        Self {
            tracker,
            fetchers,
            settings: Arc::new(settings),
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn fetchers(&self) -> &FetcherRegistry {
        &self.fetchers
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Validates a download request and starts it. Returns as soon as the
    /// job is queued; the transfer runs on its own task, so this must be
    /// called from within a tokio runtime. No job is created on error.
    pub fn submit(
        &self,
        platform: &str,
        content_type: &str,
        url: &str,
        format: Option<&str>,
    ) -> Result<JobId, ValidationError> {
        let submission = validate::validate_submission(platform, content_type, url, format)?;
        let fetcher = self
            .fetchers
            .get(submission.platform)
            .ok_or(ValidationError::NoFetcher(submission.platform))?;

        let job = DownloadJob::new(
            submission.platform,
            submission.content_type,
            submission.format,
            submission.url.as_str(),
        );
        let job_id = job.id;
        let cancel = self.tracker.insert(job);
        tracing::info!(
            job_id = %job_id,
            platform = %submission.platform,
            content_type = %submission.content_type,
            format = %submission.format,
            url = %submission.url,
            "download accepted"
        );

        run::spawn_job(run::RunContext {
            tracker: self.tracker.clone(),
            fetcher,
            settings: Arc::clone(&self.settings),
            job_id,
            url: submission.url,
            content_type: submission.content_type,
            format: submission.format,
            cancel,
        });
        Ok(job_id)
    }

    /// Metadata preview for `url`; the platform is detected from the host.
    pub async fn info(&self, url: &str) -> Result<(Platform, Metadata), InfoError> {
        let url = validate::parse_url(url)?;
        let platform = validate::detect_platform(&url)?;
        let fetcher = self
            .fetchers
            .get(platform)
            .ok_or(ValidationError::NoFetcher(platform))?;
        let limit = self.settings.idle_timeout;
        let metadata = tokio::time::timeout(limit, fetcher.fetch_metadata(&url))
            .await
            .map_err(|_| InfoError::TimedOut(limit))??;
        Ok((platform, metadata))
    }

    /// Waits for the job's runner to exit. A cancelled fetcher gets
    /// `cancel_grace` to clean up, so this waits a little longer than that.
    pub async fn wait_settled(&self, job_id: JobId) -> bool {
        let limit = self.settings.cancel_grace + SETTLE_MARGIN;
        self.tracker.wait_settled(job_id, limit).await
    }

    /// Owner cancellation. The job is `error` when this returns; its fetcher
    /// stops in the background.
    pub fn cancel(&self, job_id: JobId) -> Result<DownloadJob, TrackerError> {
        let job = self.tracker.cancel(job_id)?;
        tracing::info!(job_id = %job_id, "download cancelled");
        Ok(job)
    }
}
