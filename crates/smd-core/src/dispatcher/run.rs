//! Per-job runner task.
//!
//! Drives one fetcher invocation and owns every transition the fetcher does
//! not report itself: `starting`, the terminal state, the idle timeout, and
//! the clean-up after a cancelled or timed-out fetch.

use std::any::Any;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::DispatcherSettings;
use crate::fetcher::{ContentResult, FetchError, FetchRequest, PlatformFetcher};
use crate::job::{FailureKind, JobId};
use crate::platform::{ContentType, OutputFormat};
use crate::tracker::{JobTracker, CANCELLED_MESSAGE};

pub(super) struct RunContext {
    pub tracker: JobTracker,
    pub fetcher: Arc<dyn PlatformFetcher>,
    pub settings: Arc<DispatcherSettings>,
    pub job_id: JobId,
    pub url: Url,
    pub content_type: ContentType,
    pub format: OutputFormat,
    pub cancel: CancellationToken,
}

/// Why the runner stopped waiting on the fetcher.
enum Outcome {
    Finished(Result<ContentResult, FetchError>),
    /// Cancelled by the owner, or the job went terminal elsewhere.
    Stopped,
    Idle,
}

/// Spawns the runner plus a supervisor that turns a panicking runner into
/// an `internal` failure instead of a job stuck mid-flight.
pub(super) fn spawn_job(ctx: RunContext) -> JoinHandle<()> {
    let tracker = ctx.tracker.clone();
    let job_id = ctx.job_id;
    let runner = tokio::spawn(run_job(ctx));
    tokio::spawn(async move {
        if let Err(e) = runner.await {
            let reason = if e.is_panic() {
                panic_message(e.into_panic())
            } else {
                "runner task aborted".to_string()
            };
            tracing::error!(job_id = %job_id, "job runner died: {}", reason);
            if let Err(e) =
                tracker.fail(job_id, FailureKind::Internal, format!("internal error: {reason}"))
            {
                tracing::debug!(job_id = %job_id, "could not record runner failure: {}", e);
            }
        }
        tracker.mark_settled(job_id);
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "fetcher panicked".to_string()
    }
}

async fn run_job(ctx: RunContext) {
    let RunContext {
        tracker,
        fetcher,
        settings,
        job_id,
        url,
        content_type,
        format,
        cancel,
    } = ctx;

    let mut sub = match tracker.subscribe(job_id) {
        Ok(sub) => sub,
        Err(e) => {
            tracing::debug!(job_id = %job_id, "job vanished before start: {}", e);
            return;
        }
    };
    // Fails when the job was cancelled while still queued.
    if let Err(e) = tracker.mark_starting(job_id) {
        tracing::debug!(job_id = %job_id, "job not started: {}", e);
        return;
    }

    let sink = tracker.progress_sink(job_id);
    let mut fetch = fetcher.fetch_content(FetchRequest {
        url: &url,
        content_type,
        format,
        output_dir: &settings.download_dir,
        progress: &sink,
        cancel: &cancel,
    });

    let outcome = loop {
        tokio::select! {
            result = &mut fetch => break Outcome::Finished(result),
            _ = cancel.cancelled() => break Outcome::Stopped,
            changed = tokio::time::timeout(settings.idle_timeout, sub.changed()) => match changed {
                Ok(Some(job)) if job.status.is_terminal() => break Outcome::Stopped,
                Ok(Some(_)) => continue,
                Ok(None) => break Outcome::Stopped,
                Err(_) => break Outcome::Idle,
            },
        }
    };

    match outcome {
        Outcome::Finished(Ok(content)) => finish(&tracker, job_id, content).await,
        Outcome::Finished(Err(e)) => {
            let (kind, message) = match &e {
                FetchError::Cancelled => (FailureKind::Cancelled, CANCELLED_MESSAGE.to_string()),
                other => (FailureKind::Fetch, format!("fetch failed: {other}")),
            };
            if let Err(e) = tracker.fail(job_id, kind, message) {
                tracing::debug!(job_id = %job_id, "fetch error not recorded: {}", e);
            }
        }
        Outcome::Idle => {
            let message = format!("timed out: no progress for {:?}", settings.idle_timeout);
            if let Err(e) = tracker.fail(job_id, FailureKind::Timeout, message) {
                tracing::debug!(job_id = %job_id, "timeout not recorded: {}", e);
            }
            cancel.cancel();
            wind_down(job_id, fetch, &settings).await;
        }
        Outcome::Stopped => {
            cancel.cancel();
            wind_down(job_id, fetch, &settings).await;
        }
    }
}

/// Records success, or discards the artifact if the job already ended.
async fn finish(tracker: &JobTracker, job_id: JobId, content: ContentResult) {
    let path = content.path.clone();
    match tracker.complete(job_id, content) {
        Ok(_) => tracing::info!(job_id = %job_id, path = %path.display(), "download completed"),
        Err(e) => {
            tracing::debug!(job_id = %job_id, "result discarded: {}", e);
            discard(job_id, &path).await;
        }
    }
}

/// Gives a cancelled fetcher `cancel_grace` to return, then drops it.
async fn wind_down<F>(job_id: JobId, fetch: F, settings: &DispatcherSettings)
where
    F: std::future::Future<Output = Result<ContentResult, FetchError>> + Unpin,
{
    match tokio::time::timeout(settings.cancel_grace, fetch).await {
        Ok(Ok(content)) => {
            tracing::debug!(job_id = %job_id, "fetcher finished after cancellation");
            discard(job_id, &content.path).await;
        }
        Ok(Err(_)) => {}
        Err(_) => {
            tracing::warn!(
                job_id = %job_id,
                "fetcher ignored cancellation for {:?}; dropping it",
                settings.cancel_grace
            );
        }
    }
}

async fn discard(job_id: JobId, path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(job_id = %job_id, path = %path.display(), "remove artifact: {}", e);
        }
    }
}
