//! Job tracker: owns the lifecycle of every download job.
//!
//! Each job lives in its own `watch` channel. All mutations go through
//! `send_if_modified` on that job's sender, so writes to one job are
//! serialized while pollers only clone the last published snapshot and never
//! wait on an in-flight fetcher. The job map lock is held for lookups only.

mod sink;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::control::JobControl;
use crate::error::TrackerError;
use crate::fetcher::ContentResult;
use crate::job::{DownloadJob, DownloadResult, FailureKind, JobId, TransitionError};

pub use sink::ProgressSink;

/// Message carried by jobs cancelled by their owner.
pub const CANCELLED_MESSAGE: &str = "cancelled by user";

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// How long a terminal job stays visible before the sweep drops it.
    pub retention: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(3600),
        }
    }
}

/// Server-side state of one job: the public snapshot plus bookkeeping that
/// is never serialized.
#[derive(Debug, Clone)]
pub(crate) struct JobRecord {
    pub(crate) job: DownloadJob,
    pub(crate) artifact: Option<PathBuf>,
    pub(crate) finished_at: Option<Instant>,
}

/// Location of a completed job's artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: PathBuf,
    pub filename: String,
    pub file_size: u64,
}

type Slot = Arc<watch::Sender<JobRecord>>;

struct Inner {
    jobs: RwLock<HashMap<JobId, Slot>>,
    control: JobControl,
    settings: TrackerSettings,
}

/// Cheap-to-clone handle to the shared job table.
#[derive(Clone)]
pub struct JobTracker {
    inner: Arc<Inner>,
}

impl JobTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                jobs: RwLock::new(HashMap::new()),
                control: JobControl::new(),
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.inner.settings
    }

    fn jobs_read(&self) -> RwLockReadGuard<'_, HashMap<JobId, Slot>> {
        self.inner.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn jobs_write(&self) -> RwLockWriteGuard<'_, HashMap<JobId, Slot>> {
        self.inner.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, id: JobId) -> Result<Slot, TrackerError> {
        self.jobs_read()
            .get(&id)
            .cloned()
            .ok_or(TrackerError::NotFound(id))
    }

    /// Starts tracking a job. Returns the token that cancels its fetcher.
    pub fn insert(&self, job: DownloadJob) -> CancellationToken {
        let id = job.id;
        let token = self.inner.control.register(id);
        let (tx, _rx) = watch::channel(JobRecord {
            job,
            artifact: None,
            finished_at: None,
        });
        self.jobs_write().insert(id, Arc::new(tx));
        tracing::debug!(job_id = %id, "job tracked");
        token
    }

    /// Last published snapshot of a job. Fails for unknown or expired ids.
    pub fn get_status(&self, id: JobId) -> Result<DownloadJob, TrackerError> {
        Ok(self.slot(id)?.borrow().job.clone())
    }

    /// Snapshots of all live jobs, oldest first.
    pub fn list(&self) -> Vec<DownloadJob> {
        let slots: Vec<Slot> = self.jobs_read().values().cloned().collect();
        let mut jobs: Vec<DownloadJob> = slots.iter().map(|s| s.borrow().job.clone()).collect();
        jobs.sort_by_key(|j| j.created_at);
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push-style reader: yields every snapshot published after this call.
    pub fn subscribe(&self, id: JobId) -> Result<JobSubscription, TrackerError> {
        Ok(JobSubscription {
            rx: self.slot(id)?.subscribe(),
        })
    }

    /// Long-poll: the next published snapshot, or the current one once
    /// `timeout` elapses without a change. A terminal job never changes
    /// again, so its snapshot is returned right away.
    pub async fn wait_for_change(
        &self,
        id: JobId,
        timeout: Duration,
    ) -> Result<DownloadJob, TrackerError> {
        let mut sub = self.subscribe(id)?;
        let current = sub.current();
        if current.status.is_terminal() {
            return Ok(current);
        }
        match tokio::time::timeout(timeout, sub.changed()).await {
            Ok(Some(job)) => Ok(job),
            Ok(None) => Err(TrackerError::NotFound(id)),
            Err(_) => Ok(sub.current()),
        }
    }

    /// The artifact of a completed job; `Ok(None)` while the job is not completed.
    pub fn completed_artifact(&self, id: JobId) -> Result<Option<Artifact>, TrackerError> {
        let slot = self.slot(id)?;
        let record = slot.borrow();
        let artifact = match (&record.job.result, &record.artifact) {
            (Some(result), Some(path)) => Some(Artifact {
                path: path.clone(),
                filename: result.filename.clone(),
                file_size: result.file_size,
            }),
            _ => None,
        };
        Ok(artifact)
    }

    /// Progress callback handed to the job's fetcher.
    pub fn progress_sink(&self, id: JobId) -> ProgressSink {
        ProgressSink::new(self.clone(), id)
    }

    /// Applies `f` to the job under its single-writer slot and publishes the
    /// result if it changed anything.
    fn update<F>(&self, id: JobId, f: F) -> Result<bool, TrackerError>
    where
        F: FnOnce(&mut JobRecord) -> Result<bool, TransitionError>,
    {
        let slot = self.slot(id)?;
        let mut outcome = Ok(false);
        slot.send_if_modified(|record| {
            let before = record.job.status;
            let result = f(record);
            let changed = matches!(result, Ok(true));
            if changed {
                let after = record.job.status;
                if after.is_terminal() && record.finished_at.is_none() {
                    record.finished_at = Some(Instant::now());
                }
                if before != after {
                    tracing::debug!(job_id = %id, from = %before, to = %after, "job transition");
                }
            }
            outcome = result;
            changed
        });
        outcome.map_err(|e| TrackerError::IllegalTransition {
            id,
            from: e.from,
            to: e.to,
        })
    }

    pub fn mark_starting(&self, id: JobId) -> Result<bool, TrackerError> {
        self.update(id, |r| r.job.start())
    }

    pub fn record_progress(&self, id: JobId, percent: f32) -> Result<bool, TrackerError> {
        self.update(id, |r| r.job.record_progress(percent))
    }

    pub fn begin_processing(&self, id: JobId) -> Result<bool, TrackerError> {
        self.update(id, |r| r.job.begin_processing())
    }

    /// Terminal success: publishes the result and remembers the artifact path.
    pub fn complete(&self, id: JobId, content: ContentResult) -> Result<bool, TrackerError> {
        let ContentResult {
            title,
            filename,
            path,
            file_size,
            format,
        } = content;
        self.update(id, move |r| {
            let changed = r.job.complete(DownloadResult {
                title,
                filename,
                file_size,
                format,
            })?;
            r.artifact = Some(path);
            Ok(changed)
        })
    }

    /// Terminal failure from any non-terminal state.
    pub fn fail(
        &self,
        id: JobId,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Result<bool, TrackerError> {
        let message = message.into();
        let changed = self.update(id, |r| r.job.fail(kind, message.clone()))?;
        if changed {
            tracing::info!(job_id = %id, ?kind, "job failed: {}", message);
        }
        Ok(changed)
    }

    /// Owner cancellation: the job moves to `error` right away and its
    /// fetcher is signalled to stop.
    pub fn cancel(&self, id: JobId) -> Result<DownloadJob, TrackerError> {
        self.fail(id, FailureKind::Cancelled, CANCELLED_MESSAGE)?;
        self.inner.control.request_abort(id);
        self.get_status(id)
    }

    /// Called by the job's supervisor once its runner task has exited.
    pub(crate) fn mark_settled(&self, id: JobId) {
        self.inner.control.mark_settled(id);
    }

    /// Waits up to `limit` for the job's runner to exit, including the
    /// wind-down of a cancelled fetcher. True once it has exited or the job
    /// is gone; false if `limit` elapsed first.
    pub async fn wait_settled(&self, id: JobId, limit: Duration) -> bool {
        match self.inner.control.settled(id) {
            Some(settled) => tokio::time::timeout(limit, settled.cancelled()).await.is_ok(),
            None => true,
        }
    }

    /// Drops terminal jobs older than the retention window, deleting their
    /// artifacts. Returns how many jobs were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let retention = self.inner.settings.retention;
        let mut expired: Vec<(JobId, Option<PathBuf>)> = Vec::new();
        self.jobs_write().retain(|id, slot| {
            let record = slot.borrow();
            let is_expired = record
                .finished_at
                .is_some_and(|t| now.saturating_duration_since(t) >= retention);
            if is_expired {
                expired.push((*id, record.artifact.clone()));
            }
            !is_expired
        });

        for (id, artifact) in &expired {
            self.inner.control.unregister(*id);
            if let Some(path) = artifact {
                match std::fs::remove_file(path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        tracing::warn!(job_id = %id, path = %path.display(), "remove artifact: {}", e)
                    }
                }
            }
            tracing::debug!(job_id = %id, "job expired");
        }
        expired.len()
    }

    /// Runs `sweep_expired` every `interval` until the runtime shuts down.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = tracker.sweep_expired();
                if removed > 0 {
                    tracing::info!("expired {} job(s)", removed);
                }
            }
        })
    }
}

/// Receives every snapshot of one job published after subscription.
pub struct JobSubscription {
    rx: watch::Receiver<JobRecord>,
}

impl JobSubscription {
    pub fn current(&self) -> DownloadJob {
        self.rx.borrow().job.clone()
    }

    /// Waits for the next published snapshot. None once the job has been
    /// dropped from the tracker.
    pub async fn changed(&mut self) -> Option<DownloadJob> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().job.clone())
    }
}
