//! Shared helpers for dispatcher integration tests: scripted fetchers whose
//! behavior is fixed up front, and a dispatcher wired to a temp directory.

#![allow(dead_code)]

pub mod scripted;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use smd_core::fetcher::{DemoSettings, FetcherRegistry, PlatformFetcher};
use smd_core::job::{DownloadJob, JobId, JobStatus};
use smd_core::reporter;
use smd_core::{Dispatcher, DispatcherSettings, JobTracker, TrackerSettings};

pub const POLL: Duration = Duration::from_millis(5);

pub fn fast_demo() -> DemoSettings {
    DemoSettings {
        step_delay: Duration::from_millis(2),
        processing_delay: Duration::from_millis(2),
        artifact_bytes: 128 * 1024,
    }
}

pub fn settings(dir: &Path) -> DispatcherSettings {
    DispatcherSettings {
        download_dir: dir.to_path_buf(),
        idle_timeout: Duration::from_secs(5),
        cancel_grace: Duration::from_millis(200),
    }
}

pub fn dispatcher(registry: FetcherRegistry, settings: DispatcherSettings) -> Dispatcher {
    Dispatcher::new(JobTracker::new(TrackerSettings::default()), registry, settings)
}

pub fn with_fetcher(fetcher: Arc<dyn PlatformFetcher>, settings: DispatcherSettings) -> Dispatcher {
    dispatcher(FetcherRegistry::new().with(fetcher), settings)
}

/// Polls until terminal, collecting every distinct snapshot seen.
pub async fn run_to_end(dispatcher: &Dispatcher, id: JobId) -> (DownloadJob, Vec<DownloadJob>) {
    let mut seen = Vec::new();
    let last = tokio::time::timeout(
        Duration::from_secs(10),
        reporter::poll_until_terminal(dispatcher.tracker(), id, POLL, |job| seen.push(job.clone())),
    )
    .await
    .expect("job did not finish in time")
    .expect("job vanished");
    (last, seen)
}

pub fn rank(status: JobStatus) -> u8 {
    match status {
        JobStatus::Queued => 0,
        JobStatus::Starting => 1,
        JobStatus::Downloading => 2,
        JobStatus::Processing => 3,
        JobStatus::Completed | JobStatus::Error => 4,
    }
}

/// Waits until `f` holds, checking every poll interval.
pub async fn eventually<F: Fn() -> bool>(f: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !f() {
            tokio::time::sleep(POLL).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
