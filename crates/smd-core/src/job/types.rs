use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::platform::{ContentType, OutputFormat, Platform};

/// Job identifier, generated at submission time.
pub type JobId = Uuid;

/// Lifecycle state of a job.
///
/// `Queued -> Starting -> Downloading -> Processing -> Completed`, with `Error`
/// reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Starting,
    Downloading,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Starting => "starting",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Whether `progress` carries meaning in this state.
    pub fn has_progress(self) -> bool {
        matches!(self, JobStatus::Downloading | JobStatus::Processing)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Starting => 1,
            JobStatus::Downloading => 2,
            JobStatus::Processing => 3,
            JobStatus::Completed | JobStatus::Error => 4,
        }
    }

    /// Forward-only transition rule. Terminal states accept nothing;
    /// `Error` is reachable from any other state.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == JobStatus::Error || next.rank() > self.rank()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cause of a terminal `error` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The platform fetcher reported a failure (network, unsupported URL, ...).
    Fetch,
    /// The fetcher published no state change within the idle timeout.
    Timeout,
    /// The owner cancelled the job.
    Cancelled,
    /// The job runner itself failed.
    Internal,
}

/// Outcome of a completed job, as exposed to pollers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub title: String,
    pub filename: String,
    pub file_size: u64,
    pub format: OutputFormat,
}

/// Published snapshot of one download job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadJob {
    pub id: JobId,
    pub platform: Platform,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub format: OutputFormat,
    pub source_url: String,
    pub status: JobStatus,
    /// Percentage in [0, 100]; ignored by readers outside downloading/processing.
    pub progress: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DownloadResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DownloadJob {
    /// A fresh job in `queued` state with a new id.
    pub fn new(
        platform: Platform,
        content_type: ContentType,
        format: OutputFormat,
        source_url: impl Into<String>,
    ) -> Self {
        let now = unix_timestamp();
        Self {
            id: Uuid::new_v4(),
            platform,
            content_type,
            format,
            source_url: source_url.into(),
            status: JobStatus::Queued,
            progress: 0.0,
            result: None,
            error: None,
            error_kind: None,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
