//! Caller-facing error taxonomy.
//!
//! Validation and lookup errors return straight to the caller. Fetch failures
//! of an in-flight job never surface here; they end up in the job's terminal
//! `error` state instead.

use std::time::Duration;

use crate::fetcher::FetchError;
use crate::job::{JobId, JobStatus};
use crate::platform::Platform;

/// Bad input. Never retried; maps to 4xx.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported platform: {0}")]
    UnknownPlatform(String),
    #[error("unsupported content type '{content_type}' for {platform}")]
    UnsupportedContentType {
        platform: Platform,
        content_type: String,
    },
    #[error("URL is required")]
    EmptyUrl,
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },
    #[error("URL host '{host}' does not belong to {platform}")]
    PlatformMismatch { platform: Platform, host: String },
    #[error("no supported platform recognized for URL '{0}'")]
    UndetectedPlatform(String),
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    #[error("no fetcher registered for {0}")]
    NoFetcher(Platform),
}

/// Job lookup and state-machine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("download not found: {0}")]
    NotFound(JobId),
    #[error("job {id}: illegal transition {from} -> {to}")]
    IllegalTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Failure of a metadata preview.
#[derive(Debug, thiserror::Error)]
pub enum InfoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unable to fetch content information: {0}")]
    Fetch(#[from] FetchError),
    #[error("unable to fetch content information: no answer within {0:?}")]
    TimedOut(Duration),
}
