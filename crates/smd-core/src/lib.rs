pub mod config;
pub mod logging;

pub mod control;
pub mod dispatcher;
pub mod error;
pub mod fetcher;
pub mod job;
pub mod platform;
pub mod reporter;
pub mod tracker;
pub mod url_model;

pub use dispatcher::{Dispatcher, DispatcherSettings};
pub use error::{InfoError, TrackerError, ValidationError};
pub use fetcher::{FetcherRegistry, PlatformFetcher};
pub use job::{DownloadJob, DownloadResult, FailureKind, JobId, JobStatus};
pub use platform::{ContentType, OutputFormat, Platform};
pub use tracker::{JobTracker, TrackerSettings};
