use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::job::JobId;
use crate::platform::{ContentType, OutputFormat};
use crate::tracker::ProgressSink;

/// Preview of a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub author: String,
    /// Seconds; None for stills and text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub description: String,
    /// Output formats a download of this content can request.
    pub formats: Vec<OutputFormat>,
}

/// Everything a fetcher needs for one download.
pub struct FetchRequest<'a> {
    pub url: &'a Url,
    pub content_type: ContentType,
    pub format: OutputFormat,
    pub output_dir: &'a Path,
    pub progress: &'a ProgressSink,
    pub cancel: &'a CancellationToken,
}

impl FetchRequest<'_> {
    pub fn job_id(&self) -> JobId {
        self.progress.job_id()
    }
}

/// Artifact produced by a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentResult {
    pub title: String,
    pub filename: String,
    pub path: PathBuf,
    pub file_size: u64,
    pub format: OutputFormat,
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with "...".
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
