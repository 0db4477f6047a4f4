//! Simulated transfer shared by the demo fetchers.
//!
//! Reports staged progress (10, 25, 50, 75, 90), enters processing, then
//! writes a deterministic artifact. The cancellation token is checked between
//! every step and every written chunk; a partially written artifact is removed.

use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::{ContentResult, FetchError, FetchRequest, Metadata};
use crate::job::JobId;
use crate::platform::{ContentType, OutputFormat, Platform};
use crate::url_model;

const PROGRESS_STEPS: [f32; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];
const CHUNK: usize = 64 * 1024;

/// Pacing and size of the simulated transfer.
#[derive(Debug, Clone)]
pub struct DemoSettings {
    pub step_delay: Duration,
    pub processing_delay: Duration,
    /// Artifact size; at least one byte is always written.
    pub artifact_bytes: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(500),
            processing_delay: Duration::from_secs(1),
            artifact_bytes: 25 * 1024 * 1024,
        }
    }
}

/// What a platform fetcher asks the simulator to produce.
pub(super) struct DemoArtifact {
    pub title: String,
    /// Filename stem before sanitization and the job suffix.
    pub stem: String,
    /// Fixed artifact body (e.g. a tweet's JSON); None = patterned bytes.
    pub body: Option<Vec<u8>>,
}

/// `jpg` for images, `json` for tweets, `mp3` for audio, `mp4` otherwise.
pub(super) fn extension_for(content_type: ContentType, format: OutputFormat) -> &'static str {
    match (content_type, format) {
        (ContentType::Image, _) => "jpg",
        (ContentType::Tweet, _) => "json",
        (_, OutputFormat::Audio) => "mp3",
        _ => "mp4",
    }
}

/// Baseline preview every demo fetcher starts from.
pub(super) fn demo_metadata(platform: Platform, title: String, description_limit: usize) -> Metadata {
    let name = platform.display_name();
    let description = format!(
        "This is a demo {name} item served by smd. A real {name} fetcher would return the \
         platform's own description, statistics, and thumbnail here instead of these fixed values."
    );
    Metadata {
        title,
        author: "Demo User".to_string(),
        duration: Some(180),
        view_count: Some(1_000_000),
        like_count: Some(50_000),
        thumbnail: Some(format!(
            "https://via.placeholder.com/320x240.png?text=Demo+{}",
            name.replace(' ', "+")
        )),
        description: super::truncate_description(&description, description_limit),
        formats: OutputFormat::ALL.to_vec(),
    }
}

async fn pause(cancel: &CancellationToken, delay: Duration) -> Result<(), FetchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

async fn write_artifact(
    path: &Path,
    artifact: &DemoArtifact,
    len: u64,
    cancel: &CancellationToken,
) -> Result<u64, FetchError> {
    let mut file = tokio::fs::File::create(path).await?;
    if let Some(body) = &artifact.body {
        file.write_all(body).await?;
        file.flush().await?;
        return Ok(body.len() as u64);
    }
    let chunk: Vec<u8> = (0u8..=250).cycle().take(CHUNK).collect();
    let mut written = 0u64;
    while written < len {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        let n = (len - written).min(CHUNK as u64) as usize;
        file.write_all(&chunk[..n]).await?;
        written += n as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Removes a partially written artifact. A file that never got created is fine.
pub(super) async fn remove_partial(job_id: JobId, path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(job_id = %job_id, path = %path.display(), "remove partial artifact: {}", e);
        }
    }
}

/// Runs the simulated transfer for `request` and writes the artifact.
pub(super) async fn run_transfer(
    settings: &DemoSettings,
    request: &FetchRequest<'_>,
    artifact: DemoArtifact,
) -> Result<ContentResult, FetchError> {
    for step in PROGRESS_STEPS {
        pause(request.cancel, settings.step_delay).await?;
        request.progress.report(step);
    }
    request.progress.begin_processing();
    pause(request.cancel, settings.processing_delay).await?;

    let extension = extension_for(request.content_type, request.format);
    let filename = url_model::artifact_filename(&artifact.stem, request.job_id(), extension);
    tokio::fs::create_dir_all(request.output_dir).await?;
    let path = request.output_dir.join(&filename);

    let file_size =
        match write_artifact(&path, &artifact, settings.artifact_bytes.max(1), request.cancel).await {
            Ok(n) => n,
            Err(e) => {
                remove_partial(request.job_id(), &path).await;
                return Err(e);
            }
        };
    tracing::debug!(job_id = %request.job_id(), path = %path.display(), file_size, "artifact written");

    Ok(ContentResult {
        title: artifact.title,
        filename,
        path,
        file_size,
        format: request.format,
    })
}
