//! Route handlers. Each one maps straight onto a dispatcher or tracker call.

use std::time::Duration;

use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use smd_core::fetcher::Metadata;
use smd_core::{DownloadJob, JobId, Platform};
use tokio_util::io::ReaderStream;

use super::error::{ApiError, ApiResult};
use super::AppState;

/// Upper bound for `GET /progress/{id}?wait=N`.
const MAX_WAIT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default, rename = "type")]
    content_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadAccepted {
    job_id: JobId,
}

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    platform: Platform,
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    /// Long-poll for up to this many seconds.
    wait: Option<u64>,
}

/// Unparseable ids are reported like unknown ones.
fn parse_job_id(raw: &str) -> ApiResult<JobId> {
    JobId::parse_str(raw.trim()).map_err(|_| ApiError::not_found(format!("download not found: {raw}")))
}

pub async fn start_download(
    State(state): State<AppState>,
    platform: Result<Path<String>, PathRejection>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DownloadAccepted>)> {
    let Path(platform) = platform?;
    let Json(request) = body?;
    let job_id = state.dispatcher.submit(
        &platform,
        request.content_type.as_deref().unwrap_or_default(),
        request.url.as_deref().unwrap_or_default(),
        request.format.as_deref(),
    )?;
    Ok((StatusCode::ACCEPTED, Json(DownloadAccepted { job_id })))
}

pub async fn get_progress(
    State(state): State<AppState>,
    job_id: Result<Path<String>, PathRejection>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> ApiResult<Json<DownloadJob>> {
    let Path(job_id) = job_id?;
    let job_id = parse_job_id(&job_id)?;
    let Query(query) = query?;
    let tracker = state.dispatcher.tracker();
    let job = match query.wait.filter(|secs| *secs > 0) {
        Some(secs) => {
            let wait = Duration::from_secs(secs).min(MAX_WAIT);
            tracker.wait_for_change(job_id, wait).await?
        }
        None => tracker.get_status(job_id)?,
    };
    Ok(Json(job))
}

pub async fn get_info(
    State(state): State<AppState>,
    body: Result<Json<InfoRequest>, JsonRejection>,
) -> ApiResult<Json<InfoResponse>> {
    let Json(request) = body?;
    let (platform, metadata) = state
        .dispatcher
        .info(request.url.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(InfoResponse { platform, metadata }))
}

pub async fn download_file(
    State(state): State<AppState>,
    job_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let Path(job_id) = job_id?;
    let job_id = parse_job_id(&job_id)?;
    let artifact = state
        .dispatcher
        .tracker()
        .completed_artifact(job_id)?
        .ok_or_else(|| ApiError::not_found("download not completed"))?;
    let file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|_| ApiError::not_found("file not found"))?;
    let len = file
        .metadata()
        .await
        .map(|m| m.len())
        .unwrap_or(artifact.file_size);

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(header::CONTENT_DISPOSITION, attachment(&artifact.filename));
    Ok(response)
}

/// `attachment; filename="..."` with anything outside printable ASCII replaced.
fn attachment(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

pub async fn cancel_download(
    State(state): State<AppState>,
    job_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DownloadJob>> {
    let Path(job_id) = job_id?;
    let job_id = parse_job_id(&job_id)?;
    Ok(Json(state.dispatcher.cancel(job_id)?))
}

pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<DownloadJob>> {
    Json(state.dispatcher.tracker().list())
}

pub async fn health() -> &'static str {
    "ok"
}
