//! Fetcher that follows a fixed script instead of talking to a platform.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use smd_core::fetcher::{ContentResult, FetchError, FetchRequest, Metadata, PlatformFetcher};
use smd_core::{OutputFormat, Platform};
use url::Url;

#[derive(Debug, Clone)]
pub enum Script {
    /// Reports each step, then writes a small artifact.
    Complete(Vec<f32>),
    /// Reports each step, then fails with a network error.
    FailAfter(Vec<f32>, &'static str),
    /// Reports each step after `every`, then writes a small artifact.
    Paced(Vec<f32>, Duration),
    /// Reports nothing and waits for cancellation.
    Stall,
    /// Metadata lookups never answer; transfers behave like `Stall`.
    Unresponsive,
    /// Never looks at the token; finishes after `hold`.
    IgnoreCancel(Duration),
    Panic,
}

pub struct ScriptedFetcher {
    platform: Platform,
    script: Script,
    invocations: AtomicUsize,
    saw_cancel: AtomicBool,
}

impl ScriptedFetcher {
    pub fn new(platform: Platform, script: Script) -> Arc<Self> {
        Arc::new(Self {
            platform,
            script,
            invocations: AtomicUsize::new(0),
            saw_cancel: AtomicBool::new(false),
        })
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn saw_cancel(&self) -> bool {
        self.saw_cancel.load(Ordering::SeqCst)
    }
}

async fn write_small(request: &FetchRequest<'_>) -> Result<ContentResult, FetchError> {
    let filename = format!("scripted_{}.bin", request.job_id().simple());
    let path = request.output_dir.join(&filename);
    tokio::fs::create_dir_all(request.output_dir).await?;
    tokio::fs::write(&path, b"scripted artifact").await?;
    Ok(ContentResult {
        title: "Scripted".to_string(),
        filename,
        path,
        file_size: 17,
        format: request.format,
    })
}

#[async_trait]
impl PlatformFetcher for ScriptedFetcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch_metadata(&self, _url: &Url) -> Result<Metadata, FetchError> {
        match &self.script {
            Script::FailAfter(_, reason) => Err(FetchError::Unavailable(reason.to_string())),
            Script::Unresponsive => std::future::pending().await,
            _ => Ok(Metadata {
                title: "Scripted".to_string(),
                author: "script".to_string(),
                duration: Some(1),
                view_count: None,
                like_count: None,
                thumbnail: None,
                description: String::new(),
                formats: vec![OutputFormat::Best],
            }),
        }
    }

    async fn fetch_content(&self, request: FetchRequest<'_>) -> Result<ContentResult, FetchError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Complete(steps) => {
                for step in steps {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    request.progress.report(*step);
                }
                write_small(&request).await
            }
            Script::FailAfter(steps, reason) => {
                for step in steps {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    request.progress.report(*step);
                }
                Err(FetchError::Network(reason.to_string()))
            }
            Script::Paced(steps, every) => {
                for step in steps {
                    tokio::time::sleep(*every).await;
                    request.progress.report(*step);
                }
                write_small(&request).await
            }
            Script::Stall | Script::Unresponsive => {
                request.cancel.cancelled().await;
                self.saw_cancel.store(true, Ordering::SeqCst);
                Err(FetchError::Cancelled)
            }
            Script::IgnoreCancel(hold) => {
                tokio::time::sleep(*hold).await;
                write_small(&request).await
            }
            Script::Panic => panic!("scripted fetcher exploded"),
        }
    }
}
