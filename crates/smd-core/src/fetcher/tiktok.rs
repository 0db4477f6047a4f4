use async_trait::async_trait;
use url::Url;

use super::demo::{self, DemoArtifact, DemoSettings};
use super::{ContentResult, FetchError, FetchRequest, Metadata, PlatformFetcher};
use crate::platform::Platform;
use crate::url_model::{first_segment, segment_after};

const DESCRIPTION_LIMIT: usize = 200;

pub struct TiktokFetcher {
    settings: DemoSettings,
}

impl TiktokFetcher {
    pub fn new(settings: DemoSettings) -> Self {
        Self { settings }
    }
}

/// `/@user/video/<id>`, or the short code of `vm.tiktok.com/<code>`.
fn video_id(url: &Url) -> Option<String> {
    segment_after(url, "video").or_else(|| first_segment(url).filter(|s| !s.starts_with('@')))
}

fn author(url: &Url) -> Option<String> {
    first_segment(url).filter(|s| s.starts_with('@'))
}

#[async_trait]
impl PlatformFetcher for TiktokFetcher {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    /// Never fails: an unrecognized URL still yields a basic preview.
    async fn fetch_metadata(&self, url: &Url) -> Result<Metadata, FetchError> {
        let base = demo::demo_metadata(Platform::Tiktok, "TikTok Video".to_string(), DESCRIPTION_LIMIT);
        let Some(id) = video_id(url) else {
            tracing::debug!(%url, "no TikTok video id, returning basic metadata");
            return Ok(Metadata {
                author: "Unknown".to_string(),
                duration: None,
                view_count: None,
                like_count: None,
                thumbnail: None,
                ..base
            });
        };
        Ok(Metadata {
            title: format!("Demo TikTok Video ({id})"),
            author: author(url).unwrap_or(base.author.clone()),
            duration: Some(30),
            ..base
        })
    }

    async fn fetch_content(&self, request: FetchRequest<'_>) -> Result<ContentResult, FetchError> {
        let id = video_id(request.url)
            .ok_or_else(|| FetchError::Unsupported(format!("no TikTok video id in {}", request.url)))?;
        let artifact = DemoArtifact {
            title: format!("Demo TikTok Video ({id})"),
            stem: format!("tiktok_{id}"),
            body: None,
        };
        demo::run_transfer(&self.settings, &request, artifact).await
    }
}
