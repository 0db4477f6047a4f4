use async_trait::async_trait;
use url::Url;

use super::demo::{self, DemoArtifact, DemoSettings};
use super::{ContentResult, FetchError, FetchRequest, Metadata, PlatformFetcher};
use crate::platform::{ContentType, Platform};
use crate::url_model::{first_segment, query_value, segment_after};

const DESCRIPTION_LIMIT: usize = 500;

pub struct YoutubeFetcher {
    settings: DemoSettings,
}

impl YoutubeFetcher {
    pub fn new(settings: DemoSettings) -> Self {
        Self { settings }
    }
}

/// `youtu.be/<id>`, `watch?v=<id>`, `/shorts/<id>`, `/embed/<id>`, `/live/<id>`.
fn video_id(url: &Url) -> Option<String> {
    if url.host_str().is_some_and(|h| h.eq_ignore_ascii_case("youtu.be")) {
        return first_segment(url);
    }
    query_value(url, "v")
        .or_else(|| segment_after(url, "shorts"))
        .or_else(|| segment_after(url, "embed"))
        .or_else(|| segment_after(url, "live"))
}

fn playlist_id(url: &Url) -> Option<String> {
    query_value(url, "list")
}

#[async_trait]
impl PlatformFetcher for YoutubeFetcher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn fetch_metadata(&self, url: &Url) -> Result<Metadata, FetchError> {
        if let Some(id) = video_id(url) {
            return Ok(demo::demo_metadata(
                Platform::Youtube,
                format!("Demo YouTube Content ({id})"),
                DESCRIPTION_LIMIT,
            ));
        }
        let list = playlist_id(url)
            .ok_or_else(|| FetchError::Unsupported(format!("no video or playlist id in {url}")))?;
        Ok(Metadata {
            duration: None,
            ..demo::demo_metadata(
                Platform::Youtube,
                format!("Demo YouTube Playlist ({list})"),
                DESCRIPTION_LIMIT,
            )
        })
    }

    async fn fetch_content(&self, request: FetchRequest<'_>) -> Result<ContentResult, FetchError> {
        let artifact = match request.content_type {
            ContentType::Playlist => {
                let list = playlist_id(request.url).ok_or_else(|| {
                    FetchError::Unsupported(format!("no playlist id in {}", request.url))
                })?;
                DemoArtifact {
                    title: format!("Demo YouTube Playlist ({list})"),
                    stem: format!("youtube_playlist_{list}"),
                    body: None,
                }
            }
            _ => {
                let id = video_id(request.url).ok_or_else(|| {
                    FetchError::Unsupported(format!("no video id in {}", request.url))
                })?;
                DemoArtifact {
                    title: format!("Demo YouTube Content ({id})"),
                    stem: format!("youtube_{id}"),
                    body: None,
                }
            }
        };
        demo::run_transfer(&self.settings, &request, artifact).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn video_id_forms() {
        assert_eq!(video_id(&url("https://youtu.be/abc")).as_deref(), Some("abc"));
        assert_eq!(
            video_id(&url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1")).as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id(&url("https://youtube.com/shorts/s1")).as_deref(),
            Some("s1")
        );
        assert_eq!(video_id(&url("https://youtube.com/feed/trending")), None);
    }

    #[tokio::test]
    async fn metadata_for_playlist_has_no_duration() {
        let f = YoutubeFetcher::new(DemoSettings::default());
        let meta = f
            .fetch_metadata(&url("https://www.youtube.com/playlist?list=PL123"))
            .await
            .unwrap();
        assert_eq!(meta.title, "Demo YouTube Playlist (PL123)");
        assert!(meta.duration.is_none());
    }

    #[tokio::test]
    async fn metadata_without_any_id_is_unsupported() {
        let f = YoutubeFetcher::new(DemoSettings::default());
        let err = f
            .fetch_metadata(&url("https://www.youtube.com/"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unsupported(_)));
    }
}
