use async_trait::async_trait;
use url::Url;

use super::demo::{self, DemoArtifact, DemoSettings};
use super::{ContentResult, FetchError, FetchRequest, Metadata, PlatformFetcher};
use crate::platform::{ContentType, Platform};
use crate::url_model::{first_segment, query_value, segment_after};

const DESCRIPTION_LIMIT: usize = 300;

pub struct FacebookFetcher {
    settings: DemoSettings,
}

impl FacebookFetcher {
    pub fn new(settings: DemoSettings) -> Self {
        Self { settings }
    }
}

/// `/videos/<id>`, `watch?v=<id>`, `/reel/<id>`, or `fb.watch/<id>`.
fn video_id(url: &Url) -> Option<String> {
    if url.host_str().is_some_and(|h| h.eq_ignore_ascii_case("fb.watch")) {
        return first_segment(url);
    }
    segment_after(url, "videos")
        .or_else(|| query_value(url, "v"))
        .or_else(|| segment_after(url, "reel"))
}

/// `photo.php?fbid=<id>` or `/photos/<album>/<id>`.
fn image_id(url: &Url) -> Option<String> {
    query_value(url, "fbid").or_else(|| {
        let album = segment_after(url, "photos")?;
        segment_after(url, &album).or(Some(album))
    })
}

fn id_for(content_type: ContentType, url: &Url) -> Option<String> {
    match content_type {
        ContentType::Image => image_id(url),
        _ => video_id(url),
    }
}

#[async_trait]
impl PlatformFetcher for FacebookFetcher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn fetch_metadata(&self, url: &Url) -> Result<Metadata, FetchError> {
        if let Some(id) = video_id(url) {
            return Ok(demo::demo_metadata(
                Platform::Facebook,
                format!("Demo Facebook Video ({id})"),
                DESCRIPTION_LIMIT,
            ));
        }
        let id = image_id(url)
            .ok_or_else(|| FetchError::Unsupported(format!("no Facebook video or photo id in {url}")))?;
        Ok(Metadata {
            duration: None,
            view_count: None,
            ..demo::demo_metadata(
                Platform::Facebook,
                format!("Demo Facebook Photo ({id})"),
                DESCRIPTION_LIMIT,
            )
        })
    }

    async fn fetch_content(&self, request: FetchRequest<'_>) -> Result<ContentResult, FetchError> {
        let id = id_for(request.content_type, request.url).ok_or_else(|| {
            FetchError::Unsupported(format!(
                "no Facebook {} id in {}",
                request.content_type, request.url
            ))
        })?;
        let (title, stem) = match request.content_type {
            ContentType::Image => (format!("Demo Facebook Photo ({id})"), format!("facebook_image_{id}")),
            _ => (format!("Demo Facebook Video ({id})"), format!("facebook_{id}")),
        };
        let artifact = DemoArtifact {
            title,
            stem,
            body: None,
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
    fn video_ids() {
        assert_eq!(
            video_id(&url("https://www.facebook.com/someone/videos/1234/")).as_deref(),
            Some("1234")
        );
        assert_eq!(
            video_id(&url("https://www.facebook.com/watch/?v=987")).as_deref(),
            Some("987")
        );
        assert_eq!(video_id(&url("https://fb.watch/xYz/")).as_deref(), Some("xYz"));
        assert_eq!(video_id(&url("https://www.facebook.com/someone")), None);
    }

    #[test]
    fn image_ids() {
        assert_eq!(
            image_id(&url("https://www.facebook.com/photo.php?fbid=555&set=a.1")).as_deref(),
            Some("555")
        );
        assert_eq!(
            image_id(&url("https://www.facebook.com/page/photos/a.10/777/")).as_deref(),
            Some("777")
        );
    }

    #[tokio::test]
    async fn photo_metadata_has_no_duration() {
        let f = FacebookFetcher::new(DemoSettings::default());
        let meta = f
            .fetch_metadata(&url("https://www.facebook.com/photo.php?fbid=555"))
            .await
            .unwrap();
        assert_eq!(meta.title, "Demo Facebook Photo (555)");
        assert!(meta.duration.is_none());
    }
}
