use async_trait::async_trait;
use url::Url;

use super::demo::{self, DemoArtifact, DemoSettings};
use super::{truncate_description, ContentResult, FetchError, FetchRequest, Metadata, PlatformFetcher};
use crate::platform::{ContentType, Platform};
use crate::url_model::{first_segment, segment_after};

const TEXT_TITLE_LIMIT: usize = 100;
const DESCRIPTION_LIMIT: usize = 280;

pub struct TwitterFetcher {
    settings: DemoSettings,
}

impl TwitterFetcher {
    pub fn new(settings: DemoSettings) -> Self {
        Self { settings }
    }
}

struct StatusRef {
    author: String,
    id: String,
}

/// `/<user>/status/<id>`; the status id is required.
fn status(url: &Url) -> Option<StatusRef> {
    let id = segment_after(url, "status")?;
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let author = first_segment(url)
        .filter(|s| !s.eq_ignore_ascii_case("i") && !s.eq_ignore_ascii_case("status"))
        .unwrap_or_else(|| "unknown".to_string());
    Some(StatusRef { author, id })
}

fn demo_text(status: &StatusRef) -> String {
    format!(
        "Demo tweet {} from @{}: the full text of a post would appear here, cut down for the title",
        status.id, status.author
    )
}

fn tweet_body(status: &StatusRef) -> Result<Vec<u8>, FetchError> {
    let doc = serde_json::json!({
        "id": status.id,
        "author": status.author,
        "text": demo_text(status),
        "likes": 50_000,
        "retweets": 1_200,
    });
    serde_json::to_vec_pretty(&doc).map_err(|e| FetchError::Io(e.into()))
}

fn not_a_status(url: &Url) -> FetchError {
    FetchError::Unsupported(format!("no status id in {url}"))
}

#[async_trait]
impl PlatformFetcher for TwitterFetcher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch_metadata(&self, url: &Url) -> Result<Metadata, FetchError> {
        let status = status(url).ok_or_else(|| not_a_status(url))?;
        let title = truncate_description(&demo_text(&status), TEXT_TITLE_LIMIT);
        Ok(Metadata {
            author: format!("@{}", status.author),
            duration: None,
            ..demo::demo_metadata(Platform::Twitter, title, DESCRIPTION_LIMIT)
        })
    }

    async fn fetch_content(&self, request: FetchRequest<'_>) -> Result<ContentResult, FetchError> {
        let status = status(request.url).ok_or_else(|| not_a_status(request.url))?;
        let title = truncate_description(&demo_text(&status), TEXT_TITLE_LIMIT);
        let artifact = match request.content_type {
            ContentType::Tweet => DemoArtifact {
                title,
                stem: format!("twitter_{}_{}", status.author, status.id),
                body: Some(tweet_body(&status)?),
            },
            _ => DemoArtifact {
                title,
                stem: format!("twitter_media_{}", status.id),
                body: None,
            },
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
    fn status_requires_numeric_id() {
        let s = status(&url("https://x.com/rustlang/status/17001?s=20")).unwrap();
        assert_eq!(s.author, "rustlang");
        assert_eq!(s.id, "17001");
        assert!(status(&url("https://x.com/rustlang")).is_none());
        assert!(status(&url("https://x.com/rustlang/status/abc")).is_none());
    }

    #[test]
    fn web_status_has_unknown_author() {
        let s = status(&url("https://twitter.com/i/web/status/42")).unwrap();
        assert_eq!(s.author, "unknown");
    }

    #[test]
    fn tweet_body_is_json() {
        let s = StatusRef {
            author: "a".into(),
            id: "1".into(),
        };
        let body = tweet_body(&s).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["id"], "1");
        assert_eq!(v["author"], "a");
    }

    #[tokio::test]
    async fn metadata_author_is_handle() {
        let f = TwitterFetcher::new(DemoSettings::default());
        let meta = f
            .fetch_metadata(&url("https://twitter.com/rustlang/status/17001"))
            .await
            .unwrap();
        assert_eq!(meta.author, "@rustlang");
        assert!(meta.title.contains("17001"));
    }
}
