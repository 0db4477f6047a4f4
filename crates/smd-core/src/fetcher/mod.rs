//! Platform fetchers: the capability set the dispatcher consumes.
//!
//! One implementation per platform. The dispatcher holds them behind
//! `Arc<dyn PlatformFetcher>` in a `FetcherRegistry` and never constructs
//! them itself. The implementations shipped here are demo fetchers that
//! simulate a transfer and write a placeholder artifact; real extraction
//! plugs in through the same trait.

mod demo;
mod error;
mod facebook;
mod instagram;
mod tiktok;
mod twitter;
mod types;
mod youtube;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::platform::Platform;

pub use demo::DemoSettings;
pub use error::FetchError;
pub use facebook::FacebookFetcher;
pub use instagram::InstagramFetcher;
pub use tiktok::TiktokFetcher;
pub use twitter::TwitterFetcher;
pub use types::{truncate_description, ContentResult, FetchRequest, Metadata};
pub use youtube::YoutubeFetcher;

#[async_trait]
pub trait PlatformFetcher: Send + Sync {
    /// Platform this fetcher serves.
    fn platform(&self) -> Platform;

    /// Content metadata for a preview, without downloading.
    async fn fetch_metadata(&self, url: &Url) -> Result<Metadata, FetchError>;

    /// Retrieves the content into `request.output_dir`, reporting progress
    /// through `request.progress` zero or more times before returning.
    /// Must return `FetchError::Cancelled` promptly once `request.cancel`
    /// fires, leaving no partial artifact behind.
    async fn fetch_content(&self, request: FetchRequest<'_>) -> Result<ContentResult, FetchError>;
}

/// Platform -> fetcher lookup injected into the dispatcher.
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: HashMap<Platform, Arc<dyn PlatformFetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo fetchers for every supported platform.
    pub fn demo(settings: DemoSettings) -> Self {
        Self::new()
            .with(Arc::new(FacebookFetcher::new(settings.clone())))
            .with(Arc::new(InstagramFetcher::new(settings.clone())))
            .with(Arc::new(TwitterFetcher::new(settings.clone())))
            .with(Arc::new(YoutubeFetcher::new(settings.clone())))
            .with(Arc::new(TiktokFetcher::new(settings)))
    }

    /// Registers (or replaces) the fetcher for its platform.
    pub fn register(&mut self, fetcher: Arc<dyn PlatformFetcher>) {
        self.fetchers.insert(fetcher.platform(), fetcher);
    }

    pub fn with(mut self, fetcher: Arc<dyn PlatformFetcher>) -> Self {
        self.register(fetcher);
        self
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformFetcher>> {
        self.fetchers.get(&platform).cloned()
    }

    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.fetchers.keys().copied().collect();
        platforms.sort();
        platforms
    }
}
