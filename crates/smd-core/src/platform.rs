//! Supported platforms, their content types, and output formats.
//!
//! Platform detection works on the URL host: a host matches a platform when it
//! equals one of the platform's domains or is a subdomain of one.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Youtube,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Youtube,
        Platform::Tiktok,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Case-insensitive lookup by name. Returns None for unknown platforms.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
            Platform::Youtube => "YouTube",
            Platform::Tiktok => "TikTok",
        }
    }

    /// Content types a submission for this platform may request.
    pub fn content_types(self) -> &'static [ContentType] {
        match self {
            Platform::Facebook => &[ContentType::Video, ContentType::Image],
            Platform::Instagram => &[ContentType::Post, ContentType::Story],
            Platform::Twitter => &[ContentType::Tweet, ContentType::Media],
            Platform::Youtube => &[ContentType::Video, ContentType::Playlist],
            Platform::Tiktok => &[ContentType::Video],
        }
    }

    pub fn supports(self, content_type: ContentType) -> bool {
        self.content_types().contains(&content_type)
    }

    pub fn domains(self) -> &'static [&'static str] {
        match self {
            Platform::Facebook => &["facebook.com", "fb.watch"],
            Platform::Instagram => &["instagram.com"],
            Platform::Twitter => &["twitter.com", "x.com"],
            Platform::Youtube => &["youtube.com", "youtu.be"],
            Platform::Tiktok => &["tiktok.com"],
        }
    }

    pub fn matches_host(self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains().iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(*domain)
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Detects the platform a URL belongs to from its host.
    pub fn detect(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        Self::ALL.into_iter().find(|p| p.matches_host(host))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-specific variant tag of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Image,
    Post,
    Story,
    Tweet,
    Media,
    Playlist,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Video,
        ContentType::Image,
        ContentType::Post,
        ContentType::Story,
        ContentType::Tweet,
        ContentType::Media,
        ContentType::Playlist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Image => "image",
            ContentType::Post => "post",
            ContentType::Story => "story",
            ContentType::Tweet => "tweet",
            ContentType::Media => "media",
            ContentType::Playlist => "playlist",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested output format: best available, mp4 video, or extracted audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Best,
    VideoMp4,
    Audio,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Best,
        OutputFormat::VideoMp4,
        OutputFormat::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Best => "best",
            OutputFormat::VideoMp4 => "video_mp4",
            OutputFormat::Audio => "audio",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
