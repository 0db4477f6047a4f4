//! Submission validation. Everything here runs before a job exists.

use url::Url;

use crate::error::ValidationError;
use crate::platform::{ContentType, OutputFormat, Platform};

/// A submission that passed every check except the fetcher lookup.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Submission {
    pub platform: Platform,
    pub content_type: ContentType,
    pub url: Url,
    pub format: OutputFormat,
}

/// Checks, in order: platform, content type, URL, host/platform match, format.
pub(super) fn validate_submission(
    platform: &str,
    content_type: &str,
    url: &str,
    format: Option<&str>,
) -> Result<Submission, ValidationError> {
    let platform = Platform::parse(platform)
        .ok_or_else(|| ValidationError::UnknownPlatform(platform.trim().to_string()))?;
    let content_type = ContentType::parse(content_type)
        .filter(|ct| platform.supports(*ct))
        .ok_or_else(|| ValidationError::UnsupportedContentType {
            platform,
            content_type: content_type.trim().to_string(),
        })?;
    let url = parse_url(url)?;
    let host = url.host_str().unwrap_or_default();
    if !platform.matches_host(host) {
        return Err(ValidationError::PlatformMismatch {
            platform,
            host: host.to_string(),
        });
    }
    let format = parse_format(format)?;
    Ok(Submission {
        platform,
        content_type,
        url,
        format,
    })
}

/// Absolute http(s) URL with a host.
pub(super) fn parse_url(raw: &str) -> Result<Url, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    let malformed = |reason: &str| ValidationError::MalformedUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw).map_err(|e| malformed(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(malformed("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(malformed("missing host"));
    }
    Ok(url)
}

pub(super) fn detect_platform(url: &Url) -> Result<Platform, ValidationError> {
    Platform::detect(url).ok_or_else(|| ValidationError::UndetectedPlatform(url.to_string()))
}

/// Missing or blank means `best`.
fn parse_format(format: Option<&str>) -> Result<OutputFormat, ValidationError> {
    match format.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(OutputFormat::default()),
        Some(name) => OutputFormat::parse(name)
            .ok_or_else(|| ValidationError::UnknownFormat(name.to_string())),
    }
}
