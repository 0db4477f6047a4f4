//! Identifier extraction from platform URLs.

use url::Url;

fn segments(url: &Url) -> impl Iterator<Item = &str> + '_ {
    url.path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
}

/// First non-empty path segment (`https://youtu.be/abc` -> `abc`).
pub fn first_segment(url: &Url) -> Option<String> {
    segments(url).next().map(str::to_string)
}

/// The path segment following `marker` (`/p/<code>/` with marker `p`).
pub fn segment_after(url: &Url, marker: &str) -> Option<String> {
    let mut iter = segments(url);
    while let Some(segment) = iter.next() {
        if segment.eq_ignore_ascii_case(marker) {
            return iter.next().map(str::to_string);
        }
    }
    None
}

/// First non-empty value of query parameter `key`.
pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn first_segment_skips_empty() {
        assert_eq!(first_segment(&url("https://youtu.be/abc")).as_deref(), Some("abc"));
        assert_eq!(first_segment(&url("https://youtu.be//abc/")).as_deref(), Some("abc"));
        assert_eq!(first_segment(&url("https://example.com/")), None);
    }

    #[test]
    fn segment_after_marker() {
        let u = url("https://www.instagram.com/p/CxYz123/?igsh=1");
        assert_eq!(segment_after(&u, "p").as_deref(), Some("CxYz123"));
        assert_eq!(segment_after(&u, "reel"), None);
        let tail = url("https://x.com/user/status");
        assert_eq!(segment_after(&tail, "status"), None);
    }

    #[test]
    fn query_value_ignores_empty() {
        let u = url("https://www.youtube.com/watch?v=&list=PL1&v=dQw4w9WgXcQ");
        assert_eq!(query_value(&u, "v").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(query_value(&u, "list").as_deref(), Some("PL1"));
        assert_eq!(query_value(&u, "t"), None);
    }
}
