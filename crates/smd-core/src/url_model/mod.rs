//! URL modeling and artifact filename derivation.
//!
//! Extracts platform identifiers from URL paths and queries, and builds safe
//! local filenames for artifacts, sanitized for Linux filesystems.

mod path;
mod sanitize;

pub use path::{first_segment, query_value, segment_after};
pub use sanitize::sanitize_filename;

use crate::job::JobId;

/// Stem used when the fetcher's stem sanitizes to nothing.
const DEFAULT_STEM: &str = "download";

/// Builds `<stem>_<job8>.<extension>` where `job8` is the first eight hex
/// digits of the job id, so concurrent jobs for the same URL never collide.
///
/// # Examples
///
/// - `artifact_filename("tiktok_Demo Video", id, "mp4")` → `"tiktok_Demo_Video_1a2b3c4d.mp4"`
/// - `artifact_filename("../..", id, "jpg")` → `"download_1a2b3c4d.jpg"`
pub fn artifact_filename(stem: &str, job_id: JobId, extension: &str) -> String {
    let sanitized = sanitize_filename(stem);
    let stem = if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_STEM
    } else {
        sanitized.as_str()
    };
    let id = job_id.simple().to_string();
    let short = &id[..8];
    // Leave room for "_<id>.<ext>" under NAME_MAX.
    let budget = 255usize.saturating_sub(short.len() + extension.len() + 2);
    let mut take = stem.len().min(budget);
    while take > 0 && !stem.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}_{}.{}", &stem[..take], short, extension)
}
