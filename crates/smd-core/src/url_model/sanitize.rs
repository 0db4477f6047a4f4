//! Filename sanitization for titles scraped from platforms.

/// Bytes allowed in one path component on Linux.
const NAME_MAX: usize = 255;

/// Characters that break shells, browsers' Content-Disposition handling, or
/// non-Linux filesystems when users copy artifacts around.
fn is_hostile(c: char) -> bool {
    matches!(
        c,
        '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '%'
    ) || c.is_control()
        || c.is_whitespace()
}

/// Sanitizes a platform title (or any candidate stem) into a filename.
///
/// - Replaces path separators, shell/filesystem-hostile characters, control
///   characters, and whitespace with `_`
/// - Collapses runs of `_`
/// - Trims leading/trailing dots and underscores
/// - Limits length to 255 bytes (Linux NAME_MAX), on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if is_hostile(c) { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
