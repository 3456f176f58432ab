//! Helpers for sanitizing data before it enters tracing span attributes
//! and log lines.
//!
//! Prompts, screen analyses and page text are user data; spans only ever
//! carry redacted URLs, short previews and file names.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Strips userinfo, query and fragment from a URL.
///
/// - `https://user:pw@host.org/a?token=x#top` → `https://****@host.org/a`
/// - `https://host.org/a` → `https://host.org/a` (no change)
///
/// Input that does not parse as a URL is returned as a short preview.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(raw) else {
        return preview(raw, 64);
    };

    let had_userinfo = !parsed.username().is_empty() || parsed.password().is_some();
    parsed.set_query(None);
    parsed.set_fragment(None);
    let _ = parsed.set_password(None);
    let _ = parsed.set_username("");

    let cleaned = parsed.to_string();
    if had_userinfo {
        if let Some(scheme_end) = cleaned.find("://") {
            let (scheme, rest) = cleaned.split_at(scheme_end + 3);
            return format!("{}****@{}", scheme, rest);
        }
    }
    cleaned
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
