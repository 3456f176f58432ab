//! Character budgets for text handed to later stages.
//!
//! Truncation keeps the head of the string and cuts on a character boundary.
//! It knows nothing about sentences or markup.

use serde::{Deserialize, Serialize};

/// Marker appended when the scraper cuts its extended text.
pub const TRUNCATION_MARKER: &str = "...[content truncated]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budgets {
    /// Scraped page text included in the Fetch stage prompt.
    pub web_prompt_chars: usize,
    /// Processed content included in the Render stage prompt.
    pub content_prompt_chars: usize,
    /// Extended text the scraper hands back.
    pub extended_text_chars: usize,
    /// Model output quoted in trace messages.
    pub trace_preview_chars: usize,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            web_prompt_chars: 3000,
            content_prompt_chars: 2000,
            extended_text_chars: 2000,
            trace_preview_chars: 200,
        }
    }
}

/// Keeps the first `max_chars` characters of `text`.
pub fn truncate_head(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Like [`truncate_head`] but appends `marker` when something was cut.
pub fn truncate_with_marker(text: &str, max_chars: usize, marker: &str) -> String {
    let head = truncate_head(text, max_chars);
    if head.len() < text.len() {
        format!("{}{}", head, marker)
    } else {
        head.to_string()
    }
}
