use std::collections::HashSet;

/// Maximum number of keywords kept from a query.
pub const MAX_KEYWORDS: usize = 5;

const MIN_KEYWORD_LEN: usize = 3;

/// Common words that carry no topic signal.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "day", "get", "has", "him", "his", "how", "its", "may", "new", "now", "old", "see",
    "two", "way", "who", "boy", "did", "let", "put", "say", "she", "too", "use", "about",
    "please", "with", "from", "this", "that", "what", "into", "your", "have", "will", "just",
];

/// Pulls up to [`MAX_KEYWORDS`] topic words out of a user query.
///
/// Words are lowercased, stripped of surrounding punctuation, and kept in
/// order of first appearance. URLs are skipped. Returns a comma-separated
/// list, or `None` when nothing qualifies.
pub fn extract_keywords(query: &str) -> Option<String> {
    let lowered = query.to_lowercase();
    let mut seen = HashSet::new();

    let keywords: Vec<&str> = lowered
        .split_whitespace()
        .filter(|w| !w.contains("://"))
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|w| !STOPWORDS.contains(w))
        .filter(|w| seen.insert(*w))
        .take(MAX_KEYWORDS)
        .collect();

    if keywords.is_empty() {
        None
    } else {
        Some(keywords.join(", "))
    }
}

/// Splits a keyword list produced by [`extract_keywords`] back into words.
pub fn split_keywords(keywords: &str) -> impl Iterator<Item = &str> {
    keywords.split(',').map(str::trim).filter(|k| !k.is_empty())
}
