//! Best-guess URL extraction from free-form model output.
//!
//! The extractor runs an ordered cascade of heuristics and stops at the first
//! step that produces a URL. Within a step only the first acceptable match is
//! considered, so when a description mentions several sites the earliest one
//! wins.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Domain shape: `label(.label)+.tld`, tld of at least two letters.
const DOMAIN: &str = r"(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}";

static RE_EXPLICIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap());

static RE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:detected\s+)?urls?(?:\(s\))?\s*\**\s*:\s*\**\s*(\S+)").unwrap()
});

static RE_BARE_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^{DOMAIN}(?:/\S*)?$")).unwrap());

static RE_CUE_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:address\s+bar|website|domain|link)\b[^.\n]{{0,60}}?\b({DOMAIN}(?:/\S*)?)"
    ))
    .unwrap()
});

static RE_CUE_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({DOMAIN}(?:/\S*)?)\s+is\s+the\s+(?:url|address|website)\b"
    ))
    .unwrap()
});

static RE_STANDALONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b{DOMAIN}\b")).unwrap());

/// Placeholder hosts that models like to echo back from their instructions.
const DENYLIST: &[&str] = &["example.com", "localhost", "127.0.0.1"];

const MIN_STANDALONE_LEN: usize = 6;

/// Which cascade step produced a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    /// A complete `http(s)://` URL in the text.
    Explicit,
    /// The value after a `URL:` / `Detected URL(s):` label.
    Labelled,
    /// A domain next to a cue such as "address bar" or "is the URL".
    Contextual,
    /// Any domain-shaped token.
    Standalone,
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CascadeStep::Explicit => "explicit",
            CascadeStep::Labelled => "labelled",
            CascadeStep::Contextual => "contextual",
            CascadeStep::Standalone => "standalone",
        };
        f.write_str(name)
    }
}

/// Runs the full cascade and returns the first URL found.
pub fn extract_url(text: &str) -> Option<String> {
    extract_url_detailed(text).map(|(url, _)| url)
}

/// Like [`extract_url`] but also reports the cascade step that matched.
pub fn extract_url_detailed(text: &str) -> Option<(String, CascadeStep)> {
    if text.trim().is_empty() {
        return None;
    }

    explicit_url(text)
        .map(|u| (u, CascadeStep::Explicit))
        .or_else(|| labelled_url(text).map(|u| (u, CascadeStep::Labelled)))
        .or_else(|| contextual_url(text).map(|u| (u, CascadeStep::Contextual)))
        .or_else(|| standalone_domain(text).map(|u| (u, CascadeStep::Standalone)))
}

/// Only the first two cascade steps: a URL the text states outright.
///
/// Used on user requests, where loose domain guessing would misfire on
/// ordinary words like file names.
pub fn extract_explicit_url(text: &str) -> Option<String> {
    explicit_url(text).or_else(|| labelled_url(text))
}

fn explicit_url(text: &str) -> Option<String> {
    let m = RE_EXPLICIT.find(text)?;
    clean_full_url(strip_wrappers(m.as_str()))
}

fn labelled_url(text: &str) -> Option<String> {
    let caps = RE_LABEL.captures(text)?;
    let value = strip_wrappers(caps.get(1)?.as_str());

    if has_scheme(value) {
        return clean_full_url(value);
    }

    let value = trim_trailing_punctuation(value);
    if RE_BARE_DOMAIN.is_match(value) {
        Some(normalize_bare(value))
    } else {
        None
    }
}

fn contextual_url(text: &str) -> Option<String> {
    let before = RE_CUE_BEFORE.captures(text).and_then(|c| c.get(1));
    let after = RE_CUE_AFTER.captures(text).and_then(|c| c.get(1));

    let m = match (before, after) {
        (Some(a), Some(b)) => {
            if a.start() <= b.start() {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    let value = trim_trailing_punctuation(m.as_str());
    (!value.is_empty()).then(|| normalize_bare(value))
}

fn standalone_domain(text: &str) -> Option<String> {
    RE_STANDALONE
        .find_iter(text)
        .filter(|m| !touches_at_sign(text, m.start(), m.end()))
        .map(|m| m.as_str())
        .find(|token| token.chars().count() >= MIN_STANDALONE_LEN && !is_denylisted(token))
        .map(normalize_bare)
}

/// A token glued to `@` is part of an e-mail address, not a site.
fn touches_at_sign(text: &str, start: usize, end: usize) -> bool {
    text[..start].ends_with('@') || text[end..].starts_with('@')
}

fn is_denylisted(host: &str) -> bool {
    let lower = host.to_ascii_lowercase();
    let lower = lower.strip_prefix("www.").unwrap_or(&lower);
    DENYLIST.contains(&lower)
}

fn has_scheme(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn normalize_bare(value: &str) -> String {
    format!("https://{}", value)
}

/// Removes quoting and markdown decoration models wrap around values.
fn strip_wrappers(value: &str) -> &str {
    value
        .trim_start_matches(['"', '\'', '`', '*', '[', '<', '('])
        .trim_end_matches(['"', '\'', '`', '*', ']', '>'])
}

/// Trims sentence punctuation off the end of a full URL and checks that what
/// remains still looks like one.
fn clean_full_url(raw: &str) -> Option<String> {
    let url = trim_trailing_punctuation(raw);

    let host_start = url.find("://")? + 3;
    if url.len() <= host_start {
        return None;
    }

    let last = url.chars().last()?;
    if last.is_alphanumeric() || last == '/' || last == ')' {
        Some(url.to_string())
    } else {
        None
    }
}

/// Strips trailing `.,;:!?` and unbalanced `)`; a `)` that closes a `(` inside
/// the URL is part of the path and stays.
fn trim_trailing_punctuation(value: &str) -> &str {
    let mut end = value.len();

    while let Some(last) = value[..end].chars().last() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => {
                let s = &value[..end];
                s.matches(')').count() > s.matches('(').count()
            }
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }

    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_bare_domain_gets_https() {
        let text = "1. Description: a news page\n2. URL: example.com\n3. Keywords: news";
        assert_eq!(extract_url(text).as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_explicit_url_trailing_period_stripped() {
        assert_eq!(
            extract_url("Visit https://foo.bar/path?x=1.").as_deref(),
            Some("https://foo.bar/path?x=1")
        );
    }

    #[test]
    fn test_localhost_only_yields_none() {
        assert_eq!(extract_url("The page is served from localhost right now"), None);
    }

    #[test]
    fn test_explicit_url_wins_over_label() {
        let text = "URL: github.com\nAlso open https://docs.rs/regex";
        let (url, step) = extract_url_detailed(text).unwrap();
        assert_eq!(url, "https://docs.rs/regex");
        assert_eq!(step, CascadeStep::Explicit);
    }

    #[test]
    fn test_explicit_url_inside_emphasis_or_quotes_keeps_path() {
        assert_eq!(
            extract_url("Open **https://docs.rs/regex/latest** now").as_deref(),
            Some("https://docs.rs/regex/latest")
        );
        let (url, step) = extract_url_detailed("'https://docs.rs/regex/latest'").unwrap();
        assert_eq!(url, "https://docs.rs/regex/latest");
        assert_eq!(step, CascadeStep::Explicit);
        assert_eq!(
            extract_url("Address: `https://crates.io/crates/serde`.").as_deref(),
            Some("https://crates.io/crates/serde")
        );
    }

    #[test]
    fn test_first_explicit_match_only() {
        let text = "See https://first.org/a and https://second.org/b";
        assert_eq!(extract_url(text).as_deref(), Some("https://first.org/a"));
    }

    #[test]
    fn test_trailing_punctuation_variants() {
        assert_eq!(
            extract_url("(see https://rust-lang.org)").as_deref(),
            Some("https://rust-lang.org")
        );
        assert_eq!(
            extract_url("Go to https://rust-lang.org/learn!?").as_deref(),
            Some("https://rust-lang.org/learn")
        );
        assert_eq!(
            extract_url("Open https://news.ycombinator.com/, then scroll").as_deref(),
            Some("https://news.ycombinator.com/")
        );
    }

    #[test]
    fn test_balanced_parenthesis_in_path_kept() {
        let text = "Article: https://en.wikipedia.org/wiki/Rust_(programming_language).";
        assert_eq!(
            extract_url(text).as_deref(),
            Some("https://en.wikipedia.org/wiki/Rust_(programming_language)")
        );
    }

    #[test]
    fn test_label_is_case_insensitive_and_tolerates_markdown() {
        assert_eq!(
            extract_url("**url:** www.github.com").as_deref(),
            Some("https://www.github.com")
        );
        assert_eq!(
            extract_url("Detected URL(s): `crates.io/crates/regex`").as_deref(),
            Some("https://crates.io/crates/regex")
        );
    }

    #[test]
    fn test_label_with_full_url_keeps_scheme() {
        assert_eq!(
            extract_url("URL: [http://intranet.corp.net/wiki]").as_deref(),
            Some("http://intranet.corp.net/wiki")
        );
    }

    #[test]
    fn test_label_na_falls_through() {
        assert_eq!(extract_url("URL: N/A"), None);
        assert_eq!(
            extract_url("URL: N/A\nThe address bar shows docs.python.org/3/").as_deref(),
            Some("https://docs.python.org/3/")
        );
    }

    #[test]
    fn test_contextual_cues() {
        assert_eq!(
            extract_url("The browser address bar displays github.com/rust-lang")
                .as_deref(),
            Some("https://github.com/rust-lang")
        );
        assert_eq!(
            extract_url("It looks like the website medium.com with an article").as_deref(),
            Some("https://medium.com")
        );
        assert_eq!(
            extract_url("I believe stackoverflow.com is the URL shown").as_deref(),
            Some("https://stackoverflow.com")
        );
    }

    #[test]
    fn test_contextual_cue_does_not_cross_sentences() {
        let text = "There is a link. Nothing else";
        assert_eq!(extract_url(text), None);
    }

    #[test]
    fn test_standalone_domain() {
        let text = "A dashboard from grafana.net showing charts";
        let (url, step) = extract_url_detailed(text).unwrap();
        assert_eq!(url, "https://grafana.net");
        assert_eq!(step, CascadeStep::Standalone);
    }

    #[test]
    fn test_standalone_skips_denylist_and_short_tokens() {
        assert_eq!(extract_url("Placeholder example.com only"), None);
        assert_eq!(extract_url("Placeholder www.example.com only"), None);
        assert_eq!(extract_url("tiny a.io token"), None);
        assert_eq!(
            extract_url("example.com and then lobste.rs").as_deref(),
            Some("https://lobste.rs")
        );
    }

    #[test]
    fn test_standalone_ignores_email_addresses() {
        assert_eq!(extract_url("Contact jane.doe@mail.com for help"), None);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_url(""), None);
        assert_eq!(extract_url("   \n"), None);
    }

    #[test]
    fn test_explicit_only_ignores_loose_domains() {
        assert_eq!(extract_explicit_url("summarize report.pdf for me"), None);
        assert_eq!(
            extract_explicit_url("summarize https://example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            extract_explicit_url("url: lwn.net please").as_deref(),
            Some("https://lwn.net")
        );
    }

    #[test]
    fn test_trim_trailing_punctuation_keeps_path_characters() {
        assert_eq!(trim_trailing_punctuation("a.com/x?y=1&z=2"), "a.com/x?y=1&z=2");
        assert_eq!(trim_trailing_punctuation("a.com/x_(y)"), "a.com/x_(y)");
        assert_eq!(trim_trailing_punctuation("a.com/x)."), "a.com/x");
    }
}
