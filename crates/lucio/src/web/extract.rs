use scraper::{ElementRef, Html, Selector};

use crate::pipeline::budget::{truncate_head, truncate_with_marker, TRUNCATION_MARKER};
use crate::signals::keywords::split_keywords;

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];
const ROOT_SELECTORS: &[&str] = &["article", "main", "body"];

const SUMMARY_PREVIEW_CHARS: usize = 500;
const SUMMARY_SENTENCES: usize = 2;
const KEYWORD_SENTENCES: usize = 5;
const KEYWORD_CONTEXT_CHARS: usize = 200;

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    pub title: String,
    pub text: String,
}

/// Title and whitespace-compacted main text of an HTML document.
///
/// The text comes from the first `article`, then `main`, then `body`
/// element that yields any text at all.
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| compact_ws(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let text = ROOT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|sel| document.select(&sel).next())
        .map(|root| {
            let mut raw = String::new();
            collect_text(root, &mut raw);
            compact_ws(&raw)
        })
        .find(|t| !t.is_empty())
        .unwrap_or_default();

    ParsedPage { title, text }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if SKIPPED_TAGS.contains(&child_el.value().name()) {
                continue;
            }
            collect_text(child_el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push(' ');
            out.push_str(text);
        }
    }
}

fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Short summary of `content`.
///
/// With keywords, the first keyword that occurs in some sentence yields
/// `Found '<kw>': <matching sentences>...`. Otherwise the first two
/// sentences of the first 500 characters.
pub fn quick_summary(content: &str, keywords: Option<&str>) -> String {
    if content.is_empty() {
        return String::new();
    }

    if let Some(keywords) = keywords {
        for keyword in split_keywords(keywords) {
            if let Some(context) = keyword_context(content, keyword) {
                return format!(
                    "Found '{}': {}...",
                    keyword,
                    truncate_head(&context, KEYWORD_CONTEXT_CHARS)
                );
            }
        }
    }

    let preview = truncate_head(content, SUMMARY_PREVIEW_CHARS);
    let head: Vec<&str> = preview
        .split('.')
        .map(str::trim)
        .take(SUMMARY_SENTENCES)
        .collect();
    format!("{}.", head.join(". "))
}

fn keyword_context(content: &str, keyword: &str) -> Option<String> {
    let needle = keyword.to_lowercase();
    let matches: Vec<&str> = content
        .split('.')
        .map(str::trim)
        .filter(|s| s.to_lowercase().contains(&needle))
        .take(KEYWORD_SENTENCES)
        .collect();

    if matches.is_empty() {
        None
    } else {
        Some(format!("{}.", matches.join(". ")))
    }
}

/// Whether any keyword in the list occurs in `content`, ignoring case.
pub fn contains_keyword(content: &str, keywords: Option<&str>) -> bool {
    let Some(keywords) = keywords else {
        return false;
    };
    let haystack = content.to_lowercase();
    split_keywords(keywords).any(|k| haystack.contains(&k.to_lowercase()))
}

/// Head of `content` cut to `max_chars`, marked when cut.
pub fn extended_text(content: &str, max_chars: usize) -> String {
    truncate_with_marker(content, max_chars, TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head>
            <title>  Rust   Blog </title>
            <style>body { color: red; }</style>
          </head>
          <body>
            <nav>Home | About</nav>
            <article>
              <h1>Announcing Rust 1.80</h1>
              <script>var tracking = 1;</script>
              <p>The Rust team is happy to announce a new version.</p>
              <p>LazyLock is now stable. It replaces many uses of lazy_static.</p>
            </article>
          </body>
        </html>
    "#;

    #[test]
    fn test_parse_prefers_article_and_drops_scripts() {
        let page = parse_page(PAGE);
        assert_eq!(page.title, "Rust Blog");
        assert!(page.text.starts_with("Announcing Rust 1.80 The Rust team"));
        assert!(!page.text.contains("tracking"));
        assert!(!page.text.contains("Home | About"));
    }

    #[test]
    fn test_parse_falls_back_to_body() {
        let page = parse_page("<html><body><div>Just a div</div></body></html>");
        assert_eq!(page.title, UNTITLED);
        assert_eq!(page.text, "Just a div");
    }

    #[test]
    fn test_parse_empty_document() {
        let page = parse_page("");
        assert_eq!(page.title, UNTITLED);
        assert!(page.text.is_empty());
    }

    #[test]
    fn test_quick_summary_first_two_sentences() {
        let summary = quick_summary("First one. Second one. Third one.", None);
        assert_eq!(summary, "First one. Second one.");
    }

    #[test]
    fn test_quick_summary_keyword_context() {
        let content = "Cars are fast. Electric cars are quiet. Bikes are slow.";
        let summary = quick_summary(content, Some("boats, electric"));
        assert_eq!(summary, "Found 'electric': Electric cars are quiet....");
    }

    #[test]
    fn test_quick_summary_keyword_missing_falls_back() {
        let summary = quick_summary("Alpha. Beta. Gamma.", Some("zeta"));
        assert_eq!(summary, "Alpha. Beta.");
    }

    #[test]
    fn test_quick_summary_context_is_capped() {
        let sentence = format!("keyword {}", "x".repeat(300));
        let summary = quick_summary(&sentence, Some("keyword"));
        // "Found 'keyword': " + 200 chars + "..."
        assert_eq!(summary.chars().count(), 17 + 200 + 3);
    }

    #[test]
    fn test_contains_keyword() {
        assert!(contains_keyword("Electric Cars", Some("boats, cars")));
        assert!(!contains_keyword("Electric Cars", Some("boats")));
        assert!(!contains_keyword("Electric Cars", None));
    }

    #[test]
    fn test_extended_text_marks_truncation() {
        assert_eq!(extended_text("short", 10), "short");
        assert_eq!(extended_text("abcdefghij", 4), "abcd...[content truncated]");
    }
}
