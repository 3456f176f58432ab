//! Page fetching and summarizing.

pub mod extract;
pub mod fetcher;

pub use extract::{extended_text, parse_page, quick_summary, ParsedPage};
pub use fetcher::WebScraper;
