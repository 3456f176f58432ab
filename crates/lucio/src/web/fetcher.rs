use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::adapters::{AdapterError, PageFetcher, ScrapedPage};
use crate::config::ScraperConfig;
use crate::sanitize::redact_url;
use crate::web::extract::{contains_keyword, extended_text, parse_page, quick_summary};

/// Fetches pages over blocking HTTP and summarizes them.
pub struct WebScraper {
    client: Client,
    extended_chars: usize,
}

impl WebScraper {
    pub fn new(config: &ScraperConfig, extended_chars: usize) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            extended_chars,
        })
    }

    /// Summarizes an already downloaded HTML document.
    pub fn summarize_html(
        &self,
        html: &str,
        keyword: Option<&str>,
    ) -> Result<ScrapedPage, AdapterError> {
        summarize(html, keyword, self.extended_chars)
    }
}

fn summarize(
    html: &str,
    keyword: Option<&str>,
    extended_chars: usize,
) -> Result<ScrapedPage, AdapterError> {
    let parsed = parse_page(html);
    if parsed.text.is_empty() {
        return Err(AdapterError::EmptyContent);
    }

    Ok(ScrapedPage {
        quick_summary: quick_summary(&parsed.text, keyword),
        extended_text: extended_text(&parsed.text, extended_chars),
        keyword_found: contains_keyword(&parsed.text, keyword),
        title: parsed.title,
        full_text: parsed.text,
    })
}

impl PageFetcher for WebScraper {
    #[instrument(skip_all, fields(url = %redact_url(url)))]
    fn fetch(&self, url: &str, keyword: Option<&str>) -> Result<ScrapedPage, AdapterError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let html = response.text()?;
        debug!(bytes = html.len(), "Downloaded page");

        summarize(&html, keyword, self.extended_chars)
    }
}
