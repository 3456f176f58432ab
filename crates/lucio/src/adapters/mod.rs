//! Narrow contracts for the external capabilities the pipeline drives.
//!
//! The pipeline only ever talks to these traits. Concrete implementations
//! live in [`crate::llm`], [`crate::capture`], [`crate::web`] and
//! [`crate::render`]; tests substitute stubs.

pub mod error;
pub mod timeout;
pub mod types;

pub use error::AdapterError;
pub use timeout::call_with_timeout;
pub use types::{RenderRequest, RenderedDocument, ScrapedPage, ScreenImage};

/// `GenerateText(prompt, optionalImage) -> text`.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, image: Option<&ScreenImage>) -> Result<String, AdapterError>;

    /// Model identifier used in logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// `CaptureLatestScreen() -> imageBytesOrNone`. Must never block on a fresh
/// capture.
pub trait ScreenSource: Send + Sync {
    fn latest(&self) -> Option<ScreenImage>;
}

/// `FetchAndSummarize(url, optionalKeyword)`.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str, keyword: Option<&str>) -> Result<ScrapedPage, AdapterError>;
}

/// `RenderDocument(title, content, optionalUrl, optionalKeyword, outputDir)`.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderedDocument, AdapterError>;
}
