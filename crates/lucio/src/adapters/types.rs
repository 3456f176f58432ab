use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use chrono::{DateTime, Utc};

/// One captured screen frame. Cloning shares the underlying bytes.
#[derive(Clone)]
pub struct ScreenImage {
    bytes: Arc<[u8]>,
    captured_at: DateTime<Utc>,
}

impl ScreenImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// MIME type sniffed from the image header; frames are PNG unless the
    /// grabber produced something else.
    pub fn mime_type(&self) -> &'static str {
        match image::guess_format(&self.bytes) {
            Ok(image::ImageFormat::Jpeg) => "image/jpeg",
            _ => "image/png",
        }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

impl fmt::Debug for ScreenImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenImage")
            .field("len", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Result of fetching and summarizing one web page.
#[derive(Debug, Clone, Default)]
pub struct ScrapedPage {
    pub title: String,
    /// All extracted text of the main content element.
    pub full_text: String,
    /// Head of `full_text`, cut to the extended-text budget.
    pub extended_text: String,
    pub quick_summary: String,
    pub keyword_found: bool,
}

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub keyword: Option<String>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_path: PathBuf,
    pub filename: String,
}
