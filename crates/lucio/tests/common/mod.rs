//! Shared test utilities for lucio integration tests.
//!
//! `TestHarness` wires a pipeline to scripted stand-ins for the model,
//! the screen and the web, and the real PDF renderer writing into a
//! temporary directory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use lucio::adapters::{
    AdapterError, PageFetcher, ScrapedPage, ScreenImage, ScreenSource, TextGenerator,
};
use lucio::capture::FrameBuffer;
use lucio::pipeline::{Adapters, Pipeline, PipelineConfig};
use lucio::render::PdfRenderer;

pub const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Answers each stage's prompt with a canned reply, recognised by the
/// markers the prompt builders put in.
#[derive(Clone)]
pub struct ScriptedModel {
    pub plan: String,
    pub screen_analysis: String,
    pub directive_answer: String,
    pub web_answer: String,
    pub content_answer: String,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self {
            plan: "1. look at the screen 2. read the page 3. write it up".to_string(),
            screen_analysis: "The browser shows a news article.\nURL: https://news.example.org/story".to_string(),
            directive_answer: "URL: N/A".to_string(),
            web_answer: "- point one\n- point two".to_string(),
            content_answer: "## Summary\nThe article makes two points.\n- point one\n- point two"
                .to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScriptedModel {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedModel {
    fn generate(&self, prompt: &str, image: Option<&ScreenImage>) -> Result<String, AdapterError> {
        let (kind, answer) = if prompt.contains("SOURCE CONTENT:") {
            ("content", &self.content_answer)
        } else if prompt.contains("PAGE CONTENT:") {
            ("web", &self.web_answer)
        } else if prompt.contains("The user asked:") {
            ("directive", &self.directive_answer)
        } else if prompt.contains("USER QUERY:") {
            ("perception", &self.screen_analysis)
        } else {
            ("plan", &self.plan)
        };

        if matches!(kind, "perception" | "directive") && image.is_none() {
            return Err(AdapterError::InvalidResponse("no image attached".to_string()));
        }

        self.calls.lock().unwrap().push(kind.to_string());
        Ok(answer.clone())
    }
}

/// Serves fixed pages by URL; anything else is a transport failure.
#[derive(Default)]
pub struct FixtureWeb {
    pages: HashMap<String, (String, String)>,
    fetched: Mutex<Vec<String>>,
}

impl FixtureWeb {
    pub fn with_page(mut self, url: &str, title: &str, text: &str) -> Self {
        self.pages
            .insert(url.to_string(), (title.to_string(), text.to_string()));
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl PageFetcher for FixtureWeb {
    fn fetch(&self, url: &str, keyword: Option<&str>) -> Result<ScrapedPage, AdapterError> {
        self.fetched.lock().unwrap().push(url.to_string());
        let (title, text) = self
            .pages
            .get(url)
            .ok_or_else(|| AdapterError::Transport(format!("connection refused: {}", url)))?;

        Ok(ScrapedPage {
            title: title.clone(),
            full_text: text.clone(),
            extended_text: lucio::web::extended_text(text, 2000),
            quick_summary: lucio::web::quick_summary(text, keyword),
            keyword_found: lucio::web::extract::contains_keyword(text, keyword),
        })
    }
}

/// Isolated environment: one temp output directory and a pipeline over it.
pub struct TestHarness {
    temp_dir: TempDir,
    pub output_dir: PathBuf,
    pub model: ScriptedModel,
    pub web: Arc<FixtureWeb>,
    pub screen: FrameBuffer,
}

impl TestHarness {
    pub fn new(model: ScriptedModel, web: FixtureWeb) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_dir = temp_dir.path().join("outputs");

        Self {
            temp_dir,
            output_dir,
            model,
            web: Arc::new(web),
            screen: FrameBuffer::new(),
        }
    }

    /// Publishes a PNG-looking frame so Perceive has something to send.
    pub fn with_frame(self) -> Self {
        self.screen.publish(ScreenImage::new(PNG_SIGNATURE.to_vec()));
        self
    }

    pub fn base_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn pipeline(&self) -> Pipeline {
        let adapters = Adapters::with_model(
            Arc::new(self.model.clone()),
            Arc::new(self.screen.clone()) as Arc<dyn ScreenSource>,
            Arc::clone(&self.web) as Arc<dyn PageFetcher>,
            Arc::new(PdfRenderer::new()),
        );
        Pipeline::new(Arc::new(PipelineConfig::new(&self.output_dir)), adapters)
    }

    pub fn output_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }
}
