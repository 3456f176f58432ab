use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::ScreenImage;
use crate::signals::extract_explicit_url;

use super::error::{Stage, StageError};

/// Lifecycle of one pipeline run.
///
/// Forward-only `pending < running < partial < completed`; `failed` can be
/// entered from any non-terminal state. `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Pending,
    Running,
    /// The run continues in a degraded state (e.g. no URL inferred yet).
    Partial,
    Completed,
    Failed,
}

impl PipelineStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStatus::Completed | PipelineStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            PipelineStatus::Pending => 0,
            PipelineStatus::Running => 1,
            PipelineStatus::Partial => 2,
            PipelineStatus::Completed => 3,
            PipelineStatus::Failed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStatus::Pending => "pending",
            PipelineStatus::Running => "running",
            PipelineStatus::Partial => "partial",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observability entry, appended when a stage finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMessage {
    pub stage: Stage,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Everything the Perceive stage produces. `detected_url` may also be filled
/// at ingestion, in which case `url_supplied` is set and Perceive leaves it
/// alone.
#[derive(Debug, Clone, Default)]
pub struct PerceptionView {
    pub screen_image: Option<ScreenImage>,
    pub screen_analysis: Option<String>,
    pub detected_url: Option<String>,
    pub keyword: Option<String>,
    pub url_supplied: bool,
}

/// Everything the Fetch stage produces.
#[derive(Debug, Clone)]
pub struct WebView {
    pub url: String,
    pub title: String,
    pub summary: String,
    /// Model-processed page content handed to Render.
    pub output_text: String,
    /// Raw page text as scraped.
    pub output_text_from_url: String,
}

/// Everything the Render stage produces.
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub pdf_filename: String,
    pub pdf_file_path: PathBuf,
    pub pdf_generated: bool,
}

/// The single state object threaded through the four stages of one run.
///
/// Stage outputs are public and written once by their producing stage.
/// Status, errors and trace messages only change through the methods below,
/// which keep them cumulative.
#[derive(Debug, Clone)]
pub struct PipelineRecord {
    request_id: String,
    input_prompt: String,

    // Plan
    pub execute_plan: Option<String>,

    // Perceive
    pub perception: PerceptionView,

    // Fetch
    pub web: Option<WebView>,

    // Render
    pub document: Option<DocumentView>,

    status: PipelineStatus,
    errors: Vec<String>,
    messages: Vec<TraceMessage>,
}

impl PipelineRecord {
    pub fn new(input_prompt: impl Into<String>, supplied_url: Option<String>) -> Self {
        let supplied_url = supplied_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            input_prompt: input_prompt.into(),
            execute_plan: None,
            perception: PerceptionView {
                url_supplied: supplied_url.is_some(),
                detected_url: supplied_url,
                ..PerceptionView::default()
            },
            web: None,
            document: None,
            status: PipelineStatus::Pending,
            errors: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Ingests a request. Without a caller-supplied URL, an explicit or
    /// labelled URL in the prompt itself counts as supplied.
    pub fn from_request(request: &RunRequest) -> Self {
        let mut record = Self::new(request.prompt.clone(), request.url.clone());
        if record.perception.detected_url.is_none() {
            if let Some(url) = extract_explicit_url(&request.prompt) {
                record.perception.detected_url = Some(url);
                record.perception.url_supplied = true;
            }
        }
        record
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn input_prompt(&self) -> &str {
        &self.input_prompt
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn messages(&self) -> &[TraceMessage] {
        &self.messages
    }

    /// URL known to the run: the fetched URL once Fetch ran, otherwise the
    /// detected one.
    pub fn known_url(&self) -> Option<&str> {
        self.web
            .as_ref()
            .map(|w| w.url.as_str())
            .or(self.perception.detected_url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }

    pub fn pdf_generated(&self) -> bool {
        self.document.as_ref().is_some_and(|d| d.pdf_generated)
    }

    pub fn pdf_file_path(&self) -> Option<&PathBuf> {
        self.document.as_ref().map(|d| &d.pdf_file_path)
    }

    /// Moves the status forward. Backward moves and moves out of a terminal
    /// state are ignored; `failed` and `completed` go through [`Self::fail`]
    /// and [`Self::complete`].
    pub(crate) fn advance(&mut self, next: PipelineStatus) {
        if self.status.is_terminal() || next.is_terminal() {
            tracing::warn!(from = %self.status, to = %next, "Rejected status transition");
            return;
        }
        if next.rank() >= self.status.rank() {
            self.status = next;
        }
    }

    /// Records a stage failure and makes the run terminal.
    pub(crate) fn fail(&mut self, stage: Stage, error: &StageError) {
        self.push_error(stage, error);
        if self.status != PipelineStatus::Completed {
            self.status = PipelineStatus::Failed;
        }
    }

    /// Records a recoverable problem without changing the status.
    pub(crate) fn push_error(&mut self, stage: Stage, error: &StageError) {
        self.errors.push(format!("{}: {}", stage, error));
    }

    /// Marks the run completed; only valid once a document was generated.
    pub(crate) fn complete(&mut self) -> bool {
        if self.status.is_terminal() || !self.pdf_generated() {
            return false;
        }
        self.status = PipelineStatus::Completed;
        true
    }

    pub(crate) fn trace(&mut self, stage: Stage, text: impl Into<String>) {
        self.messages.push(TraceMessage {
            stage,
            text: format!("[{}] {}", stage, text.into()),
            at: Utc::now(),
        });
    }

    pub fn to_response(&self) -> RunResponse {
        RunResponse {
            request_id: self.request_id.clone(),
            status: self.status,
            pdf_file_path: self.pdf_file_path().map(|p| p.display().to_string()),
            pdf_generated: self.pdf_generated(),
            errors: self.errors.clone(),
        }
    }
}

/// Ingestion input for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl RunRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// What the caller gets back once a run reached a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub request_id: String,
    pub status: PipelineStatus,
    pub pdf_file_path: Option<String>,
    pub pdf_generated: bool,
    pub errors: Vec<String>,
}
