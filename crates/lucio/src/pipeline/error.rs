use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::AdapterError;

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Perceive,
    Fetch,
    Render,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Plan, Stage::Perceive, Stage::Fetch, Stage::Render];

    pub fn span_name(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Perceive => "perceive",
            Stage::Fetch => "fetch",
            Stage::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Plan => "Plan",
            Stage::Perceive => "Perceive",
            Stage::Fetch => "Fetch",
            Stage::Render => "Render",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong inside a stage. Never escapes the
/// orchestrator: each one is recorded on the run's error trail.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Failed to capture screen")]
    CaptureFailure,

    /// Perceive could not infer a URL. Soft: the run goes on.
    #[error("{}", missing_url_message(*retried))]
    UrlNotInferred { retried: bool },

    /// Fetch has no URL to work with. Hard: the run stops.
    #[error("No URL detected for web scraping")]
    NoUrlAvailable,

    #[error("Failed to scrape content from {url}{}", reason_suffix(reason))]
    FetchFailure { url: String, reason: Option<String> },

    #[error("No content available for document generation")]
    NoContent,

    #[error("Document generation failed: {0}")]
    RenderFailure(String),

    #[error("{0}")]
    AdapterFailure(#[from] AdapterError),
}

impl StageError {
    pub fn fetch(url: &str, reason: Option<String>) -> Self {
        StageError::FetchFailure {
            url: url.to_string(),
            reason,
        }
    }
}

fn missing_url_message(retried: bool) -> &'static str {
    if retried {
        "No URL could be inferred from the screen after retry"
    } else {
        "No URL found in screen analysis; retrying with a directive prompt"
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.is_empty() => format!(" ({})", r),
        _ => String::new(),
    }
}
