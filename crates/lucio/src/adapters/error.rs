use std::time::Duration;

use thiserror::Error;

/// Failure reported by an external capability.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No content returned")]
    EmptyContent,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(String),

    #[error("Adapter unavailable: {0}")]
    Unavailable(String),
}

impl AdapterError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Transport(_) | AdapterError::Timeout(_) => true,
            AdapterError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return AdapterError::Transport(format!("timed out: {}", e.without_url()));
        }
        AdapterError::Transport(e.without_url().to_string())
    }
}
