use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::error::Stage;

/// Events emitted by the pipeline while a run progresses.
/// Screen frames and page text are never part of an event.
pub enum ProgressEvent {
    StageStarted {
        stage: Stage,
    },
    StageFinished {
        stage: Stage,
        message: String,
    },
    Completed {
        pdf_file_path: String,
    },
    Failed {
        stage: Stage,
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests and fire-and-forget runs.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    StageStarted,
    StageFinished,
    Completed,
    Failed,
}

/// Serializable form of a [`ProgressEvent`] for observers outside the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunProgressEvent {
    pub request_id: String,
    pub phase: RunPhase,
    pub stage: Option<Stage>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Publishes progress on a broadcast channel. Sending with no subscriber is
/// not an error.
pub struct BroadcastProgress {
    request_id: String,
    sender: Arc<broadcast::Sender<RunProgressEvent>>,
}

impl BroadcastProgress {
    pub fn new(request_id: &str, sender: Arc<broadcast::Sender<RunProgressEvent>>) -> Self {
        Self {
            request_id: request_id.to_string(),
            sender,
        }
    }

    fn send(&self, phase: RunPhase, stage: Option<Stage>, message: String) {
        let _ = self.sender.send(RunProgressEvent {
            request_id: self.request_id.clone(),
            phase,
            stage,
            message,
            timestamp: Utc::now(),
        });
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage } => {
                self.send(RunPhase::StageStarted, Some(stage), format!("{} started", stage));
            }
            ProgressEvent::StageFinished { stage, message } => {
                self.send(RunPhase::StageFinished, Some(stage), message);
            }
            ProgressEvent::Completed { pdf_file_path } => {
                self.send(RunPhase::Completed, None, pdf_file_path);
            }
            ProgressEvent::Failed { stage, error } => {
                self.send(RunPhase::Failed, Some(stage), error);
            }
        }
    }
}
