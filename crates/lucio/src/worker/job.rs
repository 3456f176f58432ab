use chrono::{DateTime, Utc};

use crate::pipeline::{PipelineRecord, RunRequest, RunResponse};

/// One queued run.
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub id: String,
    pub request: RunRequest,
    pub submitted_at: DateTime<Utc>,
}

impl PipelineJob {
    pub fn new(request: RunRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            submitted_at: Utc::now(),
        }
    }
}

/// A finished run. The record is owned by exactly one outcome.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub job_id: String,
    pub record: PipelineRecord,
    pub finished_at: DateTime<Utc>,
}

impl PipelineOutcome {
    pub fn response(&self) -> RunResponse {
        self.record.to_response()
    }
}
