pub mod budget;
pub mod config;
pub mod error;
pub mod progress;
pub mod prompts;
pub mod record;
pub mod runner;

pub use budget::Budgets;
pub use config::PipelineConfig;
pub use error::{Stage, StageError};
pub use progress::{
    BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter, RunPhase, RunProgressEvent,
};
pub use record::{
    DocumentView, PerceptionView, PipelineRecord, PipelineStatus, RunRequest, RunResponse,
    TraceMessage, WebView,
};
pub use runner::{Adapters, Pipeline};
