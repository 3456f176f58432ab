pub mod adapters;
pub mod capture;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod render;
pub mod sanitize;
pub mod secrets;
pub mod signals;
pub mod storage;
pub mod telemetry;
pub mod web;
pub mod worker;

pub use adapters::{
    AdapterError, DocumentRenderer, PageFetcher, ScreenImage, ScreenSource, TextGenerator,
};
pub use capture::{CommandGrabber, FrameBuffer, ScreenStreamer};
pub use config::{load_config, resolve_config, Config};
pub use error::{CaptureError, ConfigError, LucioError, Result, StorageError, WorkerError};
pub use pipeline::{
    Adapters, Pipeline, PipelineConfig, PipelineRecord, PipelineStatus, RunRequest, RunResponse,
};
pub use secrets::{resolve_secret, SecretError};
pub use worker::{PipelineJob, PipelineOutcome, WorkerPool};
