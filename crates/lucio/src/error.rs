use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LucioError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not store output: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker pool: {0}")]
    Worker(#[from] WorkerError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Adapter setup failed: {0}")]
    Adapter(#[from] crate::adapters::AdapterError),

    #[error("Failed to read input '{path}': {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config rejected: {message}")]
    Invalid { message: String },

    #[error("Config does not match schema: {errors}")]
    Schema { errors: String },

    #[error("Invalid value for environment override '{name}': {reason}")]
    InvalidOverride { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create output directory '{path}': {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free filename left for {0}")]
    NamesExhausted(PathBuf),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Job queue is closed")]
    QueueClosed,

    #[error("No worker threads available: {0}")]
    NoWorkers(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Screen capture command is not configured")]
    NoCommand,

    #[error("Failed to run capture command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Capture command '{command}' exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("Captured frame is not a PNG or JPEG image")]
    NotAnImage,

    #[error("Failed to start screen streamer: {0}")]
    StreamerSpawn(String),
}

pub type Result<T> = std::result::Result<T, LucioError>;
