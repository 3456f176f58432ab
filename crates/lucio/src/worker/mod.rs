pub mod job;
pub mod pool;

pub use job::{PipelineJob, PipelineOutcome};
pub use pool::WorkerPool;
