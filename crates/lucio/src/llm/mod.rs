//! Model clients behind [`crate::adapters::TextGenerator`].

pub mod gemini;
pub mod retry;

pub use gemini::GeminiClient;
pub use retry::{RetryConfig, RetryingGenerator};
