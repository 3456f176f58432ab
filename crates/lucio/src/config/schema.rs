use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::budget::Budgets;

pub const CONFIG_VERSION: &str = "1.0";

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub budgets: Budgets,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            output_directory: default_output_directory(),
            worker_count: default_worker_count(),
            models: ModelsConfig::default(),
            llm: LlmConfig::default(),
            capture: CaptureConfig::default(),
            scraper: ScraperConfig::default(),
            budgets: Budgets::default(),
            timeouts: TimeoutsConfig::default(),
        }
    }
}

fn default_output_directory() -> String {
    "./outputs".to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

/// One model per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub planning: String,
    pub perception: String,
    pub web: String,
    pub content: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            planning: DEFAULT_MODEL.to_string(),
            perception: DEFAULT_MODEL.to_string(),
            web: DEFAULT_MODEL.to_string(),
            content: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    /// Inline key; prefer `api_key_file` or `api_key_env` outside local testing.
    pub api_key: Option<String>,
    pub api_key_file: Option<String>,
    pub api_key_env: Option<String>,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            api_key_file: None,
            api_key_env: Some("GOOGLE_API_KEY".to_string()),
            max_retries: 3,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    /// Screenshot command writing a PNG to stdout, program first.
    pub command: Vec<String>,
}

impl CaptureConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1000,
            command: default_capture_command(),
        }
    }
}

fn default_capture_command() -> Vec<String> {
    let parts: &[&str] = if cfg!(target_os = "macos") {
        &["screencapture", "-x", "-t", "png", "/dev/stdout"]
    } else if cfg!(target_os = "linux") {
        &["grim", "-"]
    } else {
        &[]
    };
    parts.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Per-call limits for adapter invocations. `null` means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub model_secs: Option<u64>,
    pub fetch_secs: Option<u64>,
    pub render_secs: Option<u64>,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            model_secs: Some(120),
            fetch_secs: Some(30),
            render_secs: Some(60),
        }
    }
}
