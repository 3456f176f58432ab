use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;

use super::budget::Budgets;

/// The part of [`Config`] the orchestrator itself needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_directory: PathBuf,
    pub budgets: Budgets,
    pub model_timeout: Option<Duration>,
    pub fetch_timeout: Option<Duration>,
    pub render_timeout: Option<Duration>,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_directory: PathBuf::from(&config.output_directory),
            budgets: config.budgets.clone(),
            model_timeout: config.timeouts.model_secs.map(Duration::from_secs),
            fetch_timeout: config.timeouts.fetch_secs.map(Duration::from_secs),
            render_timeout: config.timeouts.render_secs.map(Duration::from_secs),
        }
    }

    /// Default budgets, no timeouts.
    pub fn new<P: Into<PathBuf>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.into(),
            budgets: Budgets::default(),
            model_timeout: None,
            fetch_timeout: None,
            render_timeout: None,
        }
    }
}
