use std::path::{Path, PathBuf};

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

/// Environment variables that override loaded values, applied last.
pub const ENV_OUTPUT_DIRECTORY: &str = "LUCIO_OUTPUT_DIRECTORY";
pub const ENV_WORKER_COUNT: &str = "LUCIO_WORKER_COUNT";
pub const ENV_MAX_RETRIES: &str = "LUCIO_MAX_RETRIES";
pub const ENV_PLANNING_MODEL: &str = "LUCIO_PLANNING_MODEL";
pub const ENV_PERCEPTION_MODEL: &str = "LUCIO_PERCEPTION_MODEL";
pub const ENV_WEB_MODEL: &str = "LUCIO_WEB_MODEL";
pub const ENV_CONTENT_MODEL: &str = "LUCIO_CONTENT_MODEL";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// `<config dir>/lucio/config.json`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lucio").join("config.json"))
}

/// Loads `path`, or the default config file when it exists, or built-in
/// defaults; then applies environment overrides and validates the result.
pub fn resolve_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(p) => {
                tracing::debug!("Loading config from {}", p.display());
                load_config(&p)?
            }
            None => Config::default(),
        },
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(dir) = env_value(ENV_OUTPUT_DIRECTORY) {
        config.output_directory = dir;
    }
    if let Some(raw) = env_value(ENV_WORKER_COUNT) {
        config.worker_count = parse_override(ENV_WORKER_COUNT, &raw)?;
    }
    if let Some(raw) = env_value(ENV_MAX_RETRIES) {
        config.llm.max_retries = parse_override(ENV_MAX_RETRIES, &raw)?;
    }
    if let Some(model) = env_value(ENV_PLANNING_MODEL) {
        config.models.planning = model;
    }
    if let Some(model) = env_value(ENV_PERCEPTION_MODEL) {
        config.models.perception = model;
    }
    if let Some(model) = env_value(ENV_WEB_MODEL) {
        config.models.web = model;
    }
    if let Some(model) = env_value(ENV_CONTENT_MODEL) {
        config.models.content = model;
    }
    Ok(())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_override<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidOverride {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Invalid {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Invalid {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();

    if !error_messages.is_empty() {
        return Err(ConfigError::Schema {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Invalid {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.output_directory.trim().is_empty() {
        return Err(ConfigError::Invalid {
            message: "output_directory must not be empty".to_string(),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Invalid {
            message: "worker_count must be at least 1".to_string(),
        });
    }

    let models = [
        ("planning", &config.models.planning),
        ("perception", &config.models.perception),
        ("web", &config.models.web),
        ("content", &config.models.content),
    ];
    for (stage, model) in models {
        if model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: format!("Model name for the {} stage must not be empty", stage),
            });
        }
    }

    if config.capture.enabled && config.capture.interval_ms == 0 {
        return Err(ConfigError::Invalid {
            message: "capture.interval_ms must be positive".to_string(),
        });
    }

    let budgets = &config.budgets;
    if budgets.web_prompt_chars == 0
        || budgets.content_prompt_chars == 0
        || budgets.extended_text_chars == 0
        || budgets.trace_preview_chars == 0
    {
        return Err(ConfigError::Invalid {
            message: "character budgets must be positive".to_string(),
        });
    }

    Ok(())
}
