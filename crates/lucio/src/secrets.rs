//! Secret resolution for model API keys.
//!
//! A key is looked up in priority order:
//!
//! 1. **Direct value** in the config file, for quick local testing
//! 2. **File reference**, for the Docker secrets pattern (`/run/secrets/...`)
//! 3. **Env var reference**, e.g. `GOOGLE_API_KEY`

use secrecy::SecretString;
use std::fs;

use crate::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No API key configured; set llm.api_key, llm.api_key_file or llm.api_key_env")]
    NotConfigured,

    #[error("Cannot read key file '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Key file '{path}' is empty")]
    EmptyFile { path: String },

    #[error("Key variable '{name}' is unset or blank")]
    EnvMissing { name: String },

    #[error("Key variable '{name}' is not valid UTF-8")]
    EnvNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first non-empty source among `direct`,
/// `file_path` and `env_var`.
///
/// ```ignore
/// use lucio::secrets::resolve_secret;
///
/// let key = resolve_secret(None, Some("~/.secrets/gemini"), Some("GOOGLE_API_KEY"))?;
/// ```
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::Unreadable {
            path: expanded.clone(),
            source: e,
        })?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(SecretError::EmptyFile { path: expanded });
        }
        return Ok(SecretString::from(trimmed.to_string()));
    }

    if let Some(var_name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(var_name) {
            // Env vars may carry trailing newlines
            Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
            Ok(_) | Err(std::env::VarError::NotPresent) => Err(SecretError::EnvMissing {
                name: var_name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvNotUnicode {
                name: var_name.to_string(),
            }),
        };
    }

    Err(SecretError::NotConfigured)
}

/// Resolves the model API key configured in the `llm` section.
pub fn resolve_api_key(llm: &LlmConfig) -> Result<SecretString> {
    resolve_secret(
        llm.api_key.as_deref(),
        llm.api_key_file.as_deref(),
        llm.api_key_env.as_deref(),
    )
}

/// Expands a leading `~` or `~/` to the current user's home directory.
/// `~user/path` is not supported.
pub fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy();
            if path == "~" {
                return home.into_owned();
            }
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
