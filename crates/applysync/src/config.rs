//! Engine configuration: JSON file loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default mailbox query targeting application confirmation subjects.
/// Deliberately broad; the candidate filter and classifier narrow it down.
pub const DEFAULT_SEARCH_QUERY: &str = "subject:\"application received\" OR subject:\"application confirmation\" OR subject:\"thank you for applying\" OR subject:\"your application\"";

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Engine configuration. Every field has a default so an empty JSON object
/// is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Mailbox search query handed to the mail source.
    pub search_query: String,
    /// Maximum messages fetched per run.
    pub max_results: u32,
    /// Characters of body text kept for classification.
    pub body_limit: usize,
    /// Per-message classification timeout in seconds.
    pub classify_timeout_secs: u64,
    /// Generative strategy settings. Absent means the generative strategy
    /// is disabled entirely and the pattern strategy runs standalone.
    pub generative: Option<GenerativeConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            search_query: DEFAULT_SEARCH_QUERY.to_string(),
            max_results: 100,
            body_limit: 4000,
            classify_timeout_secs: 30,
            generative: None,
        }
    }
}

/// Settings for the generative classification strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "APPLYSYNC_COMPLETION_API_KEY".to_string()
}

/// Loads and validates a config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Parses and validates a config from a JSON string.
pub fn load_config_from_str(content: &str) -> Result<SyncConfig, ConfigError> {
    let config: SyncConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.search_query.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "searchQuery must not be empty".to_string(),
        });
    }

    if config.max_results == 0 || config.max_results > 500 {
        return Err(ConfigError::Validation {
            message: format!("maxResults must be 1-500, got {}", config.max_results),
        });
    }

    if config.body_limit == 0 {
        return Err(ConfigError::Validation {
            message: "bodyLimit must be greater than zero".to_string(),
        });
    }

    if config.classify_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "classifyTimeoutSecs must be greater than zero".to_string(),
        });
    }

    if let Some(generative) = &config.generative {
        if generative.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "generative.endpoint must not be empty".to_string(),
            });
        }
        if generative.model.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "generative.model must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_valid() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.max_results, 100);
        assert_eq!(config.body_limit, 4000);
        assert!(config.generative.is_none());
        assert!(config.search_query.contains("thank you for applying"));
    }

    #[test]
    fn test_full_config_parses() {
        let config = load_config_from_str(
            r#"{
                "searchQuery": "subject:applied",
                "maxResults": 50,
                "bodyLimit": 2000,
                "classifyTimeoutSecs": 10,
                "generative": {
                    "endpoint": "https://api.example.com/v1/chat/completions",
                    "model": "small-1"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.max_results, 50);
        let generative = config.generative.unwrap();
        assert_eq!(generative.model, "small-1");
        assert_eq!(generative.api_key_env, "APPLYSYNC_COMPLETION_API_KEY");
    }

    #[test]
    fn test_zero_max_results_is_rejected() {
        let err = load_config_from_str(r#"{"maxResults": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_empty_generative_endpoint_is_rejected() {
        let err = load_config_from_str(
            r#"{"generative": {"endpoint": " ", "model": "small-1"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"maxResults": 25}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.max_results, 25);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_config("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
