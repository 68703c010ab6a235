//! Configuration for the retrieval pipeline
//!
//! Loaded from TOML and validated up front; a bad configuration surfaces
//! every problem at once rather than failing one field at a time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration: {0}")]
    Io(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed: {errors:?}")]
    Validation { errors: Vec<ValidationError> },
}

/// One validation failure, with the path of the offending key
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub embedding: EmbeddingServiceConfig,
    pub rerank: RerankServiceConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Document store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Embedding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Rerank service settings
///
/// The API key itself is never stored here; `api_key_env` names the
/// environment variable it is read from at client construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankServiceConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_num_results")]
    pub default_num_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_num_results: default_num_results(),
        }
    }
}

fn default_max_connections() -> u32 {
    8
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_api_key_env() -> String {
    "COHERE_API_KEY".to_string()
}

fn default_num_results() -> usize {
    crate::retrieval::DEFAULT_NUM_RESULTS
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, collecting every failure
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // Two retrievers query concurrently; a single connection would
        // serialize them
        if self.store.max_connections < 2 {
            errors.push(ValidationError::new(
                "store.max_connections",
                "Must be at least 2 so lexical and semantic queries can run in parallel",
            ));
        }

        if self.embedding.endpoint.trim().is_empty() {
            errors.push(ValidationError::new(
                "embedding.endpoint",
                "Endpoint must not be empty",
            ));
        }
        if self.embedding.model.trim().is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model must not be empty",
            ));
        }
        if self.embedding.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "embedding.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }

        if self.rerank.endpoint.trim().is_empty() {
            errors.push(ValidationError::new(
                "rerank.endpoint",
                "Endpoint must not be empty",
            ));
        }
        if self.rerank.model.trim().is_empty() {
            errors.push(ValidationError::new(
                "rerank.model",
                "Model must not be empty",
            ));
        }
        if self.rerank.api_key_env.trim().is_empty() {
            errors.push(ValidationError::new(
                "rerank.api_key_env",
                "API key environment variable name must not be empty",
            ));
        }
        if self.rerank.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "rerank.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }

        if self.retrieval.default_num_results == 0 {
            errors.push(ValidationError::new(
                "retrieval.default_num_results",
                "Result budget must be at least 1",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [store]
        path = "/var/lib/docrank/docs.db"

        [embedding]
        endpoint = "http://localhost:11434"
        model = "snowflake-arctic-embed2"

        [rerank]
        endpoint = "https://api.cohere.com"
        model = "rerank-v3.5"
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.store.max_connections, 8);
        assert_eq!(config.embedding.timeout_secs, 30);
        assert_eq!(config.rerank.api_key_env, "COHERE_API_KEY");
        assert_eq!(config.retrieval.default_num_results, 5);
        config.validate().unwrap();
    }

    #[test]
    fn test_single_connection_rejected() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.store.max_connections = 1;

        let err = config.validate().unwrap_err();
        match err {
            ConfigError::Validation { errors } => {
                assert!(errors.iter().any(|e| e.path == "store.max_connections"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_all_failures_collected() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.store.max_connections = 0;
        config.embedding.endpoint = String::new();
        config.rerank.timeout_secs = 0;

        match config.validate().unwrap_err() {
            ConfigError::Validation { errors } => assert_eq!(errors.len(), 3),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/docrank.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
