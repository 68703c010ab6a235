//! Embedding service client
//!
//! The semantic retriever needs exactly one query embedding per search call.
//! The trait abstracts over the backend; the shipped implementation talks to
//! an Ollama-style HTTP endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Embedding service returned an error: {0}")]
    Service(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trait for embedding backends
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate an embedding vector for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model identifier used by the backend
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// HTTP client for an Ollama-compatible `/api/embeddings` endpoint
pub struct OllamaEmbeddingClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaEmbeddingClient {
    /// Create a client with an independent request timeout
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Result<Self, EmbeddingError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("Empty text".to_string()));
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Service(format!("{}: {}", status, body)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Service(e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(EmbeddingError::Service(
                "Empty embedding in response".to_string(),
            ));
        }

        Ok(parsed.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
