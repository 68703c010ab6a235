//! Rerank service client
//!
//! Second-pass relevance scoring over the merged candidate set. The client
//! is injected into the reranker at construction so tests can substitute a
//! fake; there is no process-wide singleton.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RerankClientError {
    #[error("Rerank request failed: {0}")]
    Request(String),

    #[error("Rerank service returned an error: {0}")]
    Service(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),
}

/// A candidate as submitted to the rerank service
#[derive(Debug, Clone, Serialize)]
pub struct RerankDocument {
    pub id: String,
    pub text: String,
}

/// One entry of the service's ranked response
///
/// `index` is relative to the submitted candidate list; entries arrive
/// sorted by descending relevance.
#[derive(Debug, Clone, Deserialize)]
pub struct RerankedEntry {
    pub index: usize,
    pub relevance_score: f32,
}

/// Trait for rerank backends
#[async_trait]
pub trait RerankClient: Send + Sync {
    /// Rerank `documents` against `query`, returning at most `top_n` entries
    /// sorted by descending relevance
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        top_n: usize,
    ) -> Result<Vec<RerankedEntry>, RerankClientError>;
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<&'a str>,
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankedEntry>,
}

/// HTTP client for a Cohere-compatible `/v2/rerank` endpoint
pub struct CohereRerankClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl CohereRerankClient {
    /// Create a client with an independent request timeout
    ///
    /// The API key is resolved from `api_key_env` at construction, never
    /// read from configuration files.
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key_env: &str,
        timeout: Duration,
    ) -> Result<Self, RerankClientError> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| RerankClientError::MissingApiKey(api_key_env.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RerankClientError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl RerankClient for CohereRerankClient {
    async fn rerank(
        &self,
        query: &str,
        documents: &[RerankDocument],
        top_n: usize,
    ) -> Result<Vec<RerankedEntry>, RerankClientError> {
        let url = format!("{}/v2/rerank", self.endpoint);
        let request = RerankRequest {
            model: &self.model,
            query,
            documents: documents.iter().map(|d| d.text.as_str()).collect(),
            top_n,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RerankClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RerankClientError::Service(format!("{}: {}", status, body)));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| RerankClientError::Service(e.to_string()))?;

        Ok(parsed.results)
    }
}
