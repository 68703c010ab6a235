//! Hybrid search orchestration

use crate::clients::{
    CohereRerankClient, EmbeddingClient, EmbeddingError, OllamaEmbeddingClient, RerankClient,
    RerankClientError,
};
use crate::config::Config;
use crate::document::Document;
use crate::error::SearchError;
use crate::retrieval::{merge_documents, LexicalRetriever, Reranker, SemanticRetriever};
use crate::store::{DocumentStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default result budget for `search_default`
pub const DEFAULT_NUM_RESULTS: usize = 5;

/// Errors while wiring the pipeline from configuration
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Store setup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Embedding client setup failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Rerank client setup failed: {0}")]
    Rerank(#[from] RerankClientError),
}

/// Stateless hybrid search pipeline
///
/// Each call is independent and carries no cross-call memory; the shared
/// components are immutable behind `Arc`.
pub struct HybridSearcher {
    lexical: Arc<LexicalRetriever>,
    semantic: Arc<SemanticRetriever>,
    reranker: Arc<Reranker>,
}

impl HybridSearcher {
    pub fn new(
        store: Arc<DocumentStore>,
        embedding_client: Arc<dyn EmbeddingClient>,
        rerank_client: Arc<dyn RerankClient>,
    ) -> Self {
        Self {
            lexical: Arc::new(LexicalRetriever::new(store.clone())),
            semantic: Arc::new(SemanticRetriever::new(store, embedding_client)),
            reranker: Arc::new(Reranker::new(rerank_client)),
        }
    }

    /// Wire the pipeline from configuration: pooled store plus the two HTTP
    /// service clients
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let store = Arc::new(DocumentStore::open(
            &config.store.path,
            config.store.max_connections,
        )?);

        let embedding_client = Arc::new(OllamaEmbeddingClient::new(
            &config.embedding.endpoint,
            &config.embedding.model,
            Duration::from_secs(config.embedding.timeout_secs),
        )?);

        let rerank_client = Arc::new(CohereRerankClient::new(
            &config.rerank.endpoint,
            &config.rerank.model,
            &config.rerank.api_key_env,
            Duration::from_secs(config.rerank.timeout_secs),
        )?);

        Ok(Self::new(store, embedding_client, rerank_client))
    }

    /// Perform a hybrid search returning at most `num_results` documents
    ///
    /// Both retrievers target `num_results` candidates each, so the merged
    /// pool reranked is at most `2 * num_results` minus duplicates.
    pub async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<Document>, SearchError> {
        // An empty query is a legitimate empty result, not a failure; no
        // service is called
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Step 1: parallel lexical + semantic retrieval. The lexical path is
        // pure blocking I/O and runs on the blocking pool; each retriever
        // checks out its own pooled connection, so neither serializes on the
        // other.
        let lexical = self.lexical.clone();
        let lexical_query = query.to_string();
        let lexical_task = tokio::task::spawn_blocking(move || {
            lexical.retrieve_by_keywords(&lexical_query, num_results)
        });

        let (lexical_results, semantic_results) = tokio::join!(
            lexical_task,
            self.semantic.retrieve_by_similarity(query, num_results)
        );
        let lexical_results = lexical_results
            .map_err(|e| SearchError::LexicalRetrieval(format!("Retrieval task failed: {}", e)))??;
        let semantic_results = semantic_results?;

        tracing::debug!(
            lexical = lexical_results.len(),
            semantic = semantic_results.len(),
            "Retrieval phase complete"
        );

        // Step 2: merge lexical-then-semantic; first-seen id wins, so
        // lexical is authoritative on ties
        let lexical_docs: Vec<Document> = lexical_results
            .into_iter()
            .map(|candidate| candidate.document)
            .collect();
        let semantic_docs: Vec<Document> = semantic_results
            .into_iter()
            .map(|candidate| candidate.document)
            .collect();
        let merged = merge_documents([lexical_docs, semantic_docs]);

        // Step 3: rerank strictly after the merge; the service's order is
        // final, no re-sorting by raw retrieval score
        self.reranker.rerank(merged, query, num_results).await
    }

    /// `search` with the default result budget
    pub async fn search_default(&self, query: &str) -> Result<Vec<Document>, SearchError> {
        self.search(query, DEFAULT_NUM_RESULTS).await
    }
}
