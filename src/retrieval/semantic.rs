//! Semantic retrieval via vector similarity

use crate::clients::EmbeddingClient;
use crate::document::{RankedCandidate, SourceSignal};
use crate::error::SearchError;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Retrieves documents by vector distance to the query embedding
pub struct SemanticRetriever {
    store: Arc<DocumentStore>,
    embedding: Arc<dyn EmbeddingClient>,
}

impl SemanticRetriever {
    pub fn new(store: Arc<DocumentStore>, embedding: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedding }
    }

    /// Retrieve the `num_results` nearest documents to the query
    ///
    /// One embedding call, one store query limited server-side. Zero rows is
    /// a legitimate empty result. No README filtering on this path.
    pub async fn retrieve_by_similarity(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<RankedCandidate>, SearchError> {
        let query_embedding = self.embedding.embed(query).await.map_err(|e| {
            tracing::error!("Query embedding failed: {}", e);
            SearchError::SemanticRetrieval(e.to_string())
        })?;

        let rows = self
            .store
            .vector_query(&query_embedding, num_results)
            .map_err(|e| {
                tracing::error!("Vector query failed: {}", e);
                SearchError::SemanticRetrieval(e.to_string())
            })?;

        Ok(rows
            .into_iter()
            .map(|row| RankedCandidate::new(row.document, SourceSignal::Semantic, row.score))
            .collect())
    }
}
