//! Relevance reranking of the merged candidate set

use crate::clients::{RerankClient, RerankDocument};
use crate::document::Document;
use crate::error::SearchError;
use std::sync::Arc;

/// Reorders candidates by relevance via the external rerank service
///
/// The client is an injected dependency so tests can substitute a fake.
pub struct Reranker {
    client: Arc<dyn RerankClient>,
}

impl Reranker {
    pub fn new(client: Arc<dyn RerankClient>) -> Self {
        Self { client }
    }

    /// Rerank `candidates` against `query`, returning at most `num_results`
    ///
    /// Candidates whose trimmed content is empty are never submitted and
    /// never appear in the output. An empty filtered set short-circuits to an
    /// empty result without calling the service. Service failures wrap into
    /// a single reranking failure; retry policy is a caller concern.
    pub async fn rerank(
        &self,
        candidates: Vec<Document>,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<Document>, SearchError> {
        let valid: Vec<Document> = candidates
            .into_iter()
            .filter(|doc| !doc.content.trim().is_empty())
            .collect();

        if valid.is_empty() {
            return Ok(Vec::new());
        }

        let submitted: Vec<RerankDocument> = valid
            .iter()
            .map(|doc| RerankDocument {
                id: doc.id.clone(),
                text: doc.content.trim().to_string(),
            })
            .collect();

        tracing::debug!(candidates = submitted.len(), "Calling rerank service");
        let entries = self
            .client
            .rerank(query, &submitted, num_results)
            .await
            .map_err(|e| SearchError::Rerank(e.to_string()))?;

        // Indices are relative to the submitted set; the service's order is
        // the final order
        let mut reranked = Vec::with_capacity(entries.len());
        for entry in entries {
            let document = valid.get(entry.index).cloned().ok_or_else(|| {
                SearchError::Rerank(format!(
                    "Service returned out-of-range index {}",
                    entry.index
                ))
            })?;
            reranked.push(document);
        }

        // Safety bound even if the service returns more than requested
        reranked.truncate(num_results);
        Ok(reranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{RerankClientError, RerankedEntry};
    use crate::document::DocumentMetadata;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double returning a canned index order and counting calls
    struct FakeRerank {
        order: Vec<usize>,
        calls: AtomicUsize,
    }

    impl FakeRerank {
        fn new(order: Vec<usize>) -> Self {
            Self {
                order,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RerankClient for FakeRerank {
        async fn rerank(
            &self,
            _query: &str,
            _documents: &[RerankDocument],
            _top_n: usize,
        ) -> Result<Vec<RerankedEntry>, RerankClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .order
                .iter()
                .enumerate()
                .map(|(rank, &index)| RerankedEntry {
                    index,
                    relevance_score: 1.0 - rank as f32 * 0.1,
                })
                .collect())
        }
    }

    fn doc(id: &str, content: &str) -> Document {
        Document::new(id, content, DocumentMetadata::default())
    }

    #[tokio::test]
    async fn test_empty_candidates_skip_service_call() {
        let client = Arc::new(FakeRerank::new(vec![]));
        let reranker = Reranker::new(client.clone());

        let results = reranker.rerank(Vec::new(), "query", 3).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_candidates_skip_service_call() {
        let client = Arc::new(FakeRerank::new(vec![]));
        let reranker = Reranker::new(client.clone());

        let candidates = vec![doc("d1", ""), doc("d2", "   \n\t ")];
        let results = reranker.rerank(candidates, "query", 3).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_order_is_final() {
        let client = Arc::new(FakeRerank::new(vec![2, 0, 1]));
        let reranker = Reranker::new(client);

        let candidates = vec![doc("a", "one"), doc("b", "two"), doc("c", "three")];
        let results = reranker.rerank(candidates, "query", 3).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_indices_map_against_submitted_set() {
        // d2 has blank content and is dropped before submission, so index 1
        // names d3 in the submitted set
        let client = Arc::new(FakeRerank::new(vec![1]));
        let reranker = Reranker::new(client);

        let candidates = vec![doc("d1", "alpha"), doc("d2", "  "), doc("d3", "beta")];
        let results = reranker.rerank(candidates, "query", 3).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "d3");
    }

    #[tokio::test]
    async fn test_truncates_overlong_service_response() {
        let client = Arc::new(FakeRerank::new(vec![0, 1, 2]));
        let reranker = Reranker::new(client);

        let candidates = vec![doc("a", "one"), doc("b", "two"), doc("c", "three")];
        let results = reranker.rerank(candidates, "query", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_rerank_error() {
        let client = Arc::new(FakeRerank::new(vec![7]));
        let reranker = Reranker::new(client);

        let err = reranker
            .rerank(vec![doc("a", "one")], "query", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Rerank(_)));
    }

    #[tokio::test]
    async fn test_client_failure_wraps_into_rerank_error() {
        struct FailingRerank;

        #[async_trait]
        impl RerankClient for FailingRerank {
            async fn rerank(
                &self,
                _query: &str,
                _documents: &[RerankDocument],
                _top_n: usize,
            ) -> Result<Vec<RerankedEntry>, RerankClientError> {
                Err(RerankClientError::Service("503".to_string()))
            }
        }

        let reranker = Reranker::new(Arc::new(FailingRerank));
        let err = reranker
            .rerank(vec![doc("a", "one")], "query", 3)
            .await
            .unwrap_err();
        assert!(err.is_rerank());
    }
}
