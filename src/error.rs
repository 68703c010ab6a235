use thiserror::Error;

/// Pipeline error taxonomy
///
/// Retrieval failures carry the stage that failed so callers can decide on
/// retry or user-facing messaging. Empty-input conditions (no keywords, no
/// candidates after filtering) are legitimate empty results, never errors.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Lexical (full-text) query could not be executed
    #[error("Lexical retrieval failed: {0}")]
    LexicalRetrieval(String),

    /// Semantic (vector) query or query embedding could not be executed
    #[error("Semantic retrieval failed: {0}")]
    SemanticRetrieval(String),

    /// The rerank service call failed or returned a malformed response
    #[error("Reranking failed: {0}")]
    Rerank(String),
}

impl SearchError {
    /// True for failures in the candidate-retrieval phase (either signal)
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            SearchError::LexicalRetrieval(_) | SearchError::SemanticRetrieval(_)
        )
    }

    /// True for failures in the reranking phase
    pub fn is_rerank(&self) -> bool {
        matches!(self, SearchError::Rerank(_))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, SearchError>;
