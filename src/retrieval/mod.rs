//! Hybrid Retrieval & Reranking
//!
//! The pipeline for one `search` call: keyword extraction feeds the lexical
//! retriever, the semantic retriever embeds the query, both run in parallel,
//! their results merge first-seen-by-id (lexical first), and the rerank
//! service produces the final order.

mod dedup;
mod hybrid;
mod lexical;
mod reranker;
mod semantic;

pub use dedup::merge_documents;
pub use hybrid::{HybridSearcher, SetupError, DEFAULT_NUM_RESULTS};
pub use lexical::LexicalRetriever;
pub use reranker::Reranker;
pub use semantic::SemanticRetriever;
