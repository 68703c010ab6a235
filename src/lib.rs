//! Docrank - Hybrid Retrieval & Reranking Pipeline
//!
//! Retrieves the most relevant passages from a document corpus for a
//! natural-language query by combining lexical (full-text) and semantic
//! (vector) retrieval, merging the candidate sets, and reordering the
//! merged set with an external cross-encoder rerank service.

pub mod clients;
pub mod config;
pub mod document;
pub mod error;
pub mod keywords;
pub mod retrieval;
pub mod store;

pub use document::{Document, DocumentMetadata, Keyword, RankedCandidate, SourceSignal};
pub use error::{Result, SearchError};
pub use retrieval::{HybridSearcher, DEFAULT_NUM_RESULTS};
