//! Clients for the external embedding and rerank services
//!
//! Both services sit behind traits so the pipeline can be exercised with
//! test doubles; the HTTP implementations are the production backends.

mod embedding;
mod rerank;

pub use embedding::{EmbeddingClient, EmbeddingError, OllamaEmbeddingClient};
pub use rerank::{
    CohereRerankClient, RerankClient, RerankClientError, RerankDocument, RerankedEntry,
};
