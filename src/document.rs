//! Core value types flowing through the retrieval pipeline
//!
//! All of these are request-scoped: created at the start of a `search` call
//! and discarded at its end. Nothing here is persisted by the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A corpus passage as materialized from the store
///
/// Identity is `id`; content and metadata are a read-only view from the
/// store's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier, unique within the corpus
    pub id: String,

    /// Full passage text, already decoded from any large-object column
    pub content: String,

    /// Provenance metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
        }
    }
}

/// Document metadata with a typed provenance field
///
/// `source` is required by the lexical README-exclusion rule; everything
/// else the ingestion layer attaches lands in the open extension map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Provenance string (file path, URL, ...)
    #[serde(default)]
    pub source: String,

    /// Ingestion-defined extension fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl DocumentMetadata {
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            extra: HashMap::new(),
        }
    }
}

/// A salient query term with its relevance score
///
/// Lower score = higher relevance; ordering is ascending by score.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub term: String,
    pub score: f32,
}

/// Which retrieval signal produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSignal {
    Lexical,
    Semantic,
}

/// A retrieved document together with its raw retrieval score
///
/// Raw scores have different semantics per signal (bm25 rank vs. vector
/// distance) and are never compared across signals; the merge is by call
/// order, not by score.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub document: Document,
    pub signal: SourceSignal,
    pub raw_score: f32,
}

impl RankedCandidate {
    pub fn new(document: Document, signal: SourceSignal, raw_score: f32) -> Self {
        Self {
            document,
            signal,
            raw_score,
        }
    }
}
