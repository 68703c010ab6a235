//! Lexical retrieval via keyword full-text matching

use crate::document::{Document, RankedCandidate, SourceSignal};
use crate::error::SearchError;
use crate::keywords::KeywordExtractor;
use crate::store::DocumentStore;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Fixed number of keywords extracted per query
const KEYWORD_BUDGET: usize = 4;

/// Characters with no meaning inside a match term
static TERM_SPLITTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_+\-/]+").expect("constant pattern"));

/// Retrieves documents by boolean full-text match over extracted keywords
pub struct LexicalRetriever {
    store: Arc<DocumentStore>,
    extractor: KeywordExtractor,
}

impl LexicalRetriever {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            extractor: KeywordExtractor::new(),
        }
    }

    /// Retrieve up to `num_results` documents matching the query's keywords
    ///
    /// Returns an empty list without executing a query when no keywords can
    /// be extracted. README-tagged rows are excluded before truncation; this
    /// exclusion applies to the lexical path only.
    pub fn retrieve_by_keywords(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<RankedCandidate>, SearchError> {
        let keywords = self.extractor.extract(query, KEYWORD_BUDGET);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let terms: Vec<String> = keywords
            .iter()
            .filter_map(|kw| self.clean_term(&kw.term))
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let match_expr = terms
            .iter()
            .map(|term| format!("\"{}\"", term))
            .collect::<Vec<_>>()
            .join(" OR ");
        tracing::debug!(%match_expr, "Executing lexical query");

        let rows = self.store.full_text_query(&match_expr).map_err(|e| {
            tracing::error!("Lexical query failed: {}", e);
            SearchError::LexicalRetrieval(e.to_string())
        })?;

        let mut candidates: Vec<RankedCandidate> = rows
            .into_iter()
            .filter(|row| !is_readme(&row.document))
            .map(|row| RankedCandidate::new(row.document, SourceSignal::Lexical, row.score))
            .collect();

        // Truncate after filtering, not before
        candidates.truncate(num_results);
        Ok(candidates)
    }

    /// Strip a term down to letters, digits and `_ + - /`
    ///
    /// Stripped runs collapse to single spaces, so a term can become a
    /// quoted phrase. Terms that clean to nothing are dropped.
    fn clean_term(&self, term: &str) -> Option<String> {
        let cleaned = TERM_SPLITTER.replace_all(term, " ").trim().to_string();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

/// Policy: README passages never surface through the lexical path
fn is_readme(document: &Document) -> bool {
    document.metadata.source.to_uppercase().contains("README")
        || document.content.to_uppercase().contains("README")
}
