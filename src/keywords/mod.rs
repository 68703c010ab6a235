//! Keyword extraction for the lexical retrieval path
//!
//! Derives a small set of salient single-word terms from a query. Candidate
//! terms are unigrams only (n-gram size 1, sliding window 1), scored by term
//! frequency and first position: lower score = more relevant. The extractor
//! is deterministic, so the same normalized query always produces the same
//! ordered output.

use crate::document::Keyword;

/// Common English terms that carry no retrieval signal on their own
static STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because",
    "been", "before", "being", "between", "both", "but", "by", "can", "could", "did", "do", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "get", "had", "has",
    "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into",
    "is", "it", "its", "just", "like", "me", "more", "most", "my", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "use",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your",
];

/// Characters treated as part of a word during tokenization
///
/// Matches the character class the lexical retriever preserves when cleaning
/// terms, so extracted terms survive cleaning unchanged.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '/')
}

/// Unigram keyword extractor
#[derive(Debug, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract at most `max_keywords` terms, sorted ascending by score
    ///
    /// An empty or whitespace-only query yields an empty list; this is not
    /// an error.
    pub fn extract(&self, query: &str, max_keywords: usize) -> Vec<Keyword> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() || max_keywords == 0 {
            return Vec::new();
        }

        let tokens: Vec<&str> = normalized
            .split(|c: char| !is_word_char(c))
            .filter(|t| !t.is_empty())
            .collect();
        let total = tokens.len();
        if total == 0 {
            return Vec::new();
        }

        // First position and frequency per unique term. Single-character
        // tokens and stopwords carry no signal and are skipped, but they
        // still occupy positions in the token stream.
        let mut stats: std::collections::HashMap<&str, (usize, usize)> =
            std::collections::HashMap::new();
        for (position, &token) in tokens.iter().enumerate() {
            if token.chars().count() < 2 || STOPWORDS.contains(&token) {
                continue;
            }
            stats
                .entry(token)
                .and_modify(|(_, count)| *count += 1)
                .or_insert((position, 1));
        }

        // Earlier and more frequent terms score lower (= more relevant)
        let mut keywords: Vec<Keyword> = stats
            .into_iter()
            .map(|(term, (first, count))| Keyword {
                term: term.to_string(),
                score: (1.0 + first as f32 / total as f32) / count as f32,
            })
            .collect();

        keywords.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.term.cmp(&b.term))
        });
        keywords.truncate(max_keywords);
        keywords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_yields_no_keywords() {
        let extractor = KeywordExtractor::new();
        assert!(extractor.extract("", 4).is_empty());
        assert!(extractor.extract("   \t\n", 4).is_empty());
    }

    #[test]
    fn test_stopwords_only_yields_no_keywords() {
        let extractor = KeywordExtractor::new();
        assert!(extractor.extract("the of and to", 4).is_empty());
    }

    #[test]
    fn test_ascending_score_order() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("install graalpy on mac", 4);

        let terms: Vec<&str> = keywords.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, vec!["install", "graalpy", "mac"]);
        for pair in keywords.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
    }

    #[test]
    fn test_frequency_beats_position() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("timeout error error error", 4);
        assert_eq!(keywords[0].term, "error");
    }

    #[test]
    fn test_max_keywords_cap() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("alpha bravo charlie delta echo foxtrot", 4);
        assert_eq!(keywords.len(), 4);
    }

    #[test]
    fn test_normalization_lowercases() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("  Install GraalPy  ", 4);
        let terms: Vec<&str> = keywords.iter().map(|k| k.term.as_str()).collect();
        assert!(terms.contains(&"install"));
        assert!(terms.contains(&"graalpy"));
    }

    #[test]
    fn test_deterministic_output() {
        let extractor = KeywordExtractor::new();
        let a = extractor.extract("configure nginx reverse proxy", 4);
        let b = extractor.extract("configure nginx reverse proxy", 4);
        assert_eq!(a, b);
    }
}
