//! Candidate deduplication by document id

use crate::document::Document;
use std::collections::HashSet;

/// Merge any number of document lists, unique by id
///
/// Lists are walked in the order given, each list in its own order. A
/// document is emitted the first time its id is seen; later occurrences are
/// suppressed. The caller's list order therefore decides which duplicate
/// survives.
pub fn merge_documents<I>(lists: I) -> Vec<Document>
where
    I: IntoIterator<Item = Vec<Document>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for list in lists {
        for document in list {
            if seen.insert(document.id.clone()) {
                merged.push(document);
            }
        }
    }

    merged
}
