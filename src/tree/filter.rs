use crate::core::CategoryRecord;

use super::build::{Forest, prune};

/// Prune the forest to nodes matching `query` plus their ancestors.
///
/// Matching is a case-insensitive substring test on the name, the
/// description and the translated names. A blank query returns the forest
/// unchanged.
pub fn filter_forest(forest: &Forest, query: &str) -> Forest {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return forest.clone();
    }
    Forest::new(prune(forest.roots(), |record| matches(record, &needle)))
}

fn matches(record: &CategoryRecord, needle: &str) -> bool {
    contains(&record.nom, needle)
        || record
            .description
            .as_deref()
            .is_some_and(|description| contains(description, needle))
        || record.locales.iter().any(|name| contains(name, needle))
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
