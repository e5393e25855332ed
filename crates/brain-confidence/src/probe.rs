//! Cheap contradiction probe for text that has no embedding yet.
//!
//! A stored record is suspect when the incoming text carries a negation whose
//! affirmative counterpart appears in the stored text, and the two texts
//! share enough vocabulary to be about the same thing.

use std::collections::HashSet;

use brain_core::memory::MemoryRecord;

/// `(negation in incoming text, affirmation in stored text)`, matched as
/// lower-case substrings. The empty affirmation matches any stored text.
const NEGATION_PAIRS: [(&str, &str); 9] = [
    ("not", ""),
    ("never", "always"),
    ("can't", "can"),
    ("won't", "will"),
    ("don't", "do"),
    ("isn't", "is"),
    ("false", "true"),
    ("incorrect", "correct"),
    ("wrong", "right"),
];

const STOP_WORDS: [&str; 14] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Minimum overlap, as a share of the smaller word set.
pub const CONTEXT_OVERLAP_THRESHOLD: f64 = 0.3;

/// Ids of `existing` records that `incoming` appears to contradict, in input
/// order, each at most once.
pub fn probe(incoming: &str, existing: &[MemoryRecord]) -> Vec<String> {
    let incoming_lower = incoming.to_lowercase();
    let negations: Vec<&(&str, &str)> = NEGATION_PAIRS
        .iter()
        .filter(|(neg, _)| incoming_lower.contains(*neg))
        .collect();
    if negations.is_empty() {
        return Vec::new();
    }

    existing
        .iter()
        .filter(|record| {
            let stored_lower = record.content.to_lowercase();
            negations.iter().any(|(_, pos)| stored_lower.contains(*pos))
                && shares_context(incoming, &record.content, CONTEXT_OVERLAP_THRESHOLD)
        })
        .map(|record| record.id.clone())
        .collect()
}

/// Word overlap over whitespace tokens with stop words removed.
pub fn shares_context(a: &str, b: &str, threshold: f64) -> bool {
    let words_a = content_words(a);
    let words_b = content_words(b);
    if words_a.is_empty() || words_b.is_empty() {
        return false;
    }
    let overlap = words_a.intersection(&words_b).count();
    let smaller = words_a.len().min(words_b.len());
    overlap as f64 / smaller as f64 >= threshold
}

fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::memory::RecordKind;
    use chrono::Utc;

    fn stored(id: &str, content: &str) -> MemoryRecord {
        MemoryRecord::new(id, RecordKind::Atom, content, Utc::now())
    }

    #[test]
    fn negated_restatement_is_flagged() {
        let existing = [
            stored("a1", "deploys always run the migration step first"),
            stored("a2", "lunch is at noon"),
        ];
        let hits = probe("deploys never run the migration step first", &existing);
        assert_eq!(hits, vec!["a1"]);
    }

    #[test]
    fn no_negation_no_hits() {
        let existing = [stored("a1", "the cache is warm")];
        assert!(probe("the cache is warm", &existing).is_empty());
    }

    #[test]
    fn unrelated_context_is_ignored() {
        let existing = [stored("a1", "always rotate keys quarterly")];
        assert!(probe("never eat yellow snow", &existing).is_empty());
    }

    #[test]
    fn each_record_reported_once() {
        let existing = [stored("a1", "it is true that the build can always pass")];
        let hits = probe("it is not true the build can't always pass, never", &existing);
        assert_eq!(hits, vec!["a1"]);
    }

    #[test]
    fn stop_words_do_not_count_as_context() {
        assert!(!shares_context("the a an", "the a an", 0.3));
        assert!(shares_context("Redis cluster", "redis is down", 0.3));
    }
}
