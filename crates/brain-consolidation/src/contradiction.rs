//! Pairwise contradiction heuristic over one cluster.
//!
//! Text is normalized (lower-cased, everything outside `[a-z0-9\s]` replaced
//! by a space, whitespace collapsed). A pair conflicts when exactly one side
//! carries a negation marker, or when the numeric token sets differ. Marker
//! matching is plain substring search on the normalized text, so `notes`
//! carries `not` and `can't` (normalized to `can t`) carries nothing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use brain_core::memory::MemoryRecord;
use brain_core::models::{ContradictionFinding, ContradictionSignals};

use crate::algorithms::similarity::similarity_of;

/// Negation markers, in reporting order.
pub const NEGATION_MARKERS: [&str; 9] = [
    "not", "never", "cannot", "can't", "wont", "won't", "avoid", "do not", "must not",
];

static NUMBER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").ok());

/// Lower-case, replace non `[a-z0-9\s]` characters by spaces, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markers and numeric tokens of one normalized text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextProfile {
    pub markers: Vec<String>,
    pub numbers: BTreeSet<String>,
}

impl TextProfile {
    pub fn of(text: &str) -> Self {
        let norm = normalize(text);
        let markers = NEGATION_MARKERS
            .iter()
            .filter(|m| norm.contains(**m))
            .map(|m| m.to_string())
            .collect();
        let numbers = match NUMBER_RE.as_ref() {
            Some(re) => re.find_iter(&norm).map(|m| m.as_str().to_string()).collect(),
            None => BTreeSet::new(),
        };
        Self { markers, numbers }
    }
}

/// Compare two profiles.
pub fn compare(a: &TextProfile, b: &TextProfile) -> ContradictionSignals {
    ContradictionSignals {
        negation_asymmetry: a.markers.is_empty() != b.markers.is_empty(),
        numeric_mismatch: a.numbers != b.numbers,
        markers_a: a.markers.clone(),
        markers_b: b.markers.clone(),
        numbers_a: a.numbers.iter().cloned().collect(),
        numbers_b: b.numbers.iter().cloned().collect(),
    }
}

/// Signals for two raw texts.
pub fn signals(a: &str, b: &str) -> ContradictionSignals {
    compare(&TextProfile::of(a), &TextProfile::of(b))
}

/// One finding per pair `(i, j)`, `i < j`, with similarity `>= similarity_threshold`
/// and at least one conflicting signal.
pub fn detect(cluster: &[&MemoryRecord], similarity_threshold: f64) -> Vec<ContradictionFinding> {
    let profiles: Vec<TextProfile> = cluster.iter().map(|r| TextProfile::of(&r.content)).collect();
    let mut findings = Vec::new();

    for i in 0..cluster.len() {
        for j in (i + 1)..cluster.len() {
            let (a, b) = (cluster[i], cluster[j]);
            let similarity = similarity_of(a.embedding.as_deref(), b.embedding.as_deref());
            if similarity < similarity_threshold {
                continue;
            }
            let signals = compare(&profiles[i], &profiles[j]);
            if signals.conflicting() {
                tracing::debug!(a = %a.id, b = %b.id, similarity, "contradiction candidate");
                findings.push(ContradictionFinding {
                    a: a.id.clone(),
                    b: b.id.clone(),
                    similarity,
                    signals,
                });
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_space() {
        assert_eq!(normalize("  Don't   STOP!\tnow. "), "don t stop now");
        assert_eq!(normalize("v2.5-beta"), "v2 5 beta");
    }

    #[test]
    fn markers_keep_fixed_order() {
        let p = TextProfile::of("Avoid this; do not, never.");
        assert_eq!(p.markers, vec!["not", "never", "avoid", "do not"]);
    }

    #[test]
    fn asymmetry_is_presence_xor() {
        let s = signals("never deploy on friday", "do not deploy on friday");
        assert!(!s.negation_asymmetry);
        let s = signals("deploy on friday", "do not deploy on friday");
        assert!(s.negation_asymmetry);
    }

    #[test]
    fn identical_texts_do_not_conflict() {
        assert!(!signals("keep 3 replicas", "Keep 3 replicas.").conflicting());
    }
}
