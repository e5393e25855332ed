use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::memory::RecordKind;

/// Confidence distribution for one record kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindStats {
    pub total: usize,
    pub average_confidence: f64,
    /// `confidence >= 0.8`.
    pub high_confidence: usize,
    /// `0.5 <= confidence < 0.8`.
    pub medium_confidence: usize,
    /// `confidence < 0.5`.
    pub low_confidence: usize,
}

impl KindStats {
    /// Stats reported for a kind whose table or column does not exist.
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// Confidence distribution across all record kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidenceStats(BTreeMap<RecordKind, KindStats>);

impl ConfidenceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: RecordKind, stats: KindStats) {
        self.0.insert(kind, stats);
    }

    /// Stats for `kind`; zeroed if the kind was never reported.
    pub fn get(&self, kind: RecordKind) -> KindStats {
        self.0.get(&kind).cloned().unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.0.values().map(|s| s.total).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordKind, &KindStats)> + '_ {
        self.0.iter().map(|(k, s)| (*k, s))
    }
}
