use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::defaults::LIFECYCLE_DEFAULTS;
use super::kind::RecordKind;
use crate::constants::{ARCHIVED_CATEGORY, SECONDS_PER_DAY};

/// A stored unit of knowledge. The store owns it; engines work on copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub kind: RecordKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// `None` when the record has never been read back.
    pub last_accessed: Option<DateTime<Utc>>,
    pub access_count: u64,
    /// Incremented on confirmed correctness.
    pub validation_count: u64,
    /// Incremented on confirmed falsification.
    pub contradiction_count: u64,
    /// Pre-computed embedding; absent for records not yet embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub importance: f64,
    /// Provenance annotation (e.g. `archived:merged_into:<id>`).
    #[serde(default)]
    pub source: Option<String>,
    pub confidence: Confidence,
}

impl MemoryRecord {
    /// A fresh record with lifecycle defaults, created at `created_at`.
    pub fn new(
        id: impl Into<String>,
        kind: RecordKind,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            content: content.into(),
            created_at,
            last_accessed: None,
            access_count: LIFECYCLE_DEFAULTS.access_count,
            validation_count: LIFECYCLE_DEFAULTS.validation_count,
            contradiction_count: LIFECYCLE_DEFAULTS.contradiction_count,
            embedding: None,
            categories: Vec::new(),
            importance: LIFECYCLE_DEFAULTS.importance,
            source: None,
            confidence: Confidence::new(LIFECYCLE_DEFAULTS.confidence),
        }
    }

    /// Whole days since creation at `now`. Negative ages (clock skew) read as 0.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        whole_days_between(self.created_at, now)
    }

    /// Whole days since last access, or `None` if never accessed.
    pub fn days_since_access(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_accessed.map(|t| whole_days_between(t, now))
    }

    /// Whether the record carries the `archived` category.
    pub fn is_archived(&self) -> bool {
        self.categories.iter().any(|c| c == ARCHIVED_CATEGORY)
    }
}

fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    ((to - from).num_seconds() / SECONDS_PER_DAY).max(0)
}

/// Identity equality: two records are equal if kind and id match.
impl PartialEq for MemoryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id
    }
}
