use serde::{Deserialize, Serialize};

use super::defaults;

/// Consolidation planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Cosine similarity required against every cluster member.
    pub similarity_threshold: f64,
    /// Stricter similarity required before contradiction signals are checked.
    pub contradiction_threshold: f64,
    /// Promotion: minimum access count.
    pub promote_min_access: u64,
    /// Promotion: minimum importance.
    pub promote_min_importance: f64,
    /// Promotion: importance increment.
    pub promote_step: f64,
    /// Promotion: importance ceiling.
    pub max_importance: f64,
    /// Archival: minimum age in whole days.
    pub archive_min_age_days: i64,
    /// Archival: maximum importance.
    pub archive_max_importance: f64,
    /// Categories that mark a record as procedural knowledge (case-insensitive).
    pub procedural_categories: Vec<String>,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            contradiction_threshold: defaults::DEFAULT_CONTRADICTION_THRESHOLD,
            promote_min_access: defaults::DEFAULT_PROMOTE_MIN_ACCESS,
            promote_min_importance: defaults::DEFAULT_PROMOTE_MIN_IMPORTANCE,
            promote_step: defaults::DEFAULT_PROMOTE_STEP,
            max_importance: defaults::DEFAULT_MAX_IMPORTANCE,
            archive_min_age_days: defaults::DEFAULT_ARCHIVE_MIN_AGE_DAYS,
            archive_max_importance: defaults::DEFAULT_ARCHIVE_MAX_IMPORTANCE,
            procedural_categories: defaults::DEFAULT_PROCEDURAL_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl ConsolidationConfig {
    /// Same config with a different clustering threshold.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}
