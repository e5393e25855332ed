use serde::{Deserialize, Serialize};

use super::defaults;

/// Confidence scorer configuration. Defaults reproduce the reference formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Age factor lost per whole day since creation.
    pub age_decay_per_day: f64,
    /// Floor of the age factor.
    pub min_age_factor: f64,
    /// Boost per access inside the access window.
    pub access_boost: f64,
    /// Cap on the total access boost.
    pub max_access_boost: f64,
    /// Days after the last access during which the boost applies.
    pub access_window_days: i64,
    /// Bonus per confirmed validation.
    pub validation_bonus: f64,
    /// Penalty per confirmed contradiction.
    pub contradiction_penalty: f64,
    /// Minimum absolute delta before a retroactive rescore is persisted.
    pub change_threshold: f64,
    /// Page size for the retroactive sweep.
    pub batch_size: usize,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            age_decay_per_day: defaults::DEFAULT_AGE_DECAY_PER_DAY,
            min_age_factor: defaults::DEFAULT_MIN_AGE_FACTOR,
            access_boost: defaults::DEFAULT_ACCESS_BOOST,
            max_access_boost: defaults::DEFAULT_MAX_ACCESS_BOOST,
            access_window_days: defaults::DEFAULT_ACCESS_WINDOW_DAYS,
            validation_bonus: defaults::DEFAULT_VALIDATION_BONUS,
            contradiction_penalty: defaults::DEFAULT_CONTRADICTION_PENALTY,
            change_threshold: defaults::DEFAULT_CHANGE_THRESHOLD,
            batch_size: defaults::DEFAULT_SCORING_BATCH_SIZE,
        }
    }
}
