use brain_core::config::ConfidenceConfig;
use brain_core::memory::MemoryRecord;

use super::ScoringContext;

/// Linear age decay: `max(min_age_factor, 1 - age_days * age_decay_per_day)`.
///
/// Range: `min_age_factor` – 1.0. Future creation times count as age 0.
pub fn calculate(record: &MemoryRecord, ctx: &ScoringContext, config: &ConfidenceConfig) -> f64 {
    let age_days = record.age_days(ctx.now) as f64;
    (1.0 - age_days * config.age_decay_per_day).max(config.min_age_factor)
}
