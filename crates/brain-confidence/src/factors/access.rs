use brain_core::config::ConfidenceConfig;
use brain_core::memory::MemoryRecord;

use super::ScoringContext;

/// Recency-weighted access boost.
///
/// Zero unless the record was accessed within `access_window_days`; otherwise
/// `min(max_access_boost, access_count * access_boost * (1 - days / window))`.
pub fn calculate(record: &MemoryRecord, ctx: &ScoringContext, config: &ConfidenceConfig) -> f64 {
    let days = match record.days_since_access(ctx.now) {
        Some(days) => days,
        None => return 0.0,
    };
    if config.access_window_days <= 0 || days > config.access_window_days {
        return 0.0;
    }
    let recency = 1.0 - days as f64 / config.access_window_days as f64;
    (record.access_count as f64 * config.access_boost * recency).min(config.max_access_boost)
}
