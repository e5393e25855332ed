use brain_core::config::ConfidenceConfig;
use brain_core::memory::MemoryRecord;

/// `contradiction_count * contradiction_penalty`, subtracted from the base.
pub fn calculate(record: &MemoryRecord, config: &ConfidenceConfig) -> f64 {
    record.contradiction_count as f64 * config.contradiction_penalty
}
