use brain_core::config::ConfidenceConfig;
use brain_core::memory::MemoryRecord;

/// `validation_count * validation_bonus`. Unbounded; the final clamp caps it.
pub fn calculate(record: &MemoryRecord, config: &ConfidenceConfig) -> f64 {
    record.validation_count as f64 * config.validation_bonus
}
