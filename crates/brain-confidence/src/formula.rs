use brain_core::config::ConfidenceConfig;
use brain_core::memory::{Confidence, MemoryRecord};

use crate::factors::{self, ScoringContext};

/// Additive-then-multiplicative confidence formula.
///
/// ```text
/// raw = (1.0 + access + validation - contradiction) × age
/// ```
///
/// Result is clamped to [0.1, 1.0]. A non-finite intermediate yields the
/// neutral value 0.5.
pub fn compute(record: &MemoryRecord, ctx: &ScoringContext, config: &ConfidenceConfig) -> f64 {
    compute_breakdown(record, ctx, config).final_confidence
}

/// Each factor of one score, for debugging and observability.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub age: f64,
    pub access: f64,
    pub validation: f64,
    pub contradiction: f64,
    /// Unclamped product.
    pub raw: f64,
    pub final_confidence: f64,
}

pub fn compute_breakdown(
    record: &MemoryRecord,
    ctx: &ScoringContext,
    config: &ConfidenceConfig,
) -> ScoreBreakdown {
    let age = factors::age::calculate(record, ctx, config);
    let access = factors::access::calculate(record, ctx, config);
    let validation = factors::validation::calculate(record, config);
    let contradiction = factors::contradiction::calculate(record, config);

    let raw = (1.0 + access + validation - contradiction) * age;

    let final_confidence = if raw.is_finite() {
        raw.clamp(Confidence::MIN, Confidence::MAX)
    } else {
        tracing::warn!(
            record_id = %record.id,
            kind = %record.kind,
            raw,
            "non-finite confidence, using neutral value"
        );
        Confidence::NEUTRAL
    };

    ScoreBreakdown {
        age,
        access,
        validation,
        contradiction,
        raw,
        final_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::memory::RecordKind;
    use chrono::{Duration, Utc};

    fn fresh() -> (MemoryRecord, ScoringContext) {
        let now = Utc::now();
        (
            MemoryRecord::new("r", RecordKind::ShortTerm, "x", now),
            ScoringContext::at(now),
        )
    }

    #[test]
    fn fresh_unaccessed_record_scores_one() {
        let (record, ctx) = fresh();
        let b = compute_breakdown(&record, &ctx, &ConfidenceConfig::default());
        assert_eq!(b.age, 1.0);
        assert_eq!(b.access, 0.0);
        assert_eq!(b.final_confidence, 1.0);
    }

    #[test]
    fn contradictions_pull_below_neutral() {
        let (mut record, ctx) = fresh();
        record.contradiction_count = 2;
        let score = compute(&record, &ctx, &ConfidenceConfig::default());
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn overflowing_config_falls_back_to_neutral() {
        let (mut record, ctx) = fresh();
        record.validation_count = 1;
        record.contradiction_count = 1;
        let config = ConfidenceConfig {
            validation_bonus: f64::INFINITY,
            contradiction_penalty: f64::INFINITY,
            ..ConfidenceConfig::default()
        };
        assert_eq!(compute(&record, &ctx, &config), Confidence::NEUTRAL);
    }

    #[test]
    fn old_records_hit_the_age_floor() {
        let (mut record, ctx) = fresh();
        record.created_at = ctx.now - Duration::days(400);
        let b = compute_breakdown(&record, &ctx, &ConfidenceConfig::default());
        assert_eq!(b.age, 0.1);
        assert_eq!(b.final_confidence, 0.1);
    }
}
