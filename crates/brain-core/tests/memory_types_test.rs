use chrono::{Duration, Utc};

use brain_core::memory::*;

#[test]
fn confidence_clamps_to_bounds() {
    assert_eq!(Confidence::new(5.0).value(), 1.0);
    assert_eq!(Confidence::new(-1.0).value(), 0.1);
    assert_eq!(Confidence::new(0.42).value(), 0.42);
}

#[test]
fn confidence_nan_is_neutral() {
    assert_eq!(Confidence::new(f64::NAN).value(), Confidence::NEUTRAL);
}

#[test]
fn bands_split_at_half_and_point_eight() {
    assert_eq!(ConfidenceBand::of(0.8), ConfidenceBand::High);
    assert_eq!(ConfidenceBand::of(0.79), ConfidenceBand::Medium);
    assert_eq!(ConfidenceBand::of(0.5), ConfidenceBand::Medium);
    assert_eq!(ConfidenceBand::of(0.49), ConfidenceBand::Low);
}

#[test]
fn new_record_uses_lifecycle_defaults() {
    let record = MemoryRecord::new("stm_1", RecordKind::ShortTerm, "hello", Utc::now());
    assert_eq!(record.access_count, LIFECYCLE_DEFAULTS.access_count);
    assert_eq!(record.validation_count, 0);
    assert_eq!(record.contradiction_count, 0);
    assert_eq!(record.confidence.value(), 0.5);
    assert_eq!(record.importance, 1.0);
    assert!(record.last_accessed.is_none());
}

#[test]
fn age_days_truncates_and_ignores_skew() {
    let now = Utc::now();
    let mut record = MemoryRecord::new("a", RecordKind::Atom, "x", now - Duration::hours(47));
    assert_eq!(record.age_days(now), 1);
    record.created_at = now + Duration::days(3);
    assert_eq!(record.age_days(now), 0);
}

#[test]
fn archived_category_detected() {
    let mut record = MemoryRecord::new("a", RecordKind::ShortTerm, "x", Utc::now());
    assert!(!record.is_archived());
    record.categories.push("archived".to_string());
    assert!(record.is_archived());
}

#[test]
fn kind_round_trips_through_str() {
    for kind in RecordKind::ALL {
        assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
    }
    assert!("episodic".parse::<RecordKind>().is_err());
}

#[test]
fn kind_serializes_as_short_name() {
    assert_eq!(
        serde_json::to_string(&RecordKind::Embedded).unwrap(),
        "\"embedding\""
    );
}
