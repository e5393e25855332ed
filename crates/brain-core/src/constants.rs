/// Category tag marking a soft-deleted record.
pub const ARCHIVED_CATEGORY: &str = "archived";

/// Category used for a merged canonical record that had no categories of its own.
pub const CONSOLIDATED_CATEGORY: &str = "consolidated";

/// Categories attached to every contradiction-flag record.
pub const CONTRADICTION_FLAG_CATEGORIES: [&str; 2] = ["contradictions", "consolidation"];

/// Importance assigned to contradiction-flag records.
pub const CONTRADICTION_FLAG_IMPORTANCE: f64 = 2.0;

/// Source prefix for contradiction flags; the idempotency key follows it.
pub const CONTRADICTION_SOURCE_PREFIX: &str = "consolidation:contradiction:";

/// Source annotation for records archived by the low-utility rule.
pub const LOW_UTILITY_SOURCE: &str = "archived:low_utility";

/// Source prefix for records archived by a merge; the canonical id follows it.
pub const MERGED_INTO_SOURCE_PREFIX: &str = "archived:merged_into:";

/// Lowest importance a merged canonical record can end up with.
pub const MERGE_IMPORTANCE_FLOOR: f64 = 1.0;

/// Source prefix for canonical records rewritten by a merge.
pub const MERGE_PROVENANCE_PREFIX: &str = "consolidation:";

/// Length (hex chars) of the contradiction idempotency key.
pub const IDEMPOTENCY_KEY_LEN: usize = 16;

/// Seconds in a day.
pub const SECONDS_PER_DAY: i64 = 86_400;
