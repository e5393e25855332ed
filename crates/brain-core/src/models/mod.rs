pub mod action;
pub mod audit;
pub mod contradiction;
pub mod report;
pub mod stats;

pub use action::{
    idempotency_key, ActionCounts, ActionType, Evidence, PlannedAction, Rationale, RuleId,
};
pub use audit::{AuditEntry, ConfidenceChangeReason, ConsolidationLogEntry};
pub use contradiction::{ContradictionFinding, ContradictionSignals};
pub use report::{
    ConsolidationReport, DetectedCounts, PlannedCounts, ReportScope, RetroactiveScoringSummary,
    RunMode,
};
pub use stats::{ConfidenceStats, KindStats};
