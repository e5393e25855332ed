//! # brain-confidence
//!
//! Turns age, access, validation and contradiction signals into a bounded
//! confidence value, persists lifecycle updates with an audit trail, and
//! rescores whole stores in pages.

pub mod engine;
pub mod factors;
pub mod formula;
pub mod probe;
pub mod retroactive;

pub use engine::ConfidenceEngine;
pub use factors::ScoringContext;
pub use formula::ScoreBreakdown;
pub use retroactive::ProgressFn;
