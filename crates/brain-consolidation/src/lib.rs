//! # brain-consolidation
//!
//! Groups near-duplicate records, detects contradictions inside each group,
//! plans merge/promote/archive/flag actions with machine-readable rationale,
//! and applies a plan in one write transaction.

pub mod algorithms;
pub mod clustering;
pub mod contradiction;
pub mod engine;
pub mod executor;
pub mod planner;

pub use engine::ConsolidationEngine;
pub use planner::ConsolidationPlan;
