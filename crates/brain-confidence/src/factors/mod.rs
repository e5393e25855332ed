//! The four scoring factors. Each is a pure function of one record.

pub mod access;
pub mod age;
pub mod contradiction;
pub mod validation;

use chrono::{DateTime, Utc};

/// Inputs shared by every factor for one scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext {
    pub now: DateTime<Utc>,
}

impl ScoringContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self { now: Utc::now() }
    }
}
