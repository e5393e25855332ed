use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::{ActionType, RuleId};
use crate::errors::BrainError;
use crate::memory::RecordKind;

/// Why a confidence value changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceChangeReason {
    Access,
    ValidationSuccess,
    ValidationFailure,
    RetroactiveScoring,
}

impl ConfidenceChangeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::ValidationSuccess => "validation_success",
            Self::ValidationFailure => "validation_failure",
            Self::RetroactiveScoring => "retroactive_scoring",
        }
    }
}

impl fmt::Display for ConfidenceChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceChangeReason {
    type Err = BrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "validation_success" => Ok(Self::ValidationSuccess),
            "validation_failure" => Ok(Self::ValidationFailure),
            "retroactive_scoring" => Ok(Self::RetroactiveScoring),
            other => Err(BrainError::ConfigError(format!(
                "unknown confidence change reason: {other}"
            ))),
        }
    }
}

/// Append-only record of one confidence change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub record_id: String,
    pub kind: RecordKind,
    pub old_confidence: f64,
    pub new_confidence: f64,
    pub reason: ConfidenceChangeReason,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        record_id: impl Into<String>,
        kind: RecordKind,
        old_confidence: f64,
        new_confidence: f64,
        reason: ConfidenceChangeReason,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            kind,
            old_confidence,
            new_confidence,
            reason,
            timestamp,
        }
    }
}

/// One applied consolidation action, as persisted in the consolidation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationLogEntry {
    pub run_id: String,
    pub action_type: ActionType,
    pub rule_id: RuleId,
    pub target_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
