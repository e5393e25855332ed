use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::action::{ActionCounts, ActionType, PlannedAction};
use crate::memory::RecordKind;

/// Whether a consolidation run only inspects or also applies its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    DryRun,
    Execute,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportScope {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCounts {
    pub clusters: usize,
    pub contradiction_pairs: usize,
}

/// Planned counts with every action type present, plus the `noop` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCounts {
    pub merge: usize,
    pub promote: usize,
    pub archive: usize,
    pub flag_contradiction: usize,
    pub noop: usize,
}

impl PlannedCounts {
    pub fn get(&self, action_type: ActionType) -> usize {
        match action_type {
            ActionType::Merge => self.merge,
            ActionType::Promote => self.promote,
            ActionType::Archive => self.archive,
            ActionType::FlagContradiction => self.flag_contradiction,
        }
    }
}

impl From<&ActionCounts> for PlannedCounts {
    fn from(counts: &ActionCounts) -> Self {
        Self {
            merge: counts.get(ActionType::Merge),
            promote: counts.get(ActionType::Promote),
            archive: counts.get(ActionType::Archive),
            flag_contradiction: counts.get(ActionType::FlagContradiction),
            noop: 0,
        }
    }
}

/// The structured artifact of one consolidation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub run_id: String,
    pub mode: RunMode,
    pub config_hash: String,
    pub scope: ReportScope,
    pub detected: DetectedCounts,
    pub planned: PlannedCounts,
    pub actions: Vec<PlannedAction>,
    /// Applied counts; empty in dry-run mode.
    pub executed: ActionCounts,
}

/// Outcome of a retroactive scoring sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetroactiveScoringSummary {
    /// Records scored per kind.
    pub processed: BTreeMap<RecordKind, usize>,
    /// Records whose stored confidence moved by more than the change threshold.
    pub confidence_changes: usize,
    /// Rows or pages that were skipped after an error.
    pub errors: usize,
}

impl RetroactiveScoringSummary {
    pub fn processed(&self, kind: RecordKind) -> usize {
        self.processed.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_processed(&self) -> usize {
        self.processed.values().sum()
    }
}
