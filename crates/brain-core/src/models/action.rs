use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::contradiction::ContradictionSignals;
use crate::constants::IDEMPOTENCY_KEY_LEN;

/// The four structural edits the planner can propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Merge,
    Promote,
    Archive,
    FlagContradiction,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        Self::Merge,
        Self::Promote,
        Self::Archive,
        Self::FlagContradiction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Promote => "promote",
            Self::Archive => "archive",
            Self::FlagContradiction => "flag_contradiction",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the planner rule that produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "R2-near-duplicate-merge")]
    NearDuplicateMerge,
    #[serde(rename = "R3-promote-high-value-procedural")]
    PromoteHighValueProcedural,
    #[serde(rename = "R4-archive-low-utility")]
    ArchiveLowUtility,
    #[serde(rename = "R5-flag-contradiction")]
    FlagContradiction,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NearDuplicateMerge => "R2-near-duplicate-merge",
            Self::PromoteHighValueProcedural => "R3-promote-high-value-procedural",
            Self::ArchiveLowUtility => "R4-archive-low-utility",
            Self::FlagContradiction => "R5-flag-contradiction",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured evidence attached to every planned action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub cluster_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contradiction_signals: Option<ContradictionSignals>,
}

impl Evidence {
    pub fn for_cluster(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            similarity: None,
            contradiction_signals: None,
        }
    }
}

/// Machine-readable explanation of why an action was planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rationale {
    pub rule_id: RuleId,
    /// Human-readable conditions, naming the literal thresholds that fired.
    pub reasons: Vec<String>,
    pub evidence: Evidence,
}

/// A proposed mutation. Immutable once planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub target_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_importance: Option<f64>,
    pub rationale: Rationale,
}

/// Per-type action counts. Types with no actions are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionCounts(BTreeMap<ActionType, usize>);

impl ActionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, action_type: ActionType) {
        *self.0.entry(action_type).or_insert(0) += 1;
    }

    pub fn get(&self, action_type: ActionType) -> usize {
        self.0.get(&action_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionType, usize)> + '_ {
        self.0.iter().map(|(t, n)| (*t, *n))
    }
}

impl<'a> FromIterator<&'a PlannedAction> for ActionCounts {
    fn from_iter<I: IntoIterator<Item = &'a PlannedAction>>(iter: I) -> Self {
        let mut counts = Self::new();
        for action in iter {
            counts.increment(action.action_type);
        }
        counts
    }
}

/// Stable idempotency key over a set of record ids: the ids are sorted,
/// joined with `|`, SHA-256 hashed, and truncated. Flags already in existing
/// databases carry keys in this format, so it must not change.
pub fn idempotency_key(ids: &[String]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let mut hasher = Sha256::new();
    hasher.update(sorted.join("|").as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(IDEMPOTENCY_KEY_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_ignores_order() {
        let a = idempotency_key(&["stm_b".to_string(), "stm_a".to_string()]);
        let b = idempotency_key(&["stm_a".to_string(), "stm_b".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a.len(), IDEMPOTENCY_KEY_LEN);
    }

    #[test]
    fn idempotency_key_matches_stored_flags() {
        // sha256("stm_a|stm_b"), first 16 hex chars.
        let key = idempotency_key(&["stm_b".to_string(), "stm_a".to_string()]);
        assert_eq!(key, "af8083a993138b9e");
    }

    #[test]
    fn idempotency_key_differs_per_pair() {
        let a = idempotency_key(&["x".to_string(), "y".to_string()]);
        let b = idempotency_key(&["x".to_string(), "z".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn action_type_serializes_snake_case() {
        let json = serde_json::to_string(&ActionType::FlagContradiction).unwrap();
        assert_eq!(json, "\"flag_contradiction\"");
    }

    #[test]
    fn counts_accumulate() {
        let mut counts = ActionCounts::new();
        counts.increment(ActionType::Merge);
        counts.increment(ActionType::Merge);
        counts.increment(ActionType::Archive);
        assert_eq!(counts.get(ActionType::Merge), 2);
        assert_eq!(counts.get(ActionType::Promote), 0);
        assert_eq!(counts.total(), 3);
    }
}
