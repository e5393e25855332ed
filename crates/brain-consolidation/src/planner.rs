//! Rule-driven action planning.
//!
//! Rules, evaluated per cluster in this order:
//! - R2 near-duplicate merge: clusters of two or more records.
//! - R3 promote: frequently accessed, important procedural records.
//! - R4 archive: old, never accessed, unimportant records.
//! - R5 flag contradiction: highly similar pairs with a conflicting signal.
//!
//! Planning is pure: no store access, and identical inputs with the same
//! `now` always yield the same plan.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use brain_core::config::ConsolidationConfig;
use brain_core::memory::MemoryRecord;
use brain_core::models::{ActionCounts, ActionType, Evidence, PlannedAction, Rationale, RuleId};

use crate::algorithms::similarity::round4;
use crate::clustering::{cluster, min_pairwise_similarity};
use crate::contradiction;

/// Output of one planning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationPlan {
    pub actions: Vec<PlannedAction>,
    pub counts: ActionCounts,
    pub contradiction_pairs: usize,
    pub clusters: usize,
}

impl ConsolidationPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Plan actions over `records`. `now` fixes the age used by the archive rule.
pub fn plan(
    records: &[MemoryRecord],
    config: &ConsolidationConfig,
    now: DateTime<Utc>,
) -> ConsolidationPlan {
    let groups = cluster(records, config.similarity_threshold);
    info!(
        records = records.len(),
        clusters = groups.len(),
        threshold = config.similarity_threshold,
        "clustering complete"
    );

    let per_cluster: Vec<(Vec<PlannedAction>, usize)> = groups
        .par_iter()
        .enumerate()
        .map(|(idx, members)| plan_cluster(records, members, idx, config, now))
        .collect();

    let mut actions = Vec::new();
    let mut contradiction_pairs = 0;
    for (cluster_actions, pairs) in per_cluster {
        actions.extend(cluster_actions);
        contradiction_pairs += pairs;
    }
    let counts: ActionCounts = actions.iter().collect();

    ConsolidationPlan {
        actions,
        counts,
        contradiction_pairs,
        clusters: groups.len(),
    }
}

fn cluster_id(idx: usize) -> String {
    format!("cluster_{idx:04}")
}

fn plan_cluster(
    records: &[MemoryRecord],
    members: &[usize],
    idx: usize,
    config: &ConsolidationConfig,
    now: DateTime<Utc>,
) -> (Vec<PlannedAction>, usize) {
    let cluster_id = cluster_id(idx);
    let mut actions = Vec::new();

    if members.len() >= 2 {
        actions.push(merge_action(records, members, &cluster_id, config));
    }

    for &i in members {
        let record = &records[i];
        if is_promotable(record, config) {
            actions.push(promote_action(record, &cluster_id, config));
        }
        if is_archivable(record, config, now) {
            actions.push(archive_action(record, &cluster_id, config));
        }
    }

    let cluster: Vec<&MemoryRecord> = members.iter().map(|&i| &records[i]).collect();
    let findings = contradiction::detect(&cluster, config.contradiction_threshold);
    let pairs = findings.len();
    for finding in findings {
        actions.push(PlannedAction {
            action_type: ActionType::FlagContradiction,
            target_ids: vec![finding.a, finding.b],
            canonical_id: None,
            new_importance: None,
            rationale: Rationale {
                rule_id: RuleId::FlagContradiction,
                reasons: vec!["high semantic similarity with conflict signals".to_string()],
                evidence: Evidence {
                    cluster_id: cluster_id.clone(),
                    similarity: Some(round4(finding.similarity)),
                    contradiction_signals: Some(finding.signals),
                },
            },
        });
    }

    if !actions.is_empty() {
        debug!(cluster = %cluster_id, size = members.len(), actions = actions.len(), "cluster planned");
    }
    (actions, pairs)
}

/// Canonical member: latest creation time, ties broken by the greater id.
fn canonical_of<'a>(records: &'a [MemoryRecord], members: &[usize]) -> Option<&'a MemoryRecord> {
    members
        .iter()
        .map(|&i| &records[i])
        .max_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)))
}

fn merge_action(
    records: &[MemoryRecord],
    members: &[usize],
    cluster_id: &str,
    config: &ConsolidationConfig,
) -> PlannedAction {
    let canonical = canonical_of(records, members).map(|r| r.id.clone());
    let mut evidence = Evidence::for_cluster(cluster_id);
    evidence.similarity = Some(round4(min_pairwise_similarity(records, members)));

    PlannedAction {
        action_type: ActionType::Merge,
        target_ids: members.iter().map(|&i| records[i].id.clone()).collect(),
        canonical_id: canonical,
        new_importance: None,
        rationale: Rationale {
            rule_id: RuleId::NearDuplicateMerge,
            reasons: vec![
                "cluster_size >= 2".to_string(),
                format!("similarity >= {:?}", config.similarity_threshold),
            ],
            evidence,
        },
    }
}

fn is_procedural(record: &MemoryRecord, config: &ConsolidationConfig) -> bool {
    record.categories.iter().any(|c| {
        config
            .procedural_categories
            .iter()
            .any(|p| p.eq_ignore_ascii_case(c))
    })
}

fn is_promotable(record: &MemoryRecord, config: &ConsolidationConfig) -> bool {
    record.access_count >= config.promote_min_access
        && record.importance >= config.promote_min_importance
        && is_procedural(record, config)
}

fn is_archivable(record: &MemoryRecord, config: &ConsolidationConfig, now: DateTime<Utc>) -> bool {
    record.age_days(now) >= config.archive_min_age_days
        && record.access_count == 0
        && record.importance <= config.archive_max_importance
}

fn promote_action(record: &MemoryRecord, cluster_id: &str, config: &ConsolidationConfig) -> PlannedAction {
    PlannedAction {
        action_type: ActionType::Promote,
        target_ids: vec![record.id.clone()],
        canonical_id: None,
        new_importance: Some((record.importance + config.promote_step).min(config.max_importance)),
        rationale: Rationale {
            rule_id: RuleId::PromoteHighValueProcedural,
            reasons: vec![
                format!("access_count >= {}", config.promote_min_access),
                format!("importance >= {:?}", config.promote_min_importance),
                "procedural category".to_string(),
            ],
            evidence: Evidence::for_cluster(cluster_id),
        },
    }
}

fn archive_action(record: &MemoryRecord, cluster_id: &str, config: &ConsolidationConfig) -> PlannedAction {
    PlannedAction {
        action_type: ActionType::Archive,
        target_ids: vec![record.id.clone()],
        canonical_id: None,
        new_importance: None,
        rationale: Rationale {
            rule_id: RuleId::ArchiveLowUtility,
            reasons: vec![
                format!("age >= {}d", config.archive_min_age_days),
                "access_count == 0".to_string(),
                format!("importance <= {:?}", config.archive_max_importance),
            ],
            evidence: Evidence::for_cluster(cluster_id),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::memory::RecordKind;
    use chrono::Duration;

    fn rec(id: &str, embedding: Vec<f32>, now: DateTime<Utc>) -> MemoryRecord {
        let mut r = MemoryRecord::new(id, RecordKind::ShortTerm, format!("note {id}"), now);
        r.embedding = Some(embedding);
        r
    }

    #[test]
    fn canonical_prefers_newest_then_greatest_id() {
        let now = Utc::now();
        let mut a = rec("stm_a", vec![1.0, 0.0], now);
        let b = rec("stm_b", vec![1.0, 0.0], now);
        let mut c = rec("stm_c", vec![1.0, 0.0], now);
        a.created_at = now - Duration::days(1);
        c.created_at = now - Duration::days(1);
        let records = [a, b, c];
        assert_eq!(canonical_of(&records, &[0, 1, 2]).map(|r| r.id.as_str()), Some("stm_b"));
        assert_eq!(canonical_of(&records, &[0, 2]).map(|r| r.id.as_str()), Some("stm_c"));
    }

    #[test]
    fn cluster_ids_are_zero_padded() {
        assert_eq!(cluster_id(7), "cluster_0007");
    }

    #[test]
    fn reasons_name_thresholds() {
        let now = Utc::now();
        let records = [rec("x", vec![1.0], now), rec("y", vec![1.0], now)];
        let p = plan(&records, &ConsolidationConfig::default(), now);
        assert_eq!(p.actions[0].rationale.reasons, vec!["cluster_size >= 2", "similarity >= 0.95"]);
    }

    #[test]
    fn promote_caps_importance() {
        let now = Utc::now();
        let mut r = rec("p", vec![1.0], now);
        r.access_count = 9;
        r.importance = 2.8;
        r.categories = vec!["Trading".to_string()];
        let p = plan(&[r], &ConsolidationConfig::default(), now);
        assert_eq!(p.actions.len(), 1);
        assert_eq!(p.actions[0].new_importance, Some(3.0));
    }

    #[test]
    fn promote_and_archive_are_exclusive() {
        let config = ConsolidationConfig::default();
        let now = Utc::now();
        let mut r = rec("r", vec![1.0], now - Duration::days(90));
        r.access_count = 0;
        r.importance = 2.0;
        r.categories = vec!["sop".to_string()];
        assert!(!is_promotable(&r, &config));
        assert!(!is_archivable(&r, &config, now));
    }
}
