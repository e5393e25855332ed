//! Applies a plan inside one write transaction.
//!
//! Any error rolls back the whole batch. Missing targets are skipped and not
//! counted; an already-flagged contradiction pair is a successful no-op.
//! Records are never deleted: merge sources and low-utility records are
//! soft-archived via the `archived` category.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use brain_core::constants::{
    ARCHIVED_CATEGORY, CONSOLIDATED_CATEGORY, CONTRADICTION_FLAG_CATEGORIES,
    CONTRADICTION_FLAG_IMPORTANCE, CONTRADICTION_SOURCE_PREFIX, LOW_UTILITY_SOURCE,
    MERGED_INTO_SOURCE_PREFIX, MERGE_IMPORTANCE_FLOOR, MERGE_PROVENANCE_PREFIX,
};
use brain_core::errors::{BrainError, BrainResult, ConsolidationError};
use brain_core::memory::{MemoryRecord, RecordKind};
use brain_core::models::{
    idempotency_key, ActionCounts, ActionType, ConsolidationLogEntry, Evidence, PlannedAction,
};
use brain_core::traits::{IRecordStore, IRecordWriter, RecordPatch};

#[derive(Serialize)]
struct MergeProvenance<'a> {
    merged_from: &'a [String],
    run_id: &'a str,
    at: String,
}

#[derive(Serialize)]
struct FlagContent<'a> {
    #[serde(rename = "type")]
    flag_type: &'static str,
    ids: Vec<&'a str>,
    evidence: &'a Evidence,
    run_id: &'a str,
}

/// Apply `actions` to records of `kind`. Returns applied counts per type.
pub fn execute<S: IRecordStore>(
    store: &S,
    kind: RecordKind,
    actions: &[PlannedAction],
    run_id: &str,
    now: DateTime<Utc>,
) -> BrainResult<ActionCounts> {
    let _span = brain_observability::execution_span!(run_id, actions.len()).entered();

    let result = store.transaction(|writer| {
        let mut applied = ActionCounts::new();
        for action in actions {
            let done = apply_one(writer, kind, action, run_id, now)?;
            if done {
                writer.append_consolidation_log(&ConsolidationLogEntry {
                    run_id: run_id.to_string(),
                    action_type: action.action_type,
                    rule_id: action.rationale.rule_id,
                    target_ids: action.target_ids.clone(),
                    timestamp: now,
                })?;
                applied.increment(action.action_type);
            }
        }
        Ok(applied)
    });

    match result {
        Ok(applied) => {
            info!(planned = actions.len(), applied = applied.total(), "plan executed");
            Ok(applied)
        }
        Err(e) => {
            warn!(error = %e, "plan execution rolled back");
            Err(BrainError::ConsolidationError(ConsolidationError::ExecutionFailed {
                run_id: run_id.to_string(),
                reason: e.to_string(),
            }))
        }
    }
}

fn apply_one(
    writer: &dyn IRecordWriter,
    kind: RecordKind,
    action: &PlannedAction,
    run_id: &str,
    now: DateTime<Utc>,
) -> BrainResult<bool> {
    match action.action_type {
        ActionType::Merge => apply_merge(writer, kind, action, run_id, now),
        ActionType::Promote => apply_promote(writer, kind, action),
        ActionType::Archive => apply_archive(writer, kind, action),
        ActionType::FlagContradiction => apply_flag(writer, kind, action, run_id, now),
    }
}

fn with_archived(categories: &[String]) -> Vec<String> {
    let mut set: BTreeSet<String> = categories.iter().cloned().collect();
    set.insert(ARCHIVED_CATEGORY.to_string());
    set.into_iter().collect()
}

fn apply_merge(
    writer: &dyn IRecordWriter,
    kind: RecordKind,
    action: &PlannedAction,
    run_id: &str,
    now: DateTime<Utc>,
) -> BrainResult<bool> {
    let Some(canonical_id) = action.canonical_id.as_deref() else {
        return Ok(false);
    };
    if action.target_ids.len() < 2 {
        return Ok(false);
    }

    let mut present: Vec<MemoryRecord> = Vec::with_capacity(action.target_ids.len());
    for id in &action.target_ids {
        match writer.get(kind, id)? {
            Some(record) => present.push(record),
            None => debug!(id = %id, "merge target missing"),
        }
    }
    if !present.iter().any(|r| r.id == canonical_id) {
        warn!(canonical = %canonical_id, "merge canonical missing, skipping");
        return Ok(false);
    }

    let mut categories: BTreeSet<String> = present
        .iter()
        .flat_map(|r| r.categories.iter().cloned())
        .collect();
    if categories.is_empty() {
        categories.insert(CONSOLIDATED_CATEGORY.to_string());
    }
    let access_count: u64 = present.iter().map(|r| r.access_count).sum();
    let importance = present
        .iter()
        .map(|r| r.importance)
        .fold(MERGE_IMPORTANCE_FLOOR, f64::max);

    let provenance = serde_json::to_string(&MergeProvenance {
        merged_from: &action.target_ids,
        run_id,
        at: now.to_rfc3339_opts(SecondsFormat::Micros, true),
    })?;

    writer.update(
        &RecordPatch::new(kind, canonical_id)
            .categories(categories.into_iter().collect())
            .access_count(access_count)
            .importance(importance)
            .source(format!("{MERGE_PROVENANCE_PREFIX}{provenance}")),
    )?;

    for source in present.iter().filter(|r| r.id != canonical_id) {
        writer.update(
            &RecordPatch::new(kind, source.id.as_str())
                .categories(with_archived(&source.categories))
                .source(format!("{MERGED_INTO_SOURCE_PREFIX}{canonical_id}")),
        )?;
    }
    Ok(true)
}

fn apply_promote(
    writer: &dyn IRecordWriter,
    kind: RecordKind,
    action: &PlannedAction,
) -> BrainResult<bool> {
    let (Some(id), Some(importance)) = (action.target_ids.first(), action.new_importance) else {
        return Ok(false);
    };
    writer.update(&RecordPatch::new(kind, id.as_str()).importance(importance))
}

fn apply_archive(
    writer: &dyn IRecordWriter,
    kind: RecordKind,
    action: &PlannedAction,
) -> BrainResult<bool> {
    let Some(id) = action.target_ids.first() else {
        return Ok(false);
    };
    let Some(record) = writer.get(kind, id)? else {
        return Ok(false);
    };
    writer.update(
        &RecordPatch::new(kind, id.as_str())
            .categories(with_archived(&record.categories))
            .source(LOW_UTILITY_SOURCE),
    )
}

fn apply_flag(
    writer: &dyn IRecordWriter,
    kind: RecordKind,
    action: &PlannedAction,
    run_id: &str,
    now: DateTime<Utc>,
) -> BrainResult<bool> {
    if action.target_ids.len() != 2 {
        return Ok(false);
    }
    for id in &action.target_ids {
        if writer.get(kind, id)?.is_none() {
            debug!(id = %id, "flag target missing");
            return Ok(false);
        }
    }

    let source = format!("{CONTRADICTION_SOURCE_PREFIX}{}", idempotency_key(&action.target_ids));
    if writer.exists_with_source(kind, &source)? {
        debug!(source = %source, "contradiction already flagged");
        return Ok(false);
    }

    let mut ids: Vec<&str> = action.target_ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    let content = serde_json::to_string(&FlagContent {
        flag_type: "contradiction",
        ids,
        evidence: &action.rationale.evidence,
        run_id,
    })?;

    let mut flag = MemoryRecord::new(flag_id(kind), kind, content, now);
    flag.access_count = 0;
    flag.importance = CONTRADICTION_FLAG_IMPORTANCE;
    flag.categories = CONTRADICTION_FLAG_CATEGORIES
        .iter()
        .map(|c| c.to_string())
        .collect();
    flag.source = Some(source);
    writer.insert(&flag)?;
    Ok(true)
}

/// `<prefix>_<12 hex chars>`, e.g. `stm_3f2a9c0b11de`.
fn flag_id(kind: RecordKind) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", kind.as_str(), &hex[..12])
}
