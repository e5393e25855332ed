//! Batch retroactive scoring: rescore every record of every kind in pages.
//!
//! Scores within a page are computed in parallel; the page's writes then
//! commit together. Only changes larger than the configured threshold are
//! written, so an interrupted sweep can simply be re-run.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use brain_core::errors::{BrainError, StorageError};
use brain_core::memory::{Confidence, RecordKind};
use brain_core::models::{AuditEntry, ConfidenceChangeReason, RetroactiveScoringSummary};
use brain_core::traits::{IRecordStore, RecordPatch};
use brain_observability::scoring_span;

use crate::engine::{append_audit_best_effort, ConfidenceEngine};

/// Progress sink, called after each page with `(kind, rows_seen, total)`.
pub type ProgressFn<'a> = &'a dyn Fn(RecordKind, usize, usize);

/// One record whose stored confidence should change.
struct Change {
    id: String,
    old: f64,
    new: f64,
}

/// Sweep all kinds in [`RecordKind::ALL`] order. Never fails: bad rows,
/// failed page reads and failed page commits are logged and counted in
/// `errors`; a kind without a table is skipped with zero counts.
pub fn score_all<S: IRecordStore>(
    engine: &ConfidenceEngine,
    store: &S,
    now: DateTime<Utc>,
    progress: Option<ProgressFn<'_>>,
) -> RetroactiveScoringSummary {
    let batch_size = engine.config().batch_size.max(1);
    let _span = scoring_span!(batch_size).entered();

    let mut summary = RetroactiveScoringSummary::default();
    for kind in RecordKind::ALL {
        let processed = score_kind(engine, store, kind, batch_size, now, progress, &mut summary);
        summary.processed.insert(kind, processed);
    }

    tracing::info!(
        processed = summary.total_processed(),
        changed = summary.confidence_changes,
        errors = summary.errors,
        "retroactive scoring complete"
    );
    summary
}

fn score_kind<S: IRecordStore>(
    engine: &ConfidenceEngine,
    store: &S,
    kind: RecordKind,
    batch_size: usize,
    now: DateTime<Utc>,
    progress: Option<ProgressFn<'_>>,
    summary: &mut RetroactiveScoringSummary,
) -> usize {
    let total = match store.count(kind) {
        Ok(total) => total,
        Err(BrainError::StorageError(StorageError::TableMissing { table })) => {
            tracing::info!(kind = %kind, table = %table, "table missing, kind skipped");
            return 0;
        }
        Err(e) => {
            tracing::error!(kind = %kind, error = %e, "count failed, kind skipped");
            summary.errors += 1;
            return 0;
        }
    };

    let threshold = engine.config().change_threshold;
    let mut processed = 0;
    let mut offset = 0;
    while offset < total {
        let page = match store.load_page(kind, offset, batch_size) {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(kind = %kind, offset, error = %e, "page read failed, page skipped");
                summary.errors += 1;
                offset += batch_size;
                continue;
            }
        };
        if page.is_empty() {
            break;
        }
        let seen = page.len();

        let scored: Vec<_> = page
            .into_par_iter()
            .map(|row| row.map(|record| (record.id.clone(), record.confidence.value(), engine.score(&record, now))))
            .collect();

        let mut changes = Vec::new();
        for row in scored {
            match row {
                Ok((id, old, new)) => {
                    processed += 1;
                    if (new - old).abs() > threshold {
                        changes.push(Change { id, old, new });
                    }
                }
                Err(e) => {
                    tracing::warn!(kind = %kind, error = %e, "defective row skipped");
                    summary.errors += 1;
                }
            }
        }

        if !changes.is_empty() {
            match commit_page(store, kind, &changes, now) {
                Ok(written) => summary.confidence_changes += written,
                Err(e) => {
                    tracing::error!(kind = %kind, offset, error = %e, "page commit failed, page skipped");
                    summary.errors += 1;
                }
            }
        }

        offset += seen;
        tracing::debug!(kind = %kind, offset, total, changed = changes.len(), "page scored");
        if let Some(report) = progress {
            report(kind, offset.min(total), total);
        }
    }
    processed
}

fn commit_page<S: IRecordStore>(
    store: &S,
    kind: RecordKind,
    changes: &[Change],
    now: DateTime<Utc>,
) -> brain_core::BrainResult<usize> {
    store.transaction(|writer| {
        let mut written = 0;
        for change in changes {
            let patch = RecordPatch::new(kind, change.id.as_str()).confidence(Confidence::new(change.new));
            if writer.update(&patch)? {
                written += 1;
                append_audit_best_effort(
                    writer,
                    AuditEntry::new(
                        change.id.as_str(),
                        kind,
                        change.old,
                        change.new,
                        ConfidenceChangeReason::RetroactiveScoring,
                        now,
                    ),
                );
            }
        }
        Ok(written)
    })
}
