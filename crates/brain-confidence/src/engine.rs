use chrono::{DateTime, Utc};

use brain_core::config::ConfidenceConfig;
use brain_core::errors::BrainResult;
use brain_core::memory::{Confidence, MemoryRecord, RecordKind};
use brain_core::models::{AuditEntry, ConfidenceChangeReason, ConfidenceStats, RetroactiveScoringSummary};
use brain_core::traits::{IRecordStore, IRecordWriter, RecordPatch};
use brain_observability::lifecycle_span;

use crate::factors::ScoringContext;
use crate::formula::{self, ScoreBreakdown};
use crate::probe;
use crate::retroactive::{self, ProgressFn};

/// Confidence scorer plus the lifecycle operations that call it.
pub struct ConfidenceEngine {
    config: ConfidenceConfig,
}

impl ConfidenceEngine {
    pub fn new() -> Self {
        Self::with_config(ConfidenceConfig::default())
    }

    pub fn with_config(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Score `record` at `now`. Always in [0.1, 1.0].
    pub fn score(&self, record: &MemoryRecord, now: DateTime<Utc>) -> f64 {
        formula::compute(record, &ScoringContext::at(now), &self.config)
    }

    pub fn breakdown(&self, record: &MemoryRecord, now: DateTime<Utc>) -> ScoreBreakdown {
        formula::compute_breakdown(record, &ScoringContext::at(now), &self.config)
    }

    /// Record a read: bump `access_count`, stamp `last_accessed`, rescore.
    pub fn update_on_access<S: IRecordStore>(
        &self,
        store: &S,
        kind: RecordKind,
        id: &str,
    ) -> BrainResult<f64> {
        self.update_on_access_at(store, kind, id, Utc::now())
    }

    pub fn update_on_access_at<S: IRecordStore>(
        &self,
        store: &S,
        kind: RecordKind,
        id: &str,
        now: DateTime<Utc>,
    ) -> BrainResult<f64> {
        self.apply_lifecycle(store, kind, id, ConfidenceChangeReason::Access, now, |record| {
            record.access_count += 1;
            record.last_accessed = Some(now);
            RecordPatch::new(kind, id)
                .access_count(record.access_count)
                .last_accessed(now)
        })
    }

    /// Record validation feedback. Success bumps `validation_count`,
    /// failure bumps `contradiction_count`.
    pub fn apply_validation<S: IRecordStore>(
        &self,
        store: &S,
        kind: RecordKind,
        id: &str,
        success: bool,
    ) -> BrainResult<f64> {
        self.apply_validation_at(store, kind, id, success, Utc::now())
    }

    pub fn apply_validation_at<S: IRecordStore>(
        &self,
        store: &S,
        kind: RecordKind,
        id: &str,
        success: bool,
        now: DateTime<Utc>,
    ) -> BrainResult<f64> {
        let reason = if success {
            ConfidenceChangeReason::ValidationSuccess
        } else {
            ConfidenceChangeReason::ValidationFailure
        };
        self.apply_lifecycle(store, kind, id, reason, now, |record| {
            if success {
                record.validation_count += 1;
                RecordPatch::new(kind, id).validation_count(record.validation_count)
            } else {
                record.contradiction_count += 1;
                RecordPatch::new(kind, id).contradiction_count(record.contradiction_count)
            }
        })
    }

    /// Per-kind confidence distribution.
    pub fn confidence_stats<S: IRecordStore>(&self, store: &S) -> BrainResult<ConfidenceStats> {
        store.confidence_stats()
    }

    /// Ids of `existing` records that `incoming` text appears to contradict.
    /// Text-only; meant for records that do not have an embedding yet.
    pub fn find_contradicted(&self, incoming: &str, existing: &[MemoryRecord]) -> Vec<String> {
        let ids = probe::probe(incoming, existing);
        if !ids.is_empty() {
            tracing::debug!(candidates = existing.len(), hits = ids.len(), "contradiction probe");
        }
        ids
    }

    /// Rescore every record of every kind. See [`retroactive::score_all`].
    pub fn score_retroactively<S: IRecordStore>(
        &self,
        store: &S,
        progress: Option<ProgressFn<'_>>,
    ) -> RetroactiveScoringSummary {
        retroactive::score_all(self, store, Utc::now(), progress)
    }

    /// Load, mutate, rescore, persist and audit one record in one transaction.
    fn apply_lifecycle<S, M>(
        &self,
        store: &S,
        kind: RecordKind,
        id: &str,
        reason: ConfidenceChangeReason,
        now: DateTime<Utc>,
        mutate: M,
    ) -> BrainResult<f64>
    where
        S: IRecordStore,
        M: FnOnce(&mut MemoryRecord) -> RecordPatch,
    {
        let _span = lifecycle_span!(kind, id, reason).entered();
        store.transaction(|writer| {
            let mut record = match writer.get(kind, id) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    tracing::warn!(kind = %kind, record_id = id, "record not found, returning neutral confidence");
                    return Ok(Confidence::NEUTRAL);
                }
                Err(e) if e.is_input_defect() => {
                    tracing::error!(kind = %kind, record_id = id, error = %e, "unreadable record, returning neutral confidence");
                    return Ok(Confidence::NEUTRAL);
                }
                Err(e) => return Err(e),
            };

            let old = record.confidence.value();
            let patch = mutate(&mut record);
            let new = self.score(&record, now);
            writer.update(&patch.confidence(Confidence::new(new)))?;
            append_audit_best_effort(writer, AuditEntry::new(id, kind, old, new, reason, now));

            tracing::debug!(kind = %kind, record_id = id, old, new, reason = %reason, "confidence updated");
            Ok(new)
        })
    }
}

impl Default for ConfidenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit writes never block the primary mutation.
pub(crate) fn append_audit_best_effort(writer: &dyn IRecordWriter, entry: AuditEntry) {
    if let Err(e) = writer.append_audit(&entry) {
        tracing::warn!(
            record_id = %entry.record_id,
            kind = %entry.kind,
            error = %e,
            "failed to append confidence audit entry"
        );
    }
}
