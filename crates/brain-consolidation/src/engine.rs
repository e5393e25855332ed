//! ConsolidationEngine: load, plan, optionally execute, report.
//! Guarded by an `Arc<AtomicBool>` so only one run is in flight.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use brain_core::config::ConsolidationConfig;
use brain_core::errors::{BrainError, BrainResult, ConsolidationError};
use brain_core::memory::{MemoryRecord, RecordKind};
use brain_core::models::{
    ActionCounts, ConsolidationReport, DetectedCounts, PlannedCounts, ReportScope, RunMode,
};
use brain_core::traits::IRecordStore;

use crate::{executor, planner};

/// The record kind consolidation operates on.
const CONSOLIDATED_KIND: RecordKind = RecordKind::ShortTerm;

/// Entry point for consolidation runs.
pub struct ConsolidationEngine {
    config: ConsolidationConfig,
    /// Guard: only one consolidation can run at a time.
    is_running: Arc<AtomicBool>,
}

/// Releases the run guard on drop, including on early return.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for ConsolidationEngine {
    fn default() -> Self {
        Self::new(ConsolidationConfig::default())
    }
}

impl ConsolidationEngine {
    pub fn new(config: ConsolidationConfig) -> Self {
        Self {
            config,
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Check if a consolidation is currently running.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// `blake3:<hex>` over the serialized thresholds.
    pub fn config_hash(&self) -> BrainResult<String> {
        let json = serde_json::to_vec(&self.config)?;
        Ok(format!("blake3:{}", blake3::hash(&json).to_hex()))
    }

    /// Run consolidation at the current time.
    pub fn run<S: IRecordStore>(
        &self,
        store: &S,
        mode: RunMode,
        report_path: Option<&Path>,
    ) -> BrainResult<ConsolidationReport> {
        self.run_at(store, mode, report_path, Utc::now())
    }

    /// Run consolidation as of `now`. The run id is `now` in RFC 3339.
    pub fn run_at<S: IRecordStore>(
        &self,
        store: &S,
        mode: RunMode,
        report_path: Option<&Path>,
        now: DateTime<Utc>,
    ) -> BrainResult<ConsolidationReport> {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConsolidationError::AlreadyRunning.into());
        }
        let _guard = RunGuard(&self.is_running);

        let run_id = now.to_rfc3339_opts(SecondsFormat::Micros, true);
        let _span = brain_observability::consolidation_span!(run_id, mode).entered();

        let records: Vec<MemoryRecord> = store
            .load_with_embeddings(CONSOLIDATED_KIND)?
            .into_iter()
            .filter(|r| !r.is_archived())
            .collect();

        let plan = planner::plan(&records, &self.config, now);
        info!(
            candidates = records.len(),
            clusters = plan.clusters,
            actions = plan.actions.len(),
            contradiction_pairs = plan.contradiction_pairs,
            "consolidation planned"
        );

        let executed = match mode {
            RunMode::DryRun => ActionCounts::new(),
            RunMode::Execute => {
                executor::execute(store, CONSOLIDATED_KIND, &plan.actions, &run_id, now)?
            }
        };

        let report = ConsolidationReport {
            run_id,
            mode,
            config_hash: self.config_hash()?,
            scope: ReportScope::default(),
            detected: DetectedCounts {
                clusters: plan.clusters,
                contradiction_pairs: plan.contradiction_pairs,
            },
            planned: PlannedCounts::from(&plan.counts),
            actions: plan.actions,
            executed,
        };

        if let Some(path) = report_path {
            write_report(&report, path)?;
        }
        Ok(report)
    }
}

fn write_report(report: &ConsolidationReport, path: &Path) -> BrainResult<()> {
    let failed = |reason: String| {
        BrainError::from(ConsolidationError::ReportWriteFailed {
            path: path.display().to_string(),
            reason,
        })
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|e| failed(e.to_string()))?;
    info!(path = %path.display(), "consolidation report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_hash_tracks_thresholds() {
        let a = ConsolidationEngine::default().config_hash().unwrap();
        let b = ConsolidationEngine::new(ConsolidationConfig::default().with_similarity_threshold(0.9))
            .config_hash()
            .unwrap();
        assert!(a.starts_with("blake3:"));
        assert_ne!(a, b);
        assert_eq!(a, ConsolidationEngine::default().config_hash().unwrap());
    }

    #[test]
    fn engine_starts_idle() {
        assert!(!ConsolidationEngine::default().is_running());
    }

    #[test]
    fn concurrent_run_is_rejected_and_guard_is_kept() {
        let store = brain_storage::StorageEngine::open_in_memory().unwrap();
        let engine = ConsolidationEngine::default();
        engine.is_running.store(true, Ordering::SeqCst);

        let err = engine.run(&store, RunMode::DryRun, None).unwrap_err();
        assert!(matches!(
            err,
            BrainError::ConsolidationError(ConsolidationError::AlreadyRunning)
        ));
        // The rejected call must not release the other run's guard.
        assert!(engine.is_running());
    }

    #[test]
    fn guard_is_released_after_run() {
        let store = brain_storage::StorageEngine::open_in_memory().unwrap();
        let engine = ConsolidationEngine::default();
        engine.run(&store, RunMode::DryRun, None).unwrap();
        assert!(!engine.is_running());
        engine.run(&store, RunMode::Execute, None).unwrap();
    }
}
