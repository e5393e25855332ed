//! StorageEngine: owns the ConnectionPool, runs migrations at startup,
//! implements [`IRecordStore`] and hands out a [`TransactionWriter`] inside
//! explicit write transactions.

use std::path::Path;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use brain_core::config::StorageConfig;
use brain_core::errors::{BrainError, BrainResult, StorageError};
use brain_core::memory::{MemoryRecord, RecordKind};
use brain_core::models::{AuditEntry, ConfidenceStats, ConsolidationLogEntry};
use brain_core::traits::{IRecordStore, IRecordWriter, PageRow, RecordPatch};

use crate::migrations;
use crate::pool::{pragmas, ConnectionPool};
use crate::queries::{audit_ops, consolidation_log_ops, record_ops, stats_ops};

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open (creating if needed) a database file and bring its schema up to date.
    pub fn open(path: &Path, config: &StorageConfig) -> BrainResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let engine = Self { pool };
        engine.initialize()?;
        let wal = engine.pool.writer.with_conn_sync(pragmas::verify_wal_mode)?;
        if !wal {
            tracing::warn!(
                path = %path.display(),
                "WAL mode not active, readers may block on writes"
            );
        }
        tracing::info!(
            path = %path.display(),
            readers = engine.pool.reader_count(),
            wal,
            "storage opened"
        );
        Ok(engine)
    }

    pub fn open_in_memory() -> BrainResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> BrainResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            let version = migrations::run_migrations(conn)?;
            tracing::debug!(version, "schema up to date");
            Ok(())
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Run a read-only closure on the best available connection.
    pub fn with_reader<F, T>(&self, f: F) -> BrainResult<T>
    where
        F: FnOnce(&Connection) -> BrainResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn_sync(f),
        }
    }

    /// Insert records outside any caller transaction (seeding and imports).
    pub fn insert_bulk(&self, records: &[MemoryRecord]) -> BrainResult<usize> {
        self.transaction(|writer| {
            for record in records {
                writer.insert(record)?;
            }
            Ok(records.len())
        })
    }

    /// Number of rows in the confidence audit log.
    pub fn audit_count(&self) -> BrainResult<usize> {
        self.with_reader(audit_ops::count)
    }

    /// Applied consolidation actions for one run, as `(action_type, target_ids)`.
    pub fn consolidation_log(&self, run_id: &str) -> BrainResult<Vec<(String, Vec<String>)>> {
        self.with_reader(|conn| consolidation_log_ops::entries_for_run(conn, run_id))
    }
}

impl IRecordStore for StorageEngine {
    fn count(&self, kind: RecordKind) -> BrainResult<usize> {
        self.with_reader(|conn| record_ops::count(conn, kind))
    }

    fn load_page(&self, kind: RecordKind, offset: usize, limit: usize) -> BrainResult<Vec<PageRow>> {
        self.with_reader(|conn| record_ops::load_page(conn, kind, offset, limit))
    }

    fn get(&self, kind: RecordKind, id: &str) -> BrainResult<Option<MemoryRecord>> {
        self.with_reader(|conn| record_ops::get_record(conn, kind, id))
    }

    fn load_with_embeddings(&self, kind: RecordKind) -> BrainResult<Vec<MemoryRecord>> {
        self.with_reader(|conn| record_ops::load_with_embeddings(conn, kind))
    }

    fn confidence_stats(&self) -> BrainResult<ConfidenceStats> {
        self.with_reader(stats_ops::confidence_stats)
    }

    fn audit_trail(&self, kind: RecordKind, record_id: &str) -> BrainResult<Vec<AuditEntry>> {
        self.with_reader(|conn| audit_ops::trail(conn, kind, record_id))
    }

    fn transaction<T, F>(&self, f: F) -> BrainResult<T>
    where
        F: FnOnce(&dyn IRecordWriter) -> BrainResult<T>,
    {
        self.pool.writer.with_conn_sync(|conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
                .map_err(|e| aborted(format!("begin: {e}")))?;

            let writer = TransactionWriter { conn: &tx };
            match f(&writer) {
                Ok(value) => {
                    tx.commit().map_err(|e| aborted(format!("commit: {e}")))?;
                    Ok(value)
                }
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback() {
                        tracing::error!(error = %rollback_err, "rollback failed");
                    }
                    Err(e)
                }
            }
        })
    }
}

fn aborted(reason: String) -> BrainError {
    StorageError::TransactionAborted { reason }.into()
}

/// Write handle bound to one open transaction.
pub struct TransactionWriter<'a> {
    conn: &'a Connection,
}

impl IRecordWriter for TransactionWriter<'_> {
    fn get(&self, kind: RecordKind, id: &str) -> BrainResult<Option<MemoryRecord>> {
        record_ops::get_record(self.conn, kind, id)
    }

    fn update(&self, patch: &RecordPatch) -> BrainResult<bool> {
        record_ops::update_record(self.conn, patch)
    }

    fn insert(&self, record: &MemoryRecord) -> BrainResult<()> {
        record_ops::insert_record(self.conn, record)
    }

    fn exists_with_source(&self, kind: RecordKind, source: &str) -> BrainResult<bool> {
        record_ops::exists_with_source(self.conn, kind, source)
    }

    fn append_audit(&self, entry: &AuditEntry) -> BrainResult<()> {
        audit_ops::append(self.conn, entry)
    }

    fn append_consolidation_log(&self, entry: &ConsolidationLogEntry) -> BrainResult<()> {
        consolidation_log_ops::append(self.conn, entry)
    }
}
