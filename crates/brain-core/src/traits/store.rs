use chrono::{DateTime, Utc};

use crate::errors::BrainResult;
use crate::memory::{Confidence, MemoryRecord, RecordKind};
use crate::models::{AuditEntry, ConfidenceStats, ConsolidationLogEntry};

/// One row of a scoring page. Row-level defects (e.g. an unparseable
/// timestamp) surface here instead of failing the whole page.
pub type PageRow = BrainResult<MemoryRecord>;

/// Read side of the record store plus its transaction boundary.
pub trait IRecordStore: Send + Sync {
    // --- Reads ---
    fn count(&self, kind: RecordKind) -> BrainResult<usize>;
    fn load_page(&self, kind: RecordKind, offset: usize, limit: usize) -> BrainResult<Vec<PageRow>>;
    fn get(&self, kind: RecordKind, id: &str) -> BrainResult<Option<MemoryRecord>>;
    /// Records of `kind` that have a decoded embedding, newest first (ties by id, descending).
    fn load_with_embeddings(&self, kind: RecordKind) -> BrainResult<Vec<MemoryRecord>>;

    // --- Reporting ---
    fn confidence_stats(&self) -> BrainResult<ConfidenceStats>;
    fn audit_trail(&self, kind: RecordKind, record_id: &str) -> BrainResult<Vec<AuditEntry>>;

    // --- Transactions ---
    /// Run `f` inside one write transaction. Commits if `f` returns `Ok`,
    /// rolls back everything otherwise. Transactions never nest.
    fn transaction<T, F>(&self, f: F) -> BrainResult<T>
    where
        F: FnOnce(&dyn IRecordWriter) -> BrainResult<T>;
}

/// Write side, only reachable inside [`IRecordStore::transaction`].
pub trait IRecordWriter {
    fn get(&self, kind: RecordKind, id: &str) -> BrainResult<Option<MemoryRecord>>;
    /// Apply a single-row patch. Returns `false` if the row does not exist.
    fn update(&self, patch: &RecordPatch) -> BrainResult<bool>;
    fn insert(&self, record: &MemoryRecord) -> BrainResult<()>;
    fn exists_with_source(&self, kind: RecordKind, source: &str) -> BrainResult<bool>;
    fn append_audit(&self, entry: &AuditEntry) -> BrainResult<()>;
    fn append_consolidation_log(&self, entry: &ConsolidationLogEntry) -> BrainResult<()>;
}

/// Single-row update. Only `Some` fields are written.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPatch {
    pub kind: RecordKind,
    pub id: String,
    pub access_count: Option<u64>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub validation_count: Option<u64>,
    pub contradiction_count: Option<u64>,
    pub confidence: Option<Confidence>,
    pub importance: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub source: Option<String>,
}

impl RecordPatch {
    pub fn new(kind: RecordKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            access_count: None,
            last_accessed: None,
            validation_count: None,
            contradiction_count: None,
            confidence: None,
            importance: None,
            categories: None,
            source: None,
        }
    }

    pub fn access_count(mut self, value: u64) -> Self {
        self.access_count = Some(value);
        self
    }

    pub fn last_accessed(mut self, value: DateTime<Utc>) -> Self {
        self.last_accessed = Some(value);
        self
    }

    pub fn validation_count(mut self, value: u64) -> Self {
        self.validation_count = Some(value);
        self
    }

    pub fn contradiction_count(mut self, value: u64) -> Self {
        self.contradiction_count = Some(value);
        self
    }

    pub fn confidence(mut self, value: Confidence) -> Self {
        self.confidence = Some(value);
        self
    }

    pub fn importance(mut self, value: f64) -> Self {
        self.importance = Some(value);
        self
    }

    pub fn categories(mut self, value: Vec<String>) -> Self {
        self.categories = Some(value);
        self
    }

    pub fn source(mut self, value: impl Into<String>) -> Self {
        self.source = Some(value.into());
        self
    }

    /// True if no field would be written.
    pub fn is_empty(&self) -> bool {
        self.access_count.is_none()
            && self.last_accessed.is_none()
            && self.validation_count.is_none()
            && self.contradiction_count.is_none()
            && self.confidence.is_none()
            && self.importance.is_none()
            && self.categories.is_none()
            && self.source.is_none()
    }
}
