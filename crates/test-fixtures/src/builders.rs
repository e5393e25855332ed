//! Fluent record construction relative to a fixed `now`.

use chrono::{DateTime, Duration, Utc};

use brain_core::memory::{Confidence, MemoryRecord, RecordKind};

pub struct RecordBuilder {
    record: MemoryRecord,
    now: DateTime<Utc>,
}

impl RecordBuilder {
    pub fn new(kind: RecordKind, id: &str, now: DateTime<Utc>) -> Self {
        Self {
            record: MemoryRecord::new(id, kind, format!("content of {id}"), now),
            now,
        }
    }

    pub fn stm(id: &str, now: DateTime<Utc>) -> Self {
        Self::new(RecordKind::ShortTerm, id, now)
    }

    pub fn content(mut self, content: &str) -> Self {
        self.record.content = content.to_string();
        self
    }

    pub fn days_old(mut self, days: i64) -> Self {
        self.record.created_at = self.now - Duration::days(days);
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.created_at = at;
        self
    }

    pub fn accessed_days_ago(mut self, days: i64) -> Self {
        self.record.last_accessed = Some(self.now - Duration::days(days));
        self
    }

    pub fn access_count(mut self, n: u64) -> Self {
        self.record.access_count = n;
        self
    }

    pub fn validations(mut self, n: u64) -> Self {
        self.record.validation_count = n;
        self
    }

    pub fn contradictions(mut self, n: u64) -> Self {
        self.record.contradiction_count = n;
        self
    }

    pub fn importance(mut self, importance: f64) -> Self {
        self.record.importance = importance;
        self
    }

    pub fn categories(mut self, categories: &[&str]) -> Self {
        self.record.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.record.embedding = Some(embedding);
        self
    }

    pub fn confidence(mut self, value: f64) -> Self {
        self.record.confidence = Confidence::new(value);
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.record.source = Some(source.to_string());
        self
    }

    pub fn build(self) -> MemoryRecord {
        self.record
    }
}
