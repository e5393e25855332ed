//! Record reads and writes for every kind, via [`TableStrategy`].
//!
//! Reads coalesce NULL lifecycle columns to [`LIFECYCLE_DEFAULTS`] in SQL and
//! decode timestamps tolerantly (RFC 3339, naive ISO, integer epoch seconds).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use brain_core::errors::{BrainError, BrainResult, StorageError};
use brain_core::memory::{Confidence, MemoryRecord, RecordKind, LIFECYCLE_DEFAULTS};
use brain_core::traits::{PageRow, RecordPatch};

use crate::strategy::TableStrategy;
use crate::to_storage_err;

/// Columns selected for every record read. `?1..?5` are the lifecycle defaults.
const SELECT_COLUMNS: &str = "id, content, created_at, last_accessed,
    COALESCE(access_count, ?1), COALESCE(validation_count, ?2),
    COALESCE(contradiction_count, ?3), COALESCE(confidence, ?4),
    COALESCE(importance, ?5), categories, source, embedding";

const SELECTED_COLUMN_COUNT: usize = 12;

fn default_params() -> [Value; 5] {
    let d = &LIFECYCLE_DEFAULTS;
    [
        Value::Integer(d.access_count as i64),
        Value::Integer(d.validation_count as i64),
        Value::Integer(d.contradiction_count as i64),
        Value::Real(d.confidence),
        Value::Real(d.importance),
    ]
}

/// Whether `table` exists in the schema.
pub fn table_exists(conn: &Connection, table: &str) -> BrainResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(found.is_some())
}

fn require_table(conn: &Connection, kind: RecordKind) -> BrainResult<&'static TableStrategy> {
    let strategy = TableStrategy::for_kind(kind);
    if !table_exists(conn, strategy.table)? {
        return Err(StorageError::TableMissing {
            table: strategy.table.to_string(),
        }
        .into());
    }
    Ok(strategy)
}

pub fn count(conn: &Connection, kind: RecordKind) -> BrainResult<usize> {
    let strategy = require_table(conn, kind)?;
    let n: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", strategy.table), [], |row| {
            row.get(0)
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n.max(0) as usize)
}

/// One page of records in row order. Row-level decode defects are returned
/// in place so the caller can skip them individually.
pub fn load_page(
    conn: &Connection,
    kind: RecordKind,
    offset: usize,
    limit: usize,
) -> BrainResult<Vec<PageRow>> {
    let strategy = require_table(conn, kind)?;
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM {} ORDER BY rowid LIMIT ?6 OFFSET ?7",
        strategy.table
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut values: Vec<Value> = default_params().into();
    values.push(Value::Integer(limit as i64));
    values.push(Value::Integer(offset as i64));

    let rows = stmt
        .query_map(params_from_iter(values), |row| row_to_record(kind, row))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let page: BrainResult<Vec<PageRow>> = rows
        .map(|r| r.map_err(|e| to_storage_err(e.to_string())))
        .collect();
    page
}

pub fn get_record(conn: &Connection, kind: RecordKind, id: &str) -> BrainResult<Option<MemoryRecord>> {
    let strategy = require_table(conn, kind)?;
    let sql = format!("SELECT {SELECT_COLUMNS} FROM {} WHERE id = ?6", strategy.table);
    let mut values: Vec<Value> = default_params().into();
    values.push(Value::Text(id.to_string()));

    let result = conn
        .query_row(&sql, params_from_iter(values), |row| row_to_record(kind, row))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(record)) => Ok(Some(record)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// Records that carry a decodable embedding, newest first, ties by id descending.
/// Rows that fail to decode are logged and left out.
pub fn load_with_embeddings(conn: &Connection, kind: RecordKind) -> BrainResult<Vec<MemoryRecord>> {
    let strategy = require_table(conn, kind)?;
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM {} WHERE embedding IS NOT NULL",
        strategy.table
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(default_params()), |row| row_to_record(kind, row))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut records = Vec::new();
    for row in rows {
        match row.map_err(|e| to_storage_err(e.to_string()))? {
            Ok(record) if record.embedding.is_some() => records.push(record),
            Ok(record) => {
                tracing::warn!(record_id = %record.id, kind = %kind, "undecodable embedding, record skipped");
            }
            Err(e) => tracing::warn!(kind = %kind, error = %e, "defective row skipped"),
        }
    }
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    Ok(records)
}

pub fn insert_record(conn: &Connection, record: &MemoryRecord) -> BrainResult<()> {
    let strategy = TableStrategy::for_kind(record.kind);
    let categories =
        serde_json::to_string(&record.categories).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        &format!(
            "INSERT INTO {} (
                id, content, created_at, last_accessed, access_count, validation_count,
                contradiction_count, confidence, importance, categories, source, embedding
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            strategy.table
        ),
        params![
            record.id,
            record.content,
            record.created_at.to_rfc3339(),
            record.last_accessed.map(|t| t.to_rfc3339()),
            record.access_count as i64,
            record.validation_count as i64,
            record.contradiction_count as i64,
            record.confidence.value(),
            record.importance,
            categories,
            record.source,
            record.embedding.as_deref().map(encode_embedding),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Apply a single-row patch. Returns `false` when no row has the id.
pub fn update_record(conn: &Connection, patch: &RecordPatch) -> BrainResult<bool> {
    let strategy = TableStrategy::for_kind(patch.kind);
    if patch.is_empty() {
        let found: Option<i64> = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", strategy.table),
                params![patch.id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| to_storage_err(e.to_string()))?;
        return Ok(found.is_some());
    }

    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(n) = patch.access_count {
        sets.push("access_count");
        values.push(Value::Integer(n as i64));
    }
    if let Some(t) = patch.last_accessed {
        sets.push("last_accessed");
        values.push(Value::Text(t.to_rfc3339()));
    }
    if let Some(n) = patch.validation_count {
        sets.push("validation_count");
        values.push(Value::Integer(n as i64));
    }
    if let Some(n) = patch.contradiction_count {
        sets.push("contradiction_count");
        values.push(Value::Integer(n as i64));
    }
    if let Some(c) = patch.confidence {
        sets.push("confidence");
        values.push(Value::Real(c.value()));
    }
    if let Some(i) = patch.importance {
        sets.push("importance");
        values.push(Value::Real(i));
    }
    if let Some(categories) = &patch.categories {
        sets.push("categories");
        let json = serde_json::to_string(categories).map_err(|e| to_storage_err(e.to_string()))?;
        values.push(Value::Text(json));
    }
    if let Some(source) = &patch.source {
        sets.push("source");
        values.push(Value::Text(source.clone()));
    }

    let assignments: Vec<String> = sets
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        strategy.table,
        assignments.join(", "),
        values.len() + 1
    );
    values.push(Value::Text(patch.id.clone()));

    let changed = conn
        .execute(&sql, params_from_iter(values))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

pub fn exists_with_source(conn: &Connection, kind: RecordKind, source: &str) -> BrainResult<bool> {
    let strategy = TableStrategy::for_kind(kind);
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE source = ?1 LIMIT 1", strategy.table),
            params![source],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(found.is_some())
}

/// Little-endian f32 blob.
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`encode_embedding`]; `None` for empty or misaligned blobs.
pub fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.is_empty() || blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// Accepts RFC 3339, naive ISO 8601 (read as UTC), and integer or real epoch seconds.
pub fn parse_timestamp(field: &str, value: ValueRef<'_>) -> BrainResult<DateTime<Utc>> {
    let invalid = |shown: String| BrainError::InvalidTimestamp {
        field: field.to_string(),
        value: shown,
    };
    match value {
        ValueRef::Integer(secs) => Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| invalid(secs.to_string())),
        ValueRef::Real(secs) if secs.is_finite() => Utc
            .timestamp_opt(secs.trunc() as i64, (secs.fract().abs() * 1e9) as u32)
            .single()
            .ok_or_else(|| invalid(secs.to_string())),
        ValueRef::Text(bytes) => {
            let raw = std::str::from_utf8(bytes)
                .map_err(|_| invalid(String::from_utf8_lossy(bytes).into_owned()))?
                .trim();
            parse_timestamp_str(raw).ok_or_else(|| invalid(raw.to_string()))
        }
        ValueRef::Null => Err(invalid("NULL".to_string())),
        other => Err(invalid(format!("{other:?}"))),
    }
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

fn parse_categories(value: ValueRef<'_>) -> Vec<String> {
    match value {
        ValueRef::Text(bytes) => serde_json::from_slice::<Vec<serde_json::Value>>(bytes)
            .map(|items| {
                items
                    .into_iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn invalid_column(field: &str, value: ValueRef<'_>) -> BrainError {
    let shown = match value {
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Null => "NULL".to_string(),
        other => format!("{other:?}"),
    };
    BrainError::InvalidColumn {
        field: field.to_string(),
        value: shown,
    }
}

/// Required text column. Integer ids (legacy rowid-style keys) are accepted.
fn read_text(field: &str, value: ValueRef<'_>) -> BrainResult<String> {
    match value {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| invalid_column(field, value)),
        ValueRef::Integer(n) => Ok(n.to_string()),
        other => Err(invalid_column(field, other)),
    }
}

fn read_optional_text(field: &str, value: ValueRef<'_>) -> BrainResult<Option<String>> {
    match value {
        ValueRef::Null => Ok(None),
        other => read_text(field, other).map(Some),
    }
}

/// Counter column; negative values clamp to zero, numeric text is accepted.
fn read_count(field: &str, value: ValueRef<'_>) -> BrainResult<u64> {
    let n = match value {
        ValueRef::Integer(n) => n,
        ValueRef::Real(f) if f.is_finite() => f.trunc() as i64,
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .ok_or_else(|| invalid_column(field, value))?,
        other => return Err(invalid_column(field, other)),
    };
    Ok(n.max(0) as u64)
}

fn read_real(field: &str, value: ValueRef<'_>) -> BrainResult<f64> {
    match value {
        ValueRef::Real(f) if f.is_finite() => Ok(f),
        ValueRef::Integer(n) => Ok(n as f64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite())
            .ok_or_else(|| invalid_column(field, value)),
        other => Err(invalid_column(field, other)),
    }
}

/// Decode one row. The outer `Result` is a SQLite access failure; the inner
/// one is a defect in this row's data, so one bad row never fails its page.
fn row_to_record(kind: RecordKind, row: &Row<'_>) -> rusqlite::Result<PageRow> {
    let refs = (0..SELECTED_COLUMN_COUNT)
        .map(|i| row.get_ref(i))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(decode_record(kind, &refs))
}

fn decode_record(kind: RecordKind, refs: &[ValueRef<'_>]) -> BrainResult<MemoryRecord> {
    let last_accessed = match refs[3] {
        ValueRef::Null => None,
        value => Some(parse_timestamp("last_accessed", value)?),
    };
    let embedding = match refs[11] {
        ValueRef::Blob(bytes) => decode_embedding(bytes),
        _ => None,
    };

    Ok(MemoryRecord {
        id: read_text("id", refs[0])?,
        kind,
        content: read_optional_text("content", refs[1])?.unwrap_or_default(),
        created_at: parse_timestamp("created_at", refs[2])?,
        last_accessed,
        access_count: read_count("access_count", refs[4])?,
        validation_count: read_count("validation_count", refs[5])?,
        contradiction_count: read_count("contradiction_count", refs[6])?,
        embedding,
        categories: parse_categories(refs[9]),
        importance: read_real("importance", refs[8])?,
        source: read_optional_text("source", refs[10])?,
        confidence: Confidence::new(read_real("confidence", refs[7])?),
    })
}
