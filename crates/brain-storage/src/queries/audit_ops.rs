//! Append-only confidence audit log.

use rusqlite::{params, Connection};

use brain_core::errors::BrainResult;
use brain_core::memory::RecordKind;
use brain_core::models::AuditEntry;

use super::record_ops::parse_timestamp;
use crate::to_storage_err;

pub fn append(conn: &Connection, entry: &AuditEntry) -> BrainResult<()> {
    conn.execute(
        "INSERT INTO confidence_audit
            (record_id, kind, old_confidence, new_confidence, reason, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.record_id,
            entry.kind.as_str(),
            entry.old_confidence,
            entry.new_confidence,
            entry.reason.as_str(),
            entry.timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Every audit entry for one record, oldest first.
pub fn trail(conn: &Connection, kind: RecordKind, record_id: &str) -> BrainResult<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT old_confidence, new_confidence, reason, timestamp
             FROM confidence_audit
             WHERE kind = ?1 AND record_id = ?2
             ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![kind.as_str(), record_id], |row| {
            Ok((
                row.get::<_, f64>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut entries = Vec::new();
    for row in rows {
        let (old, new, reason, timestamp) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let timestamp =
            parse_timestamp("timestamp", rusqlite::types::ValueRef::Text(timestamp.as_bytes()))?;
        entries.push(AuditEntry::new(
            record_id,
            kind,
            old,
            new,
            reason.parse()?,
            timestamp,
        ));
    }
    Ok(entries)
}

pub fn count(conn: &Connection) -> BrainResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM confidence_audit", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n.max(0) as usize)
}
