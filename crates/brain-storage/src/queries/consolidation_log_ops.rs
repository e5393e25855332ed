//! Append-only log of applied consolidation actions.

use rusqlite::{params, Connection};

use brain_core::errors::BrainResult;
use brain_core::models::ConsolidationLogEntry;

use crate::to_storage_err;

pub fn append(conn: &Connection, entry: &ConsolidationLogEntry) -> BrainResult<()> {
    let target_ids =
        serde_json::to_string(&entry.target_ids).map_err(|e| to_storage_err(e.to_string()))?;
    conn.execute(
        "INSERT INTO consolidation_log (run_id, action_type, rule_id, target_ids, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.run_id,
            entry.action_type.as_str(),
            entry.rule_id.as_str(),
            target_ids,
            entry.timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// `(action_type, target_ids)` rows for one run, in insertion order.
pub fn entries_for_run(conn: &Connection, run_id: &str) -> BrainResult<Vec<(String, Vec<String>)>> {
    let mut stmt = conn
        .prepare("SELECT action_type, target_ids FROM consolidation_log WHERE run_id = ?1 ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut entries = Vec::new();
    for row in rows {
        let (action_type, raw_ids) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let ids: Vec<String> = serde_json::from_str(&raw_ids)?;
        entries.push((action_type, ids));
    }
    Ok(entries)
}
