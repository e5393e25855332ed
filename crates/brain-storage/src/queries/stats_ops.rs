//! Confidence distribution per record kind.

use rusqlite::Connection;

use brain_core::errors::BrainResult;
use brain_core::memory::{Confidence, RecordKind};
use brain_core::models::{ConfidenceStats, KindStats};

use super::record_ops::table_exists;
use crate::migrations::table_columns;
use crate::strategy::TableStrategy;
use crate::to_storage_err;

pub fn confidence_stats(conn: &Connection) -> BrainResult<ConfidenceStats> {
    let mut stats = ConfidenceStats::new();
    for kind in RecordKind::ALL {
        stats.insert(kind, kind_stats(conn, kind)?);
    }
    Ok(stats)
}

/// Zeroed when the table or its `confidence` column is absent.
pub fn kind_stats(conn: &Connection, kind: RecordKind) -> BrainResult<KindStats> {
    let table = TableStrategy::for_kind(kind).table;
    if !table_exists(conn, table)? {
        tracing::debug!(table, "stats: table missing");
        return Ok(KindStats::zeroed());
    }
    if !table_columns(conn, table)?.iter().any(|c| c == "confidence") {
        tracing::debug!(table, "stats: confidence column missing");
        return Ok(KindStats::zeroed());
    }

    let sql = format!(
        "SELECT COUNT(*),
                AVG(COALESCE(confidence, {neutral})),
                SUM(CASE WHEN COALESCE(confidence, {neutral}) >= {high} THEN 1 ELSE 0 END),
                SUM(CASE WHEN COALESCE(confidence, {neutral}) >= {medium}
                          AND COALESCE(confidence, {neutral}) < {high} THEN 1 ELSE 0 END),
                SUM(CASE WHEN COALESCE(confidence, {neutral}) < {medium} THEN 1 ELSE 0 END)
         FROM {table}",
        neutral = Confidence::NEUTRAL,
        high = Confidence::HIGH,
        medium = Confidence::MEDIUM,
    );
    conn.query_row(&sql, [], |row| {
        let total: i64 = row.get(0)?;
        let average: Option<f64> = row.get(1)?;
        let high: Option<i64> = row.get(2)?;
        let medium: Option<i64> = row.get(3)?;
        let low: Option<i64> = row.get(4)?;
        Ok(KindStats {
            total: total.max(0) as usize,
            average_confidence: round3(average.unwrap_or(Confidence::NEUTRAL)),
            high_confidence: high.unwrap_or(0).max(0) as usize,
            medium_confidence: medium.unwrap_or(0).max(0) as usize,
            low_confidence: low.unwrap_or(0).max(0) as usize,
        })
    })
    .map_err(|e| to_storage_err(e.to_string()))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
