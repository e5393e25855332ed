//! v002: payload columns, lifecycle counters and confidence on every record
//! table, plus the `confidence_audit` table. Columns that already exist are
//! left alone, so bare legacy tables are upgraded in place.

use rusqlite::Connection;

use brain_core::errors::BrainResult;

use super::table_columns;
use crate::strategy::TableStrategy;
use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> BrainResult<()> {
    for strategy in TableStrategy::all() {
        let existing = table_columns(conn, strategy.table)?;
        let wanted = [
            ("categories", "TEXT NOT NULL DEFAULT '[]'".to_string()),
            ("importance", "REAL DEFAULT 1.0".to_string()),
            ("source", "TEXT".to_string()),
            ("embedding", "BLOB".to_string()),
            ("last_accessed", "TEXT".to_string()),
            ("access_count", "INTEGER DEFAULT 1".to_string()),
            ("validation_count", "INTEGER DEFAULT 0".to_string()),
            ("contradiction_count", "INTEGER DEFAULT 0".to_string()),
            (
                "confidence",
                format!("REAL DEFAULT {}", strategy.default_confidence),
            ),
        ];
        for (column, decl) in wanted {
            if existing.iter().any(|c| c == column) {
                tracing::debug!(table = strategy.table, column, "column already present");
                continue;
            }
            conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {column} {decl};",
                strategy.table
            ))
            .map_err(|e| to_storage_err(e.to_string()))?;
        }
        conn.execute_batch(&format!(
            "
            CREATE INDEX IF NOT EXISTS idx_{table}_confidence ON {table}(confidence);
            CREATE INDEX IF NOT EXISTS idx_{table}_source ON {table}(source);
            CREATE INDEX IF NOT EXISTS idx_{table}_created ON {table}(created_at);
            ",
            table = strategy.table
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS confidence_audit (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            record_id       TEXT NOT NULL,
            kind            TEXT NOT NULL,
            old_confidence  REAL NOT NULL,
            new_confidence  REAL NOT NULL,
            reason          TEXT NOT NULL,
            timestamp       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_confidence_audit_record
            ON confidence_audit(kind, record_id);
        CREATE INDEX IF NOT EXISTS idx_confidence_audit_timestamp
            ON confidence_audit(timestamp);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
