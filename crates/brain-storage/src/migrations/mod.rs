//! Versioned schema migrations, tracked in `schema_version`.

pub mod v001_record_tables;
pub mod v002_confidence_columns;
pub mod v003_consolidation_log;

use rusqlite::{params, Connection, OptionalExtension};

use brain_core::errors::{BrainError, BrainResult, StorageError};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> BrainResult<()>;

const MIGRATIONS: [(u32, MigrationFn); 3] = [
    (1, v001_record_tables::migrate),
    (2, v002_confidence_columns::migrate),
    (3, v003_consolidation_log::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the recorded version. Each migration
/// commits together with its version row.
pub fn run_migrations(conn: &Connection) -> BrainResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        apply_one(conn, version, migrate)?;
        tracing::info!(version, "applied schema migration");
        current = version;
    }
    Ok(current)
}

/// Highest applied version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> BrainResult<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?
        .flatten();
    Ok(version.unwrap_or(0))
}

fn apply_one(conn: &Connection, version: u32, migrate: MigrationFn) -> BrainResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("migration v{version:03} begin: {e}")))?;

    let result = migrate(&tx).and_then(|()| {
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![version],
        )
        .map(|_| ())
        .map_err(|e| to_storage_err(e.to_string()))
    });

    match result {
        Ok(()) => tx.commit().map_err(|e| migration_failed(version, e.to_string())),
        Err(e) => {
            let _ = tx.rollback();
            Err(migration_failed(version, e.to_string()))
        }
    }
}

fn migration_failed(version: u32, reason: String) -> BrainError {
    StorageError::MigrationFailed { version, reason }.into()
}

/// Column names of `table`; empty if the table does not exist.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> BrainResult<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
