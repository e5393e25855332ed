//! v001: the three record tables in their pre-scoring shape. Tables that
//! already exist keep whatever shape they have; v002 fills in missing columns.

use rusqlite::Connection;

use brain_core::errors::BrainResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> BrainResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS stm_entries (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            categories  TEXT NOT NULL DEFAULT '[]',
            importance  REAL DEFAULT 1.0,
            source      TEXT,
            embedding   BLOB
        );

        CREATE TABLE IF NOT EXISTS embeddings (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            categories  TEXT NOT NULL DEFAULT '[]',
            importance  REAL DEFAULT 1.0,
            source      TEXT,
            embedding   BLOB
        );

        CREATE TABLE IF NOT EXISTS atoms (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            categories  TEXT NOT NULL DEFAULT '[]',
            importance  REAL DEFAULT 1.0,
            source      TEXT,
            embedding   BLOB
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
