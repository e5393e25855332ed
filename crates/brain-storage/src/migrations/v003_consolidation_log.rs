//! v003: consolidation_log, one row per applied consolidation action.

use rusqlite::Connection;

use brain_core::errors::BrainResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> BrainResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS consolidation_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id      TEXT NOT NULL,
            action_type TEXT NOT NULL,
            rule_id     TEXT NOT NULL,
            target_ids  TEXT NOT NULL,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_consolidation_log_run ON consolidation_log(run_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
