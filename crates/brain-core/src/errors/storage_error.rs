/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("table {table} does not exist")]
    TableMissing { table: String },

    #[error("transaction rolled back: {reason}")]
    TransactionAborted { reason: String },
}
