//! # brain-storage
//!
//! SQLite persistence layer for the three record kinds: connection pool
//! (single writer plus WAL read pool), versioned migrations, kind-keyed
//! table strategies, confidence audit log, consolidation log, stats.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod strategy;

pub use engine::StorageEngine;
pub use strategy::TableStrategy;

use brain_core::errors::{BrainError, StorageError};

/// Wrap a low-level storage failure message.
pub fn to_storage_err(message: String) -> BrainError {
    BrainError::StorageError(StorageError::SqliteError { message })
}
