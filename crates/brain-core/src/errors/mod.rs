mod consolidation_error;
mod storage_error;

pub use consolidation_error::ConsolidationError;
pub use storage_error::StorageError;

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum BrainError {
    #[error("invalid value '{value}' in column {field}")]
    InvalidColumn { field: String, value: String },

    #[error("invalid timestamp '{value}' in field {field}")]
    InvalidTimestamp { field: String, value: String },

    #[error("unknown record kind: {name}")]
    UnknownKind { name: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("consolidation error: {0}")]
    ConsolidationError(#[from] ConsolidationError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience alias used across the workspace.
pub type BrainResult<T> = Result<T, BrainError>;

impl BrainError {
    /// True for defects in a single stored row (bad timestamp, mistyped column).
    /// These are recovered locally and never abort a batch.
    pub fn is_input_defect(&self) -> bool {
        matches!(
            self,
            Self::InvalidColumn { .. } | Self::InvalidTimestamp { .. } | Self::UnknownKind { .. }
        )
    }
}
