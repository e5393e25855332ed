//! Span definitions per operation: scoring, lifecycle updates, consolidation
//! planning, execution.

/// Span around a retroactive scoring sweep.
#[macro_export]
macro_rules! scoring_span {
    ($batch_size:expr) => {
        tracing::info_span!("brain.scoring", batch_size = $batch_size)
    };
}

/// Span around one lifecycle update (access or validation feedback).
#[macro_export]
macro_rules! lifecycle_span {
    ($kind:expr, $record_id:expr, $reason:expr) => {
        tracing::debug_span!(
            "brain.lifecycle",
            kind = %$kind,
            record_id = %$record_id,
            reason = %$reason
        )
    };
}

/// Span around a consolidation run.
#[macro_export]
macro_rules! consolidation_span {
    ($run_id:expr, $mode:expr) => {
        tracing::info_span!("brain.consolidation", run_id = %$run_id, mode = ?$mode)
    };
}

/// Span around the transactional execution of a plan.
#[macro_export]
macro_rules! execution_span {
    ($run_id:expr, $action_count:expr) => {
        tracing::info_span!("brain.execution", run_id = %$run_id, actions = $action_count)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SCORING: &str = "brain.scoring";
    pub const LIFECYCLE: &str = "brain.lifecycle";
    pub const CONSOLIDATION: &str = "brain.consolidation";
    pub const EXECUTION: &str = "brain.execution";
}
