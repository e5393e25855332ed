/// Errors raised by the consolidation planner and executor.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("consolidation already in progress")]
    AlreadyRunning,

    #[error("execution failed for run {run_id}: {reason}")]
    ExecutionFailed { run_id: String, reason: String },

    #[error("could not write report to {path}: {reason}")]
    ReportWriteFailed { path: String, reason: String },
}
