//! SQL operations, one module per concern.

pub mod audit_ops;
pub mod consolidation_log_ops;
pub mod record_ops;
pub mod stats_ops;
