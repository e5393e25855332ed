//! # brain-core
//!
//! Foundation crate for the brain confidence and consolidation engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod memory;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::BrainConfig;
pub use errors::{BrainError, BrainResult};
pub use memory::{Confidence, MemoryRecord, RecordKind, LIFECYCLE_DEFAULTS};
