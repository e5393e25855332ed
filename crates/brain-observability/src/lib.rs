//! # brain-observability
//!
//! Tracing subscriber setup and the span macros used by the scoring and
//! consolidation engines.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, init_tracing_with_filter};
