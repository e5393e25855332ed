pub mod confidence;
pub mod defaults;
pub mod kind;
pub mod record;

pub use confidence::{Confidence, ConfidenceBand};
pub use defaults::{LifecycleDefaults, LIFECYCLE_DEFAULTS};
pub use kind::RecordKind;
pub use record::MemoryRecord;
