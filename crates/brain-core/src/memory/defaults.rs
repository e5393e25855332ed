/// Values substituted for missing or NULL lifecycle fields.
///
/// Every loader (SQL `COALESCE` parameters and in-memory construction alike)
/// reads from [`LIFECYCLE_DEFAULTS`] instead of repeating literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleDefaults {
    pub access_count: u64,
    pub validation_count: u64,
    pub contradiction_count: u64,
    pub confidence: f64,
    pub importance: f64,
}

pub const LIFECYCLE_DEFAULTS: LifecycleDefaults = LifecycleDefaults {
    access_count: 1,
    validation_count: 0,
    contradiction_count: 0,
    confidence: 0.5,
    importance: 1.0,
};

impl Default for LifecycleDefaults {
    fn default() -> Self {
        LIFECYCLE_DEFAULTS
    }
}
