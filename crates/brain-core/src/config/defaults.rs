// Confidence scoring.
pub const DEFAULT_AGE_DECAY_PER_DAY: f64 = 0.01;
pub const DEFAULT_MIN_AGE_FACTOR: f64 = 0.1;
pub const DEFAULT_ACCESS_BOOST: f64 = 0.05;
pub const DEFAULT_MAX_ACCESS_BOOST: f64 = 0.5;
pub const DEFAULT_ACCESS_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_VALIDATION_BONUS: f64 = 0.2;
pub const DEFAULT_CONTRADICTION_PENALTY: f64 = 0.3;
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.01;
pub const DEFAULT_SCORING_BATCH_SIZE: usize = 1000;

// Consolidation.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.95;
pub const DEFAULT_CONTRADICTION_THRESHOLD: f64 = 0.9;
pub const DEFAULT_PROMOTE_MIN_ACCESS: u64 = 5;
pub const DEFAULT_PROMOTE_MIN_IMPORTANCE: f64 = 2.0;
pub const DEFAULT_PROMOTE_STEP: f64 = 0.5;
pub const DEFAULT_MAX_IMPORTANCE: f64 = 3.0;
pub const DEFAULT_ARCHIVE_MIN_AGE_DAYS: i64 = 30;
pub const DEFAULT_ARCHIVE_MAX_IMPORTANCE: f64 = 1.5;
pub const DEFAULT_PROCEDURAL_CATEGORIES: [&str; 4] = ["sop", "procedure", "coding", "trading"];

// Storage.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

// Logging.
pub const DEFAULT_LOG_FILTER: &str = "info";
