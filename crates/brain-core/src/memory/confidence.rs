use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence score clamped to [0.1, 1.0].
///
/// Only the scorer produces new values; everything else reads them.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Lower bound of every confidence value.
    pub const MIN: f64 = 0.1;
    /// Upper bound of every confidence value.
    pub const MAX: f64 = 1.0;
    /// High band: values at or above this are considered reliable.
    pub const HIGH: f64 = 0.8;
    /// Medium band lower bound.
    pub const MEDIUM: f64 = 0.5;
    /// Fallback used when inputs cannot be scored.
    pub const NEUTRAL: f64 = 0.5;

    /// Create a new Confidence, clamping to [0.1, 1.0]. NaN maps to neutral.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::NEUTRAL);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// The neutral fallback value.
    pub fn neutral() -> Self {
        Self(Self::NEUTRAL)
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Distribution band of this value.
    pub fn band(self) -> ConfidenceBand {
        ConfidenceBand::of(self.0)
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

/// The three reporting bands: `>= 0.8`, `[0.5, 0.8)`, `< 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(value: f64) -> Self {
        if value >= Confidence::HIGH {
            Self::High
        } else if value >= Confidence::MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
