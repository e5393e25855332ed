use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::BrainError;

/// The three lifecycle variants of a stored memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    /// Short-term entry.
    #[serde(rename = "stm")]
    ShortTerm,
    /// Embedded long-term entry.
    #[serde(rename = "embedding")]
    Embedded,
    /// Atomic causal fact.
    #[serde(rename = "atom")]
    Atom,
}

impl RecordKind {
    /// All kinds, in sweep order.
    pub const ALL: [RecordKind; 3] = [Self::ShortTerm, Self::Embedded, Self::Atom];

    /// Stable short name used in audit rows and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortTerm => "stm",
            Self::Embedded => "embedding",
            Self::Atom => "atom",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = BrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stm" => Ok(Self::ShortTerm),
            "embedding" => Ok(Self::Embedded),
            "atom" => Ok(Self::Atom),
            other => Err(BrainError::UnknownKind {
                name: other.to_string(),
            }),
        }
    }
}
