use serde::{Deserialize, Serialize};

/// Raw heuristic signals computed for a candidate contradiction pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContradictionSignals {
    /// Negation markers present in exactly one of the two texts.
    pub negation_asymmetry: bool,
    /// The numeric token sets differ.
    pub numeric_mismatch: bool,
    pub markers_a: Vec<String>,
    pub markers_b: Vec<String>,
    pub numbers_a: Vec<String>,
    pub numbers_b: Vec<String>,
}

impl ContradictionSignals {
    /// Whether any conflicting signal fired.
    pub fn conflicting(&self) -> bool {
        self.negation_asymmetry || self.numeric_mismatch
    }
}

/// A pair of highly similar records with a conflicting signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionFinding {
    pub a: String,
    pub b: String,
    pub similarity: f64,
    pub signals: ContradictionSignals,
}
