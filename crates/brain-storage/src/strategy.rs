//! Kind-keyed table strategies. Every SQL statement that names a record table
//! gets the name from here, never from caller-supplied strings.

use brain_core::memory::RecordKind;

/// Static description of the table backing one record kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStrategy {
    pub kind: RecordKind,
    pub table: &'static str,
    /// Column default for `confidence` on rows that predate scoring.
    pub default_confidence: f64,
}

const SHORT_TERM: TableStrategy = TableStrategy {
    kind: RecordKind::ShortTerm,
    table: "stm_entries",
    default_confidence: 0.5,
};

const EMBEDDED: TableStrategy = TableStrategy {
    kind: RecordKind::Embedded,
    table: "embeddings",
    default_confidence: 0.5,
};

// Atoms start slightly above neutral: they are extracted facts, not raw notes.
const ATOM: TableStrategy = TableStrategy {
    kind: RecordKind::Atom,
    table: "atoms",
    default_confidence: 0.6,
};

impl TableStrategy {
    pub fn for_kind(kind: RecordKind) -> &'static TableStrategy {
        match kind {
            RecordKind::ShortTerm => &SHORT_TERM,
            RecordKind::Embedded => &EMBEDDED,
            RecordKind::Atom => &ATOM,
        }
    }

    pub fn all() -> [&'static TableStrategy; 3] {
        RecordKind::ALL.map(Self::for_kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_table() {
        let tables: Vec<_> = TableStrategy::all().iter().map(|s| s.table).collect();
        assert_eq!(tables, vec!["stm_entries", "embeddings", "atoms"]);
    }

    #[test]
    fn strategy_kind_round_trips() {
        for kind in RecordKind::ALL {
            assert_eq!(TableStrategy::for_kind(kind).kind, kind);
        }
    }
}
