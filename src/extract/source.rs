//! Source probes for the mutually exclusive input variants.
//!
//! Relationship and query sources come in several dialects with a defined
//! fallback order. Each probe reports whether its source was absent,
//! present but empty, or populated, so the fallback policy is explicit:
//! fallback triggers whenever a probe is not populated, regardless of
//! whether the file was missing or merely empty.

/// Outcome of probing one input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    /// The source file or directory does not exist.
    Absent,
    /// The source exists but yielded no records.
    Empty,
    /// The source yielded at least one record.
    Populated(Vec<T>),
}

impl<T> ProbeOutcome<T> {
    /// Wrap a record list, mapping an empty list to `Empty`.
    pub fn from_records(records: Vec<T>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Populated(records)
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated(_))
    }

    /// The records, empty for `Absent` and `Empty`.
    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Populated(records) => records,
            Self::Absent | Self::Empty => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_records_are_not_populated() {
        let outcome = ProbeOutcome::<i32>::from_records(vec![]);
        assert_eq!(outcome, ProbeOutcome::Empty);
        assert!(!outcome.is_populated());
    }

    #[test]
    fn test_populated_round_trips() {
        let outcome = ProbeOutcome::from_records(vec![1, 2]);
        assert!(outcome.is_populated());
        assert_eq!(outcome.into_records(), vec![1, 2]);
    }
}
