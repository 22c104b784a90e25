//! Error types for chain merging

/// Errors that can occur while merging chain parts
///
/// Every variant is fatal: merging runs during offline menu assembly, so a
/// detected inconsistency aborts the merge with no partial output.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("combined chain name mismatch: expected {expected}, found {found}")]
    NameMismatch { expected: String, found: String },

    #[error("unknown merging strategy: {0}")]
    UnknownStrategy(String),

    #[error("offset {offset} requested for parallel merging, offsets are not supported")]
    OffsetNotSupported { offset: usize },

    #[error("serial merging requires an explicit ordering")]
    MissingSerialOrdering,

    #[error("serial ordering {ordering:?} is not a permutation of the chain positions")]
    InvalidSerialOrdering { ordering: Vec<usize> },

    #[error("{context}: expected {expected} entries, found {found}")]
    CountMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("second alignment group length mismatch in one chain: {group} has lengths {lengths:?}")]
    AmbiguousAlignment { group: String, lengths: Vec<usize> },

    #[error("step {step} has active legs in more than one alignment group: {groups:?}")]
    AmbiguousStepGroups { step: String, groups: Vec<String> },

    #[error("alignment group {0} is not in the ordering table")]
    UnknownAlignmentGroup(String),

    #[error("chain {0} declares no alignment groups")]
    MissingAlignmentGroups(String),

    #[error("step {0} has no leg with a real sequence")]
    NoActiveLeg(String),
}

impl MergeError {
    /// Shorthand for the count-mismatch variant, which is raised from many
    /// call sites.
    pub fn count_mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        MergeError::CountMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

/// Result type alias for merge operations
pub type MergeResult<T> = Result<T, MergeError>;
