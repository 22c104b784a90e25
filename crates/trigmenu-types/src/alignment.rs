//! Alignment-group ordering and leg-length bookkeeping
//!
//! The relative execution order of different legs' reconstruction is
//! decided by an alignment-group ordering built once per menu assembly
//! and passed into every merge call. Alongside it travels a per-chain
//! table of how many steps each leg occupies per group, which a second
//! merge round needs to pad an already-merged chain correctly.

use serde::{Deserialize, Serialize};

// ── Alignment ordering ───────────────────────────────────────────────

/// Total order over alignment-group labels
///
/// Rank 0 runs first. The ordering is a plain value passed into merge
/// calls; nothing here is global.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOrdering {
    labels: Vec<String>,
}

impl AlignmentOrdering {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Rank of a label, lower runs earlier.
    pub fn rank(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.rank(label).is_some()
    }

    /// Labels in rank order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

// ── Leg lengths ──────────────────────────────────────────────────────

/// Steps occupied by one leg segment of a chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLength {
    pub group: String,
    pub length: usize,
}

impl GroupLength {
    pub fn new(group: impl Into<String>, length: usize) -> Self {
        Self {
            group: group.into(),
            length,
        }
    }
}

/// Per-leg step counts for one chain, keyed by alignment group
///
/// One table entry exists per input chain of a merge; an empty table
/// means no bookkeeping was requested. Padding during a parallel merge
/// updates the lengthened entry in place so a later merge round sees
/// the new lengths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegLengths {
    pub legs: Vec<GroupLength>,
}

impl LegLengths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: impl Into<String>, length: usize) {
        self.legs.push(GroupLength::new(group, length));
    }

    /// Position and length of the first leg in the given group.
    pub fn first_in_group(&self, group: &str) -> Option<(usize, usize)> {
        self.legs
            .iter()
            .position(|leg| leg.group == group)
            .map(|idx| (idx, self.legs[idx].length))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupLength> {
        self.legs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
