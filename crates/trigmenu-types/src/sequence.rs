//! Menu sequences and L1 thresholds
//!
//! A step runs one sequence per active leg. Real sequences are configured
//! far upstream and are opaque here; merging only ever copies them or
//! replaces them with synthesized Empty placeholders.

use serde::{Deserialize, Serialize};

// ── Sequences ────────────────────────────────────────────────────────

/// Handle to an upstream reconstruction sequence
///
/// The merge engine never looks inside a real sequence; it carries the
/// handle through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoSequenceRef {
    pub name: String,
}

impl RecoSequenceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for RecoSequenceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A synthesized placeholder sequence
///
/// Inserted where a leg has nothing to run at a step. The full-scan
/// variant is selected when the leg is seeded by a whole-detector
/// region of interest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptySequence {
    pub name: String,
    pub full_scan: bool,
}

impl EmptySequence {
    pub fn new(name: impl Into<String>, full_scan: bool) -> Self {
        Self {
            name: name.into(),
            full_scan,
        }
    }
}

/// One sequence slot of a chain step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuSequence {
    Real(RecoSequenceRef),
    Empty(EmptySequence),
}

impl MenuSequence {
    pub fn real(name: impl Into<String>) -> Self {
        MenuSequence::Real(RecoSequenceRef::new(name))
    }

    pub fn empty(name: impl Into<String>, full_scan: bool) -> Self {
        MenuSequence::Empty(EmptySequence::new(name, full_scan))
    }

    pub fn name(&self) -> &str {
        match self {
            MenuSequence::Real(seq) => &seq.name,
            MenuSequence::Empty(seq) => &seq.name,
        }
    }

    /// True for synthesized placeholder sequences.
    pub fn is_empty_placeholder(&self) -> bool {
        matches!(self, MenuSequence::Empty(_))
    }
}

// ── L1 thresholds ────────────────────────────────────────────────────

/// The L1 threshold seeding one leg
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct L1Threshold(pub String);

impl L1Threshold {
    pub fn new(threshold: impl Into<String>) -> Self {
        Self(threshold.into())
    }

    /// Whether this threshold seeds a whole-detector region of interest.
    ///
    /// Covers the unseeded class (`FSNOSEED`), energy-sum seeds
    /// (missing energy `XE`, total energy `TE` — both decode to the
    /// single MET decision collection) and jet seeds (`J`/`j`).
    pub fn is_full_scan(&self) -> bool {
        let t = self.0.as_str();
        t == "FSNOSEED"
            || t.starts_with("XE")
            || t.starts_with("TE")
            || t.starts_with('J')
            || t.starts_with('j')
    }
}

impl std::fmt::Display for L1Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
