//! Trigger Menu Domain Types
//!
//! A trigger chain is built once per physics object ("leg") and later
//! combined with the other legs of the same menu entry into one multi-leg
//! chain. The types here describe chains at exactly that boundary: the
//! step lists, per-leg metadata, and the bookkeeping a merge needs.
//!
//! # Key Concepts
//!
//! - **Chain**: an ordered list of [`ChainStep`]s plus per-leg thresholds,
//!   per-part step counts, and per-part alignment-group labels.
//! - **ChainStep**: one step of a chain. Per active leg it carries a
//!   [`MenuSequence`], a [`StepDescriptor`], and a multiplicity entry.
//! - **MenuSequence**: either a real reconstruction sequence (opaque at
//!   this level) or a synthesized Empty placeholder.
//! - **StepDescriptor**: per-leg metadata for one step. The chain name
//!   inside it is rewritten to a `legNNN_` label when legs are merged.
//! - **AlignmentOrdering**: the externally supplied total order over
//!   alignment-group labels, injected into every merge call.
//! - **LegLengths**: per-leg step counts by alignment group, threaded
//!   through merges so a second merge round can pad correctly.
//!
//! # Design Principles
//!
//! 1. Inputs are never mutated. Renaming a descriptor constructs a new
//!    record; merges clone before padding.
//! 2. Everything is deterministic. No clocks, no generated identifiers,
//!    no hash-ordering in anything that reaches an output.
//! 3. Counts are validated at construction. A step whose multiplicity and
//!    descriptor lists disagree is refused, not repaired.

#![deny(unsafe_code)]

mod alignment;
mod chain;
mod descriptor;
mod errors;
mod sequence;
mod strategy;

pub use alignment::*;
pub use chain::*;
pub use descriptor::*;
pub use errors::*;
pub use sequence::*;
pub use strategy::*;
