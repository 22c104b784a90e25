//! Chain-Step Merging Engine
//!
//! Combines N independently built single-leg trigger chains into one
//! multi-leg chain with a globally consistent step ordering. Shorter legs
//! are padded with synthesized Empty placeholder steps so every merged
//! step carries one slot per leg.
//!
//! # Architecture
//!
//! The entry point [`merge_chain_defs`] dispatches on the declared
//! strategy and composes the building blocks:
//!
//! - [`parallel::merge_parallel`]: legs run concurrently at the same
//!   logical steps; rows come from a multiplicity-aware longest zip.
//! - [`serial::merge_serial`]: legs run one after another in a declared
//!   order; every row is one real step plus placeholders for the rest.
//! - [`combiner::make_combined_step`]: merges one row of step slots into
//!   a single output step, renaming per-leg descriptors on the way.
//! - [`empty_steps::build_empty_sequences`]: synthesizes the placeholder
//!   sequences and multiplicities a padded leg needs.
//!
//! The auto strategy groups inputs by their leading alignment group,
//! parallel-merges within a group, and serial-merges the groups in the
//! injected [`AlignmentOrdering`](trigmenu_types::AlignmentOrdering) rank.
//!
//! Merging is pure and deterministic: inputs are never mutated and
//! identical inputs produce identical chains, placeholder names included.
//!
//! # Example
//!
//! ```rust
//! use trigmenu_merge::merge_chain_defs;
//! use trigmenu_types::*;
//!
//! fn leg(signature: &str, group: &str, seed: &str, n_steps: usize) -> Chain {
//!     let steps = (1..=n_steps)
//!         .map(|i| {
//!             ChainStep::new(
//!                 format!("Step{i}_{signature}"),
//!                 vec![MenuSequence::real(format!("{signature}Seq{i}"))],
//!                 vec![1],
//!                 vec![StepDescriptor::new("HLT_mu6_e5", signature, group, 1)],
//!             )
//!             .unwrap()
//!         })
//!         .collect();
//!     Chain::new(
//!         "HLT_mu6_e5",
//!         steps,
//!         vec![L1Threshold::new(seed)],
//!         vec![n_steps],
//!         vec![group.to_string()],
//!     )
//!     .unwrap()
//! }
//!
//! let muon = leg("Muon", "Muon", "MU8F", 2);
//! let electron = leg("Electron", "Egamma", "EM22VHI", 1);
//!
//! let ordering = AlignmentOrdering::new(["Muon", "Egamma"]);
//! let request = MergeRequest::new("HLT_mu6_e5", MergeStrategy::Auto);
//! let mut leg_lengths = Vec::new();
//!
//! let merged = merge_chain_defs(&[muon, electron], &request, &ordering, &mut leg_lengths).unwrap();
//!
//! // two muon rows, then the electron row, each with one slot per leg
//! assert_eq!(merged.steps.len(), 3);
//! assert_eq!(merged.steps[0].leg_count(), 2);
//! ```

#![deny(unsafe_code)]

pub mod combiner;
pub mod empty_steps;
pub mod merge;
pub mod naming;
pub mod parallel;
pub mod serial;
pub mod zip;

// Re-export main entry points
pub use combiner::{make_combined_step, StepSlot};
pub use merge::merge_chain_defs;
pub use parallel::merge_parallel;
pub use serial::merge_serial;
