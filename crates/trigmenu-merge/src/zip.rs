//! Multiplicity-aware longest zip over chain step lists
//!
//! Rows keep coming until the longest chain is exhausted. An exhausted
//! chain contributes one explicit missing marker carrying its leg width,
//! so every row holds exactly one slot per chain and still accounts one
//! replication unit per leg.

use crate::combiner::StepSlot;
use trigmenu_types::{Chain, ChainStep};

/// Lazy row sequence for a parallel merge; consumed exactly once.
pub(crate) struct ParallelRows<'a> {
    legs: Vec<RowSource<'a>>,
    row: usize,
    n_rows: usize,
}

struct RowSource<'a> {
    steps: &'a [ChainStep],
    /// Leg width, taken from the first step's multiplicity list.
    width: usize,
}

impl<'a> ParallelRows<'a> {
    pub(crate) fn new(chains: &'a [Chain]) -> Self {
        let legs = chains
            .iter()
            .map(|chain| RowSource {
                steps: &chain.steps,
                width: chain
                    .steps
                    .first()
                    .map_or(0, |step| step.multiplicity.len()),
            })
            .collect::<Vec<_>>();
        let n_rows = legs.iter().map(|leg| leg.steps.len()).max().unwrap_or(0);
        Self {
            legs,
            row: 0,
            n_rows,
        }
    }
}

impl<'a> Iterator for ParallelRows<'a> {
    type Item = Vec<StepSlot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.n_rows {
            return None;
        }
        let mut slots = Vec::new();
        for leg in &self.legs {
            match leg.steps.get(self.row) {
                Some(step) => slots.push(StepSlot::Real(step.clone())),
                None => slots.push(StepSlot::Missing {
                    legs: leg.width.max(1),
                }),
            }
        }
        self.row += 1;
        Some(slots)
    }
}
