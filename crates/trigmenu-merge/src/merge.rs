//! Strategy dispatch and auto merging
//!
//! [`merge_chain_defs`] is the entry point the menu-generation tooling
//! calls once per combined chain. Parallel and serial requests go
//! straight to their mergers; auto requests group the parts by leading
//! alignment group, parallel-merge within each group, and serial-merge
//! the group chains in the rank the injected ordering assigns them.

use crate::parallel::merge_parallel;
use crate::serial::merge_serial;
use trigmenu_types::{
    AlignmentOrdering, Chain, LegLengths, MergeError, MergeRequest, MergeResult, MergeStrategy,
};

/// Merge the parts of one combined chain according to its request.
///
/// `chains` holds one entry per part, in chain-name order. `leg_lengths`
/// is the per-part step-count bookkeeping: always present, possibly
/// empty, and one entry per part when non-empty. Padding performed
/// during the merge updates the table in place, so a caller running a
/// second merge round sees the grown lengths.
pub fn merge_chain_defs(
    chains: &[Chain],
    request: &MergeRequest,
    ordering: &AlignmentOrdering,
    leg_lengths: &mut Vec<LegLengths>,
) -> MergeResult<Chain> {
    if chains.is_empty() {
        return Err(MergeError::count_mismatch("chains to merge", 1, 0));
    }
    tracing::debug!(
        chain = %request.chain_name,
        strategy = %request.strategy,
        parts = chains.len(),
        "Merging chain parts"
    );

    match request.strategy {
        MergeStrategy::Parallel => merge_parallel(
            chains,
            request.offset,
            &request.leg_numbering(),
            leg_lengths,
            ordering,
        ),
        MergeStrategy::Serial => {
            let serial = request
                .serial_ordering
                .as_deref()
                .ok_or(MergeError::MissingSerialOrdering)?;
            merge_serial(chains, serial)
        }
        MergeStrategy::Auto => merge_auto(chains, request, ordering, leg_lengths),
    }
}

/// Input positions sharing one leading alignment group, in first-seen
/// group order.
fn group_by_alignment(
    chains: &[Chain],
    ordering: &AlignmentOrdering,
) -> MergeResult<Vec<(String, Vec<usize>)>> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (index, chain) in chains.iter().enumerate() {
        let label = chain
            .alignment_groups
            .first()
            .ok_or_else(|| MergeError::MissingAlignmentGroups(chain.name.clone()))?;
        if !ordering.contains(label) {
            return Err(MergeError::UnknownAlignmentGroup(label.clone()));
        }
        match groups.iter_mut().find(|(group, _)| group == label) {
            Some((_, members)) => members.push(index),
            None => groups.push((label.clone(), vec![index])),
        }
    }
    Ok(groups)
}

/// Compact ordering ranks to a dense `0..K-1` permutation, stable by
/// original rank. Serial merging numbers its positions consecutively,
/// so gaps left by absent groups must close up.
fn compact_ranks(ranks: &[usize]) -> Vec<usize> {
    ranks
        .iter()
        .map(|rank| ranks.iter().filter(|other| *other < rank).count())
        .collect()
}

fn merge_auto(
    chains: &[Chain],
    request: &MergeRequest,
    ordering: &AlignmentOrdering,
    leg_lengths: &mut Vec<LegLengths>,
) -> MergeResult<Chain> {
    if !leg_lengths.is_empty() && leg_lengths.len() != chains.len() {
        return Err(MergeError::count_mismatch(
            "leg length entries vs input chains",
            chains.len(),
            leg_lengths.len(),
        ));
    }

    let groups = group_by_alignment(chains, ordering)?;
    let leg_numbering = request.leg_numbering();

    let mut merged: Vec<Chain> = Vec::with_capacity(groups.len());
    let mut ranks: Vec<usize> = Vec::with_capacity(groups.len());
    for (label, members) in &groups {
        let rank = ordering
            .rank(label)
            .ok_or_else(|| MergeError::UnknownAlignmentGroup(label.clone()))?;
        ranks.push(rank);

        if members.len() > 1 {
            tracing::debug!(group = %label, parts = members.len(), "Parallel merging alignment group");
            let group_chains: Vec<Chain> = members.iter().map(|&i| chains[i].clone()).collect();
            let mut group_lengths: Vec<LegLengths> = members
                .iter()
                .filter_map(|&i| leg_lengths.get(i).cloned())
                .collect();
            let combined = merge_parallel(
                &group_chains,
                request.offset,
                &leg_numbering,
                &mut group_lengths,
                ordering,
            )?;
            for (&i, updated) in members.iter().zip(group_lengths) {
                leg_lengths[i] = updated;
            }
            merged.push(combined);
        } else {
            tracing::debug!(group = %label, "Single part in group, no parallel merge needed");
            merged.push(chains[members[0]].clone());
        }
    }

    if merged.len() == 1 {
        return Ok(merged.remove(0));
    }

    let serial_ordering = compact_ranks(&ranks);
    tracing::debug!(
        groups = merged.len(),
        ordering = ?serial_ordering,
        "Serial merging alignment groups"
    );
    merge_serial(&merged, &serial_ordering)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trigmenu_types::{ChainStep, L1Threshold, MenuSequence, StepDescriptor};

    fn make_ordering() -> AlignmentOrdering {
        AlignmentOrdering::new(["Muon", "Egamma", "JetMET"])
    }

    fn make_part(
        name: &str,
        signature: &str,
        group: &str,
        threshold: &str,
        n_steps: usize,
    ) -> Chain {
        let steps = (1..=n_steps)
            .map(|i| {
                ChainStep::new(
                    format!("Step{i}_{signature}{i}"),
                    vec![MenuSequence::real(format!("{signature}Seq{i}"))],
                    vec![1],
                    vec![StepDescriptor::new(name, signature, group, 1)],
                )
                .unwrap()
            })
            .collect();
        Chain::new(
            name,
            steps,
            vec![L1Threshold::new(threshold)],
            vec![n_steps],
            vec![group.to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_parallel_dispatch_forwards_the_offset() {
        let chain = make_part("HLT_2mu4", "Muon", "Muon", "MU4", 1);
        let request = MergeRequest::new("HLT_2mu4", MergeStrategy::Parallel).with_offset(2);

        let err = merge_chain_defs(
            &[chain.clone(), chain],
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::OffsetNotSupported { offset: 2 }));
    }

    #[test]
    fn test_serial_dispatch_requires_an_ordering() {
        let muon = make_part("HLT_mu6_e5", "Muon", "Muon", "MU8F", 2);
        let electron = make_part("HLT_mu6_e5", "Electron", "Egamma", "EM22VHI", 1);
        let request = MergeRequest::new("HLT_mu6_e5", MergeStrategy::Serial);

        let err = merge_chain_defs(
            &[muon.clone(), electron.clone()],
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::MissingSerialOrdering));

        let request = request.with_serial_ordering(vec![0, 1]);
        let merged = merge_chain_defs(
            &[muon, electron],
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap();
        assert_eq!(merged.steps.len(), 3);
    }

    #[test]
    fn test_auto_merges_groups_then_orders_them() {
        let name = "HLT_3mu6_j45";
        let muons: Vec<Chain> = (0..3).map(|_| make_part(name, "Muon", "Muon", "MU6", 2)).collect();
        let jet = make_part(name, "Jet", "JetMET", "J20", 1);
        let chains = vec![muons[0].clone(), jet, muons[1].clone(), muons[2].clone()];
        let request = MergeRequest::new(name, MergeStrategy::Auto);

        let merged = merge_chain_defs(
            &chains,
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap();

        // two parallel-merged muon rows, then the jet row
        assert_eq!(merged.steps.len(), 3);
        assert_eq!(merged.steps[0].leg_count(), 4);
        for leg in 0..3 {
            assert!(!merged.steps[0].sequences[leg].is_empty_placeholder());
            assert!(merged.steps[2].sequences[leg].is_empty_placeholder());
        }
        assert!(merged.steps[0].sequences[3].is_empty_placeholder());
        assert!(!merged.steps[2].sequences[3].is_empty_placeholder());

        // slots follow the original chain positions within each group,
        // aggregation follows the ordering rank
        assert_eq!(merged.n_steps, vec![2, 2, 2, 1]);
        assert_eq!(
            merged.alignment_groups,
            vec!["Muon", "Muon", "Muon", "JetMET"]
        );
        assert_eq!(
            merged.steps[0].step_descriptors[3].chain_name,
            format!("leg003_{name}")
        );
    }

    #[test]
    fn test_auto_single_group_skips_serial_merge() {
        let name = "HLT_2mu6";
        let first = make_part(name, "Muon", "Muon", "MU6", 2);
        let second = make_part(name, "Muon", "Muon", "MU6", 2);
        let request = MergeRequest::new(name, MergeStrategy::Auto);

        let merged = merge_chain_defs(
            &[first, second],
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(merged.steps.len(), 2);
        assert_eq!(merged.steps[0].leg_count(), 2);
        assert_eq!(merged.alignment_groups, vec!["Muon", "Muon"]);
    }

    #[test]
    fn test_auto_singleton_part_passes_through() {
        let chain = make_part("HLT_mu6", "Muon", "Muon", "MU6", 2);
        let request = MergeRequest::new("HLT_mu6", MergeStrategy::Auto);

        let merged = merge_chain_defs(
            &[chain.clone()],
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap();
        assert_eq!(merged, chain);
    }

    #[test]
    fn test_auto_refuses_unknown_groups() {
        let chain = make_part("HLT_tau25", "Tau", "Tau", "TAU12IM", 1);
        let request = MergeRequest::new("HLT_tau25", MergeStrategy::Auto);

        let err = merge_chain_defs(
            &[chain],
            &request,
            &make_ordering(),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::UnknownAlignmentGroup(group) if group == "Tau"));
    }

    #[test]
    fn test_auto_validates_leg_length_table_size() {
        let muon = make_part("HLT_mu6_e5", "Muon", "Muon", "MU8F", 2);
        let electron = make_part("HLT_mu6_e5", "Electron", "Egamma", "EM22VHI", 1);
        let request = MergeRequest::new("HLT_mu6_e5", MergeStrategy::Auto);
        let mut leg_lengths = vec![LegLengths::new()];

        let err = merge_chain_defs(
            &[muon, electron],
            &request,
            &make_ordering(),
            &mut leg_lengths,
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::CountMismatch { .. }));
    }

    #[test]
    fn test_rank_compaction_is_dense_and_stable() {
        assert_eq!(compact_ranks(&[4, 0, 7]), vec![1, 0, 2]);
        assert_eq!(compact_ranks(&[2]), vec![0]);
        assert_eq!(compact_ranks(&[]), Vec::<usize>::new());
    }
}
