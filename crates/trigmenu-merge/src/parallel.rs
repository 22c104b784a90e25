//! Parallel chain merging
//!
//! Parallel merging interleaves chains that run concurrently: row N of
//! the combined chain holds one slot per input, its step N or a marker
//! padded across every one of its legs. Inputs are cloned up front, the
//! caller's chains are never modified.

use crate::combiner::{make_combined_step, StepSlot};
use crate::empty_steps::build_empty_sequences;
use crate::naming;
use crate::zip::ParallelRows;
use trigmenu_types::{
    AlignmentOrdering, Chain, ChainStep, L1Threshold, LegLengths, MergeError, MergeResult,
};

/// Scan the leg-length tables for an alignment group whose declared
/// segment lengths disagree.
///
/// One disagreeing group is returned with its maximum length, to be
/// resolved by padding. A second independent mismatch cannot be
/// resolved automatically and is refused.
pub(crate) fn check_leg_lengths(
    leg_lengths: &[LegLengths],
) -> MergeResult<Option<(String, usize)>> {
    let mut by_group: Vec<(String, Vec<usize>)> = Vec::new();
    for table in leg_lengths {
        for leg in table.iter() {
            match by_group.iter_mut().find(|(group, _)| *group == leg.group) {
                Some((_, lengths)) => lengths.push(leg.length),
                None => by_group.push((leg.group.clone(), vec![leg.length])),
            }
        }
    }

    let mut mismatch: Option<(String, usize)> = None;
    for (group, lengths) in by_group {
        if lengths.iter().any(|length| *length != lengths[0]) {
            if mismatch.is_some() {
                return Err(MergeError::AmbiguousAlignment { group, lengths });
            }
            let max = lengths.iter().copied().max().unwrap_or(0);
            mismatch = Some((group, max));
        }
    }
    Ok(mismatch)
}

/// Append placeholder steps to one group segment of an already merged
/// chain until it reaches `max_length`, updating the chain's leg-length
/// entry in place.
///
/// The inserted steps reuse the descriptors of the segment's last step,
/// so the lengthened leg keeps its expected counts.
fn lengthen_group_segment(
    chain: &mut Chain,
    lengths: &mut LegLengths,
    group: &str,
    max_length: usize,
) -> MergeResult<()> {
    let (leg_index, current) = match lengths.first_in_group(group) {
        Some(found) => found,
        None => {
            tracing::debug!(chain = %chain.name, group = %group, "No leg in the mismatched group, nothing to lengthen");
            return Ok(());
        }
    };
    if current < 1 || current > chain.steps.len() {
        return Err(MergeError::count_mismatch(
            format!("chain {} declared {group} segment vs steps", chain.name),
            chain.steps.len(),
            current,
        ));
    }

    let descriptors = chain.steps[current - 1].step_descriptors.clone();
    let full_scan = chain.full_scan_flags();
    for i in 1..=max_length - current {
        let step_number = current + i;
        let signatures: Vec<String> = descriptors
            .iter()
            .enumerate()
            .map(|(leg, descriptor)| {
                if chain.is_full_scan_leg(leg) {
                    format!("{}FS", descriptor.signature)
                } else {
                    descriptor.signature.clone()
                }
            })
            .collect();
        let step_name = naming::empty_step_name(group, step_number, &signatures);
        let sequence_names: Vec<String> = descriptors
            .iter()
            .map(|descriptor| naming::empty_sequence_name(&descriptor.signature, step_number, group))
            .collect();
        let (sequences, multiplicities) =
            build_empty_sequences(&descriptors, &full_scan, &sequence_names, &chain.name)?;
        let step =
            ChainStep::empty_step(step_name, sequences, multiplicities, descriptors.clone())?;
        chain.steps.insert(current + i - 1, step);
    }

    lengths.legs[leg_index].length = max_length;
    tracing::debug!(
        chain = %chain.name,
        group = %group,
        length = max_length,
        "Lengthened alignment segment"
    );
    Ok(())
}

/// One alignment-group label per output row.
///
/// Without leg-length bookkeeping every row carries the single shared
/// group. Otherwise the labels walk the groups in ordering rank order,
/// each repeated for its maximum declared segment length, so rows of a
/// lengthened chain stay attached to the group they belong to.
fn vertical_labels(
    chain_name: &str,
    alignment_groups: &[String],
    leg_lengths: &[LegLengths],
    ordering: &AlignmentOrdering,
    n_rows: usize,
) -> MergeResult<Vec<String>> {
    if leg_lengths.is_empty() {
        if n_rows == 0 {
            return Ok(Vec::new());
        }
        let group = alignment_groups
            .first()
            .ok_or_else(|| MergeError::MissingAlignmentGroups(chain_name.to_string()))?;
        return Ok(vec![group.clone(); n_rows]);
    }

    for table in leg_lengths {
        for leg in table.iter() {
            if !ordering.contains(&leg.group) {
                return Err(MergeError::UnknownAlignmentGroup(leg.group.clone()));
            }
        }
    }

    let mut labels = Vec::with_capacity(n_rows);
    for group in ordering.labels() {
        let max_length = leg_lengths
            .iter()
            .flat_map(LegLengths::iter)
            .filter(|leg| leg.group == *group)
            .map(|leg| leg.length)
            .max();
        if let Some(length) = max_length {
            labels.extend(std::iter::repeat(group.clone()).take(length));
        }
    }
    Ok(labels)
}

/// Merge chains that run concurrently as independent legs.
///
/// All inputs must share one chain name and declare no offset. When the
/// caller tracks per-group segment lengths, `leg_lengths` carries one
/// entry per input and lengthened entries are updated in place for the
/// next merge round.
pub fn merge_parallel(
    chains: &[Chain],
    offset: Option<usize>,
    leg_numbering: &[usize],
    leg_lengths: &mut Vec<LegLengths>,
    ordering: &AlignmentOrdering,
) -> MergeResult<Chain> {
    if let Some(offset) = offset {
        return Err(MergeError::OffsetNotSupported { offset });
    }
    if chains.is_empty() {
        return Err(MergeError::count_mismatch("chains to merge in parallel", 1, 0));
    }
    if !leg_lengths.is_empty() && leg_lengths.len() != chains.len() {
        return Err(MergeError::count_mismatch(
            "leg length entries vs input chains",
            chains.len(),
            leg_lengths.len(),
        ));
    }

    let mut padded: Vec<Chain> = chains.to_vec();
    let mut chain_name = String::new();
    let mut thresholds: Vec<L1Threshold> = Vec::new();
    let mut n_steps: Vec<usize> = Vec::new();
    let mut alignment_groups: Vec<String> = Vec::new();

    for (index, chain) in padded.iter_mut().enumerate() {
        if chain_name.is_empty() {
            chain_name = chain.name.clone();
        } else if chain_name != chain.name {
            return Err(MergeError::NameMismatch {
                expected: chain_name,
                found: chain.name.clone(),
            });
        }

        if let Some(first) = chain.alignment_groups.first().cloned() {
            if chain.alignment_groups.iter().all(|group| *group == first) {
                alignment_groups.push(first);
            } else if let Some((group, max_length)) = check_leg_lengths(leg_lengths)? {
                // an already merged chain with several groups: lengthen the
                // short segment so the longer leg does not spill into the
                // next group's rows when zipped
                if let Some(lengths) = leg_lengths.get_mut(index) {
                    lengthen_group_segment(chain, lengths, &group, max_length)?;
                }
            }
        } else {
            tracing::info!(chain = %chain.name, "Alignment groups are empty for this combined chain");
        }

        n_steps.push(chain.steps.len());
        thresholds.extend(chain.l1_thresholds.iter().cloned());
    }

    let rows: Vec<Vec<StepSlot>> = ParallelRows::new(&padded).collect();
    let labels = vertical_labels(&chain_name, &alignment_groups, leg_lengths, ordering, rows.len())?;
    if labels.len() != rows.len() {
        return Err(MergeError::count_mismatch(
            format!("chain {chain_name} vertical labels vs combined rows"),
            rows.len(),
            labels.len(),
        ));
    }

    let mut combined: Vec<ChainStep> = Vec::with_capacity(rows.len());
    for (row_index, (row, label)) in rows.into_iter().zip(&labels).enumerate() {
        let step = make_combined_step(
            row,
            row_index + 1,
            &padded,
            &combined,
            leg_numbering,
            Some(label.as_str()),
        )?;
        combined.push(step);
    }

    let merged = Chain::new(chain_name, combined, thresholds, n_steps, alignment_groups)?;
    tracing::debug!(chain = %merged.name, rows = merged.steps.len(), "Parallel merged chain");
    Ok(merged)
}
