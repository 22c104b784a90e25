//! Serial chain merging
//!
//! Serial merging sequences chains that run one after another: a part
//! only starts once the parts before it in the serial ordering have
//! emitted all their steps. Every output row carries exactly one part's
//! real step; the other slots hold synthesized placeholder steps that
//! keep those legs' bookkeeping alive. Row slots stay in the chains'
//! original order, so leg numbering follows the chain name rather than
//! execution order.

use crate::combiner::{make_combined_step, StepSlot};
use crate::empty_steps::build_empty_sequences;
use crate::naming;
use trigmenu_types::{Chain, ChainStep, L1Threshold, MergeError, MergeResult};

/// Alignment group of the legs running a real sequence in this step.
///
/// A step interleaved into a serial merge must have all its active legs
/// in one group; none or several is an error.
pub(crate) fn current_alignment_group(step: &ChainStep) -> MergeResult<String> {
    let mut active: Vec<String> = Vec::new();
    for (index, sequence) in step.sequences.iter().enumerate() {
        if sequence.is_empty_placeholder() {
            continue;
        }
        let descriptor = step.step_descriptors.get(index).ok_or_else(|| {
            MergeError::count_mismatch(
                format!("step {} sequences vs descriptors", step.name),
                step.sequences.len(),
                step.step_descriptors.len(),
            )
        })?;
        if !active.contains(&descriptor.alignment_group) {
            active.push(descriptor.alignment_group.clone());
        }
    }
    match active.len() {
        0 => Err(MergeError::NoActiveLeg(step.name.clone())),
        1 => Ok(active.remove(0)),
        _ => Err(MergeError::AmbiguousStepGroups {
            step: step.name.clone(),
            groups: active,
        }),
    }
}

/// Lay every part's steps into rows, one row per step.
///
/// `parts` are the chains in serial execution order and `placements[k]`
/// is part k's slot in each row (its original chain position). The part
/// owning a row contributes its real step; every other slot is filled
/// with a placeholder built from that part's nearest step, its last if
/// it already ran, its first if it has yet to run.
fn serial_zip(parts: &[&Chain], placements: &[usize]) -> MergeResult<Vec<Vec<StepSlot>>> {
    let n_slots = parts.len();
    let widths: Vec<usize> = parts
        .iter()
        .map(|part| part.steps.first().map_or(0, |step| step.multiplicity.len()))
        .collect();
    let mut rows: Vec<Vec<StepSlot>> = Vec::new();

    for (part_index, (part, &placement)) in parts.iter().zip(placements).enumerate() {
        let mut previous_group = String::new();
        let mut previous_count = 0usize;

        for (step_index, step) in part.steps.iter().enumerate() {
            if step_index == 0 {
                previous_group = current_alignment_group(step)?;
                previous_count = 0;
            }

            let mut row: Vec<Option<ChainStep>> = vec![None; n_slots];
            row[placement] = Some(step.clone());

            for (other_index, (&other_placement, &width)) in
                placements.iter().zip(&widths).enumerate()
            {
                if row[other_placement].is_some() {
                    continue;
                }
                let other = parts[other_index];
                let donor = if other_index < part_index {
                    other.steps.last()
                } else {
                    other.steps.first()
                };
                let donor = donor.ok_or_else(|| {
                    MergeError::count_mismatch(
                        format!("chain {} steps to borrow from", other.name),
                        1,
                        0,
                    )
                })?;
                let descriptors = donor.step_descriptors.clone();

                let signatures: Vec<String> = descriptors
                    .iter()
                    .zip(other.full_scan_flags())
                    .map(|(descriptor, full_scan)| {
                        if full_scan {
                            format!("{}FS", descriptor.signature)
                        } else {
                            descriptor.signature.clone()
                        }
                    })
                    .collect();

                // group and step index the placeholder is named under: a
                // single-group emitter counts its own steps, a multi-group
                // emitter tracks the group currently running and restarts
                // the count on every group change
                let uniform = part
                    .alignment_groups
                    .first()
                    .filter(|first| part.alignment_groups.iter().all(|group| group == *first));
                let (group, group_step) = match uniform {
                    Some(first) => (first.clone(), step_index + 1),
                    None => {
                        let current = current_alignment_group(step)?;
                        if current == previous_group {
                            previous_count += 1;
                        } else {
                            previous_group = current.clone();
                            previous_count = 1;
                        }
                        (current, previous_count)
                    }
                };

                let step_name = naming::empty_step_name(&group, group_step, &signatures);
                let sequence_names = (0..width)
                    .map(|leg| {
                        descriptors.get(leg).map(|descriptor| {
                            naming::empty_sequence_name(&descriptor.signature, group_step, &group)
                        })
                    })
                    .collect::<Option<Vec<String>>>()
                    .ok_or_else(|| {
                        MergeError::count_mismatch(
                            format!("chain {} placeholder legs vs donor descriptors", other.name),
                            width,
                            descriptors.len(),
                        )
                    })?;

                let (sequences, multiplicities) = build_empty_sequences(
                    &descriptors,
                    &other.full_scan_flags(),
                    &sequence_names,
                    &part.name,
                )?;
                let placeholder =
                    ChainStep::empty_step(step_name, sequences, multiplicities, descriptors)?;
                row[other_placement] = Some(placeholder);
            }

            rows.push(
                row.into_iter()
                    .map(|slot| match slot {
                        Some(step) => StepSlot::Real(step),
                        None => StepSlot::Missing { legs: 1 },
                    })
                    .collect(),
            );
        }
    }
    Ok(rows)
}

/// Original position of the part at each serial position.
fn invert_ordering(n: usize, ordering: &[usize]) -> MergeResult<Vec<usize>> {
    if ordering.len() != n {
        return Err(MergeError::InvalidSerialOrdering {
            ordering: ordering.to_vec(),
        });
    }
    let mut inverse: Vec<Option<usize>> = vec![None; n];
    for (original, &position) in ordering.iter().enumerate() {
        if position >= n || inverse[position].is_some() {
            return Err(MergeError::InvalidSerialOrdering {
                ordering: ordering.to_vec(),
            });
        }
        inverse[position] = Some(original);
    }
    Ok(inverse.into_iter().flatten().collect())
}

/// Merge chains that run one after another.
///
/// `ordering[i]` is the serial position of `chains[i]` and must be a
/// permutation of the chain positions. Thresholds, step counts and
/// group labels aggregate in serial order; the merged step list runs
/// each part to completion before the next one starts.
pub fn merge_serial(chains: &[Chain], ordering: &[usize]) -> MergeResult<Chain> {
    if chains.is_empty() {
        return Err(MergeError::count_mismatch("chains to merge serially", 1, 0));
    }
    let inverse = invert_ordering(chains.len(), ordering)?;

    let mut chain_name = String::new();
    let mut thresholds: Vec<L1Threshold> = Vec::new();
    let mut n_steps: Vec<usize> = Vec::new();
    let mut alignment_groups: Vec<String> = Vec::new();
    let mut parts: Vec<&Chain> = Vec::with_capacity(chains.len());

    for &original in &inverse {
        let part = &chains[original];
        if chain_name.is_empty() {
            chain_name = part.name.clone();
        } else if chain_name != part.name {
            return Err(MergeError::NameMismatch {
                expected: chain_name,
                found: part.name.clone(),
            });
        }
        parts.push(part);
        n_steps.extend(part.n_steps.iter().copied());
        thresholds.extend(part.l1_thresholds.iter().cloned());
        alignment_groups.extend(part.alignment_groups.iter().cloned());
    }

    let rows = serial_zip(&parts, &inverse)?;
    let mut combined: Vec<ChainStep> = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.into_iter().enumerate() {
        let step = make_combined_step(row, row_index + 1, chains, &combined, &[], None)?;
        combined.push(step);
    }

    let merged = Chain::new(chain_name, combined, thresholds, n_steps, alignment_groups)?;
    tracing::debug!(chain = %merged.name, rows = merged.steps.len(), "Serial merged chain");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trigmenu_types::{MenuSequence, StepDescriptor};

    fn make_part(
        name: &str,
        signature: &str,
        group: &str,
        threshold: &str,
        step_names: &[&str],
    ) -> Chain {
        let steps = step_names
            .iter()
            .enumerate()
            .map(|(i, step_name)| {
                ChainStep::new(
                    step_name.to_string(),
                    vec![MenuSequence::real(format!("{signature}Seq{}", i + 1))],
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
            vec![step_names.len()],
            vec![group.to_string()],
        )
        .unwrap()
    }

    fn make_muon_egamma() -> (Chain, Chain) {
        let muon = make_part(
            "HLT_mu6_e5",
            "Muon",
            "Muon",
            "MU8F",
            &["Step1_muFast", "Step2_muComb"],
        );
        let egamma = make_part("HLT_mu6_e5", "Electron", "Egamma", "EM22VHI", &["Step1_elFast"]);
        (muon, egamma)
    }

    #[test]
    fn test_parts_run_one_after_another() {
        let (muon, egamma) = make_muon_egamma();

        let merged = merge_serial(&[muon, egamma], &[0, 1]).unwrap();

        assert_eq!(merged.steps.len(), 3);
        // placeholders are named under the group currently running
        assert_eq!(
            merged.steps[0].name,
            "merged_muFast_EmptyMuonAlign1_Electron"
        );
        assert_eq!(
            merged.steps[1].name,
            "merged_muComb_EmptyMuonAlign2_Electron"
        );
        assert_eq!(merged.steps[2].name, "merged_EmptyEgammaAlign1_Muon_elFast");

        // the probe leg idles while the tag leg runs, then takes over
        assert!(!merged.steps[0].sequences[0].is_empty_placeholder());
        assert!(merged.steps[0].sequences[1].is_empty_placeholder());
        assert!(merged.steps[2].sequences[0].is_empty_placeholder());
        assert!(!merged.steps[2].sequences[1].is_empty_placeholder());

        assert_eq!(merged.n_steps, vec![2, 1]);
        assert_eq!(merged.alignment_groups, vec!["Muon", "Egamma"]);
        assert_eq!(
            merged.steps[0].step_descriptors[0].chain_name,
            "leg000_HLT_mu6_e5"
        );
        assert_eq!(
            merged.steps[0].step_descriptors[1].chain_name,
            "leg001_HLT_mu6_e5"
        );
    }

    #[test]
    fn test_ordering_permutes_execution_not_slots() {
        let (muon, egamma) = make_muon_egamma();

        // egamma listed first but runs second
        let merged = merge_serial(&[egamma, muon], &[1, 0]).unwrap();

        assert_eq!(merged.steps.len(), 3);
        // muon runs first, its real step landing in slot 1
        assert_eq!(
            merged.steps[0].name,
            "merged_EmptyMuonAlign1_Electron_muFast"
        );
        assert!(merged.steps[0].sequences[0].is_empty_placeholder());
        assert!(!merged.steps[0].sequences[1].is_empty_placeholder());
        assert_eq!(merged.steps[2].name, "merged_elFast_EmptyEgammaAlign1_Muon");

        // aggregation follows execution order, slots follow input order
        assert_eq!(merged.n_steps, vec![2, 1]);
        assert_eq!(merged.alignment_groups, vec!["Muon", "Egamma"]);
        assert_eq!(merged.l1_thresholds[0], L1Threshold::new("MU8F"));
        assert_eq!(
            merged.steps[0].step_descriptors[0].signature,
            "Electron"
        );
    }

    #[test]
    fn test_ordering_must_be_a_permutation() {
        let (muon, egamma) = make_muon_egamma();

        let err = merge_serial(&[muon.clone(), egamma.clone()], &[0, 0]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidSerialOrdering { .. }));

        let err = merge_serial(&[muon, egamma], &[0, 2]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidSerialOrdering { .. }));
    }

    #[test]
    fn test_name_mismatch_is_fatal() {
        let (muon, _) = make_muon_egamma();
        let other = make_part("HLT_mu6_e12", "Electron", "Egamma", "EM22VHI", &["Step1_elFast"]);

        let err = merge_serial(&[muon, other], &[0, 1]).unwrap_err();
        assert!(matches!(err, MergeError::NameMismatch { .. }));
    }

    #[test]
    fn test_active_group_detection() {
        let mixed = ChainStep::new(
            "Step1_mixed",
            vec![
                MenuSequence::empty("EmptyMuonSeq1_Muon", false),
                MenuSequence::real("elFastSeq"),
            ],
            vec![1, 1],
            vec![
                StepDescriptor::new("HLT_mu6_e5", "Muon", "Muon", 1),
                StepDescriptor::new("HLT_mu6_e5", "Electron", "Egamma", 1),
            ],
        )
        .unwrap();
        assert_eq!(current_alignment_group(&mixed).unwrap(), "Egamma");

        let idle = ChainStep::new(
            "Step2_idle",
            vec![MenuSequence::empty("EmptyMuonSeq2_Muon", false)],
            vec![1],
            vec![StepDescriptor::new("HLT_mu6_e5", "Muon", "Muon", 1)],
        )
        .unwrap();
        assert!(matches!(
            current_alignment_group(&idle).unwrap_err(),
            MergeError::NoActiveLeg(_)
        ));

        let split = ChainStep::new(
            "Step1_split",
            vec![
                MenuSequence::real("muFastSeq"),
                MenuSequence::real("elFastSeq"),
            ],
            vec![1, 1],
            vec![
                StepDescriptor::new("HLT_mu6_e5", "Muon", "Muon", 1),
                StepDescriptor::new("HLT_mu6_e5", "Electron", "Egamma", 1),
            ],
        )
        .unwrap();
        assert!(matches!(
            current_alignment_group(&split).unwrap_err(),
            MergeError::AmbiguousStepGroups { .. }
        ));
    }
}
