//! Combined-step assembly
//!
//! One output step is built per row: each input chain contributes either
//! its real step at that row or a padded slot, and the per-leg payloads
//! are concatenated in slot order. Descriptors are renumbered with
//! canonical `legNNN_` labels as they are appended, so leg identity in
//! the merged chain never depends on the inputs' own numbering.

use crate::naming;
use trigmenu_types::{
    Chain, ChainStep, ComboHypoConfig, ComboToolConfig, MenuSequence, MergeError, MergeResult,
    StepDescriptor,
};

// ── Row slots ────────────────────────────────────────────────────────

/// One chain's contribution to an output row
#[derive(Clone, Debug, PartialEq)]
pub enum StepSlot {
    /// The chain runs a step of its own at this row.
    Real(ChainStep),
    /// The chain is exhausted at this row. `legs` carries the chain's
    /// leg width, one replication unit per leg to pad.
    Missing { legs: usize },
}

/// Whether any slot of the row runs a real sequence.
pub(crate) fn row_has_real_content(slots: &[StepSlot]) -> bool {
    slots.iter().any(|slot| match slot {
        StepSlot::Real(step) => step.sequences.iter().any(|seq| !seq.is_empty_placeholder()),
        StepSlot::Missing { .. } => false,
    })
}

/// The step a padded slot borrows metadata from: past the chain's own
/// length the last step is the nearest one, otherwise the first.
fn nearest_step(chain: &Chain, step_number: usize) -> MergeResult<&ChainStep> {
    let step = if step_number > chain.steps.len() {
        chain.steps.last()
    } else {
        chain.steps.first()
    };
    step.ok_or_else(|| {
        MergeError::count_mismatch(format!("chain {} steps to pad from", chain.name), 1, 0)
    })
}

// ── Step combination ─────────────────────────────────────────────────

/// Build one combined step from a row of per-chain slots.
///
/// `step_number` is 1-based. The row carries exactly one slot per input
/// chain. `prior_steps` are the rows already combined for this output
/// chain; a padded leg reads its expected multiplicity from the previous
/// row when one exists at the same leg offset, and falls back to its
/// descriptor's encoded count. `leg_numbering`, when non-empty,
/// overrides the running leg counter per slot. The `alignment_group`
/// label names padded slots; when absent the first chain's leading group
/// is used.
pub fn make_combined_step(
    row: Vec<StepSlot>,
    step_number: usize,
    chains: &[Chain],
    prior_steps: &[ChainStep],
    leg_numbering: &[usize],
    alignment_group: Option<&str>,
) -> MergeResult<ChainStep> {
    if row.len() != chains.len() {
        return Err(MergeError::count_mismatch(
            format!("combined step {step_number} slots vs input chains"),
            chains.len(),
            row.len(),
        ));
    }
    let slots = row;
    if row_has_real_content(&slots) {
        combine_mixed_row(
            slots,
            step_number,
            chains,
            prior_steps,
            leg_numbering,
            alignment_group,
        )
    } else {
        collapse_placeholder_row(slots, step_number, chains, leg_numbering)
    }
}

fn combine_mixed_row(
    slots: Vec<StepSlot>,
    step_number: usize,
    chains: &[Chain],
    prior_steps: &[ChainStep],
    leg_numbering: &[usize],
    alignment_group: Option<&str>,
) -> MergeResult<ChainStep> {
    let mut name = String::from("merged");
    let mut sequences: Vec<MenuSequence> = Vec::new();
    let mut multiplicities: Vec<u32> = Vec::new();
    let mut descriptors: Vec<StepDescriptor> = Vec::new();
    let mut combo: Option<ComboHypoConfig> = None;
    let mut combo_tools: Vec<ComboToolConfig> = Vec::new();
    let mut pad_group: Option<String> = alignment_group.map(str::to_string);
    let mut leg_counter = 0usize;

    for (chain_index, slot) in slots.iter().enumerate() {
        let label = match slot {
            StepSlot::Real(step) if !step.sequences.is_empty() => {
                // last non-default combined-decision configuration wins
                if combo.is_none() || step.combo_hypo.is_some() {
                    combo = step.combo_hypo.clone();
                }
                sequences.extend(step.sequences.iter().cloned());
                if step.multiplicity.is_empty() {
                    multiplicities.push(0);
                } else {
                    multiplicities.extend(step.multiplicity.iter().copied());
                }
                for tool in &step.combo_tools {
                    if !combo_tools.contains(tool) {
                        combo_tools.push(tool.clone());
                    }
                }
                for descriptor in &step.step_descriptors {
                    if let Some(&forced) = leg_numbering.get(chain_index) {
                        leg_counter = forced;
                    }
                    descriptors.push(descriptor.renamed_for_leg(leg_counter));
                    leg_counter += 1;
                }
                naming::strip_positional_prefixes(&step.name).to_string()
            }
            _ => {
                let chain = &chains[chain_index];
                let group = match &pad_group {
                    Some(group) => group.clone(),
                    None => {
                        let first = &chains[0];
                        let fallback = first
                            .alignment_groups
                            .first()
                            .ok_or_else(|| MergeError::MissingAlignmentGroups(first.name.clone()))?
                            .clone();
                        pad_group = Some(fallback.clone());
                        fallback
                    }
                };
                let source = nearest_step(chain, step_number)?;
                if source.step_descriptors.is_empty() {
                    return Err(MergeError::count_mismatch(
                        format!("chain {} step {} descriptors", chain.name, source.name),
                        1,
                        0,
                    ));
                }
                // the marker accounts one unit per leg of the exhausted
                // chain; every one of those legs gets a placeholder here
                if let StepSlot::Missing { legs } = slot {
                    if *legs != source.step_descriptors.len() {
                        return Err(MergeError::count_mismatch(
                            format!("chain {} padded legs vs step descriptors", chain.name),
                            source.step_descriptors.len(),
                            *legs,
                        ));
                    }
                }

                let mut labels: Vec<String> = Vec::with_capacity(source.step_descriptors.len());
                for (leg, descriptor) in source.step_descriptors.iter().enumerate() {
                    let full_scan = chain.is_full_scan_leg(leg);
                    let seq_name =
                        naming::empty_sequence_name(&descriptor.signature, step_number, &group);
                    if full_scan {
                        sequences.push(MenuSequence::empty(format!("{seq_name}FS"), true));
                    } else {
                        sequences.push(MenuSequence::empty(seq_name, false));
                    }

                    let leg_offset = multiplicities.len();
                    let previous = step_number
                        .checked_sub(2)
                        .and_then(|idx| prior_steps.get(idx))
                        .and_then(|prior| prior.multiplicity.get(leg_offset))
                        .copied();
                    multiplicities.push(previous.unwrap_or(descriptor.multiplicity));

                    descriptors.push(descriptor.renamed_for_leg(leg_counter));
                    leg_counter += 1;

                    labels.push(naming::padded_step_name(
                        &group,
                        step_number,
                        descriptor.multiplicity,
                        &descriptor.signature,
                        full_scan,
                    ));
                }
                labels.join("_")
            }
        };
        name.push('_');
        name.push_str(&label);
    }

    let step =
        ChainStep::new(name, sequences, multiplicities, descriptors)?.with_combo(combo, combo_tools);
    tracing::debug!(step = %step.name, legs = step.leg_count(), "Merged step");
    Ok(step)
}

/// Collapse a row with no real content into one pure placeholder step
/// that carries no sequences but still names every leg.
fn collapse_placeholder_row(
    slots: Vec<StepSlot>,
    step_number: usize,
    chains: &[Chain],
    leg_numbering: &[usize],
) -> MergeResult<ChainStep> {
    let mut name = String::from("merged");
    let mut descriptors: Vec<StepDescriptor> = Vec::new();
    let mut leg_counter = 0usize;

    for (chain_index, slot) in slots.iter().enumerate() {
        let label = match slot {
            StepSlot::Real(step) if !step.sequences.is_empty() => {
                for descriptor in &step.step_descriptors {
                    if let Some(&forced) = leg_numbering.get(chain_index) {
                        leg_counter = forced;
                    }
                    descriptors.push(descriptor.renamed_for_leg(leg_counter));
                    leg_counter += 1;
                }
                naming::strip_positional_prefixes(&step.name).to_string()
            }
            _ => {
                let chain = &chains[chain_index];
                let source = nearest_step(chain, step_number)?;
                let group = chain
                    .alignment_groups
                    .first()
                    .ok_or_else(|| MergeError::MissingAlignmentGroups(chain.name.clone()))?;
                let lead = source.step_descriptors.first().ok_or_else(|| {
                    MergeError::count_mismatch(
                        format!("chain {} step {} descriptors", chain.name, source.name),
                        1,
                        0,
                    )
                })?;
                for descriptor in &source.step_descriptors {
                    descriptors.push(descriptor.renamed_for_leg(leg_counter));
                    leg_counter += 1;
                }
                naming::padded_step_name(group, step_number, lead.multiplicity, &lead.signature, false)
            }
        };
        name.push('_');
        name.push_str(&label);
    }

    tracing::debug!(step = %name, "Collapsed all-placeholder row");
    Ok(ChainStep::placeholder(name, descriptors))
}
