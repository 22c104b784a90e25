//! Placeholder sequence synthesis
//!
//! When a leg has nothing to run at a step, the merge inserts one
//! placeholder sequence per leg. Legs seeded by a full-scan region of
//! interest get the full-scan variant so downstream decision wiring
//! keeps seeing a whole-detector input.

use trigmenu_types::{MenuSequence, MergeError, MergeResult, StepDescriptor};

/// Synthesize one placeholder sequence per leg plus the matching
/// multiplicity list.
///
/// `full_scan_flags` carries one entry per seeded leg; `sequence_names`
/// the base placeholder names, suffixed `FS` where the leg is seeded
/// full-scan. Jet-style legs always register a multiplicity of 1, every
/// other leg keeps its encoded count.
pub fn build_empty_sequences(
    descriptors: &[StepDescriptor],
    full_scan_flags: &[bool],
    sequence_names: &[String],
    chain_name: &str,
) -> MergeResult<(Vec<MenuSequence>, Vec<u32>)> {
    if sequence_names.len() != full_scan_flags.len() {
        return Err(MergeError::count_mismatch(
            format!("chain {chain_name} placeholder names vs seeded legs"),
            full_scan_flags.len(),
            sequence_names.len(),
        ));
    }
    let sequences: Vec<MenuSequence> = full_scan_flags
        .iter()
        .zip(sequence_names)
        .map(|(&full_scan, name)| {
            if full_scan {
                MenuSequence::empty(format!("{name}FS"), true)
            } else {
                MenuSequence::empty(name.clone(), false)
            }
        })
        .collect();

    if sequences.len() != descriptors.len() {
        return Err(MergeError::count_mismatch(
            format!("chain {chain_name} placeholder sequences vs descriptor legs"),
            descriptors.len(),
            sequences.len(),
        ));
    }

    let multiplicities = descriptors
        .iter()
        .map(StepDescriptor::leg_multiplicity)
        .collect();

    tracing::debug!(
        chain = %chain_name,
        legs = sequences.len(),
        "Synthesized placeholder sequences"
    );
    Ok((sequences, multiplicities))
}
