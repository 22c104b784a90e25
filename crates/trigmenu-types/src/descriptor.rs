//! Per-leg step descriptors
//!
//! A descriptor records what one leg of a step reconstructs and selects.
//! On merge, each descriptor's chain name is rewritten to a canonical
//! `legNNN_` label giving the leg's position in the final combined chain.
//! Descriptors are value records: renaming builds a new one, the input is
//! never touched.

use serde::{Deserialize, Serialize};

/// Width of the numeric part of a `legNNN_` prefix.
const LEG_DIGITS: usize = 3;

/// Per-leg metadata for one chain step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDescriptor {
    /// Chain name this leg belongs to; carries a `legNNN_` prefix once
    /// the leg is part of a merged chain.
    pub chain_name: String,
    /// Signature tag of the leg, e.g. `Muon` or `Jet`.
    pub signature: String,
    /// Alignment group label of the leg.
    pub alignment_group: String,
    /// Encoded object count required by this leg.
    pub multiplicity: u32,
}

impl StepDescriptor {
    pub fn new(
        chain_name: impl Into<String>,
        signature: impl Into<String>,
        alignment_group: impl Into<String>,
        multiplicity: u32,
    ) -> Self {
        Self {
            chain_name: chain_name.into(),
            signature: signature.into(),
            alignment_group: alignment_group.into(),
            multiplicity,
        }
    }

    /// Jet-style legs do not encode their multiplicity the normal way.
    pub fn is_jet_like(&self) -> bool {
        self.signature == "Jet" || self.signature == "Bjet"
    }

    /// Object count this leg expects at a step, fixed at 1 for jet-style
    /// legs.
    pub fn leg_multiplicity(&self) -> u32 {
        if self.is_jet_like() {
            1
        } else {
            self.multiplicity
        }
    }

    /// A copy of this descriptor renamed for its position in a merged
    /// chain. Any existing `legNNN_` prefix is stripped first, so the
    /// rename is stable under repeated merges.
    pub fn renamed_for_leg(&self, leg: usize) -> StepDescriptor {
        let mut renamed = self.clone();
        renamed.chain_name = leg_name(leg, strip_leg_prefix(&self.chain_name));
        renamed
    }
}

/// Canonical per-leg chain label: `leg007_HLT_mu6_j45`.
pub fn leg_name(leg: usize, chain_name: &str) -> String {
    format!("leg{:0width$}_{}", leg, chain_name, width = LEG_DIGITS)
}

/// Removes a leading `legNNN_` prefix, if present.
pub fn strip_leg_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= LEG_DIGITS + 4
        && name.starts_with("leg")
        && bytes[3..3 + LEG_DIGITS].iter().all(|b| b.is_ascii_digit())
        && bytes[3 + LEG_DIGITS] == b'_'
    {
        &name[LEG_DIGITS + 4..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_name_round_trip() {
        let named = leg_name(7, "HLT_mu6_j45");
        assert_eq!(named, "leg007_HLT_mu6_j45");
        assert_eq!(strip_leg_prefix(&named), "HLT_mu6_j45");
    }

    #[test]
    fn test_strip_leg_prefix_leaves_plain_names() {
        assert_eq!(strip_leg_prefix("HLT_mu6"), "HLT_mu6");
        assert_eq!(strip_leg_prefix("legacy_chain"), "legacy_chain");
        assert_eq!(strip_leg_prefix("leg12_short"), "leg12_short");
    }

    #[test]
    fn test_renamed_for_leg_is_idempotent_in_shape() {
        let descriptor = StepDescriptor::new("HLT_e5_mu6", "Muon", "Muon", 1);

        let first = descriptor.renamed_for_leg(1);
        assert_eq!(first.chain_name, "leg001_HLT_e5_mu6");

        // renaming a renamed descriptor replaces the prefix
        let second = first.renamed_for_leg(0);
        assert_eq!(second.chain_name, "leg000_HLT_e5_mu6");
        assert_eq!(second.signature, "Muon");
    }

    #[test]
    fn test_jet_like_multiplicity_is_fixed() {
        let jet = StepDescriptor::new("HLT_j45", "Jet", "JetMET", 4);
        let muon = StepDescriptor::new("HLT_2mu4", "Muon", "Muon", 2);

        assert!(jet.is_jet_like());
        assert_eq!(jet.leg_multiplicity(), 1);
        assert!(!muon.is_jet_like());
        assert_eq!(muon.leg_multiplicity(), 2);
    }
}
