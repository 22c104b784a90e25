//! Chains and chain steps
//!
//! A chain is the unit the merge engine works on: upstream builds one
//! single-leg chain per physics object, merging combines them into one
//! multi-leg chain whose steps each carry one slot per leg.

use crate::{L1Threshold, MenuSequence, MergeError, MergeResult, StepDescriptor};
use serde::{Deserialize, Serialize};

// ── Combo hypothesis configuration ───────────────────────────────────

/// Non-default combined-decision configuration for a step
///
/// `None` in [`ChainStep::combo_hypo`] means the default configuration;
/// merging keeps the last non-default one it sees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboHypoConfig {
    pub name: String,
}

impl ComboHypoConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to a combo-hypo tool attached to a step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboToolConfig {
    pub name: String,
}

impl ComboToolConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ── Chain step ───────────────────────────────────────────────────────

/// One step of a chain
///
/// Per active leg the step carries a sequence, a descriptor, and a
/// multiplicity entry. A step whose multiplicity list is empty is a
/// placeholder: it runs nothing and only propagates bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    pub name: String,
    pub sequences: Vec<MenuSequence>,
    /// One entry per leg; empty for placeholder steps.
    pub multiplicity: Vec<u32>,
    /// One descriptor per leg, placeholder steps included.
    pub step_descriptors: Vec<StepDescriptor>,
    /// Combined-decision configuration; `None` selects the default.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub combo_hypo: Option<ComboHypoConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub combo_tools: Vec<ComboToolConfig>,
    pub is_empty: bool,
}

impl ChainStep {
    /// Create a step, validating the per-leg counts.
    ///
    /// An all-zero multiplicity list is cleared and marks the step empty.
    /// Otherwise the multiplicity and descriptor lists must pair up, and
    /// the sequence list must match too unless a jet-style leg is
    /// involved (jet steps legitimately run fewer sequences than legs).
    pub fn new(
        name: impl Into<String>,
        sequences: Vec<MenuSequence>,
        mut multiplicity: Vec<u32>,
        step_descriptors: Vec<StepDescriptor>,
    ) -> MergeResult<ChainStep> {
        let name = name.into();
        if multiplicity.iter().sum::<u32>() == 0 {
            multiplicity.clear();
        } else {
            if step_descriptors.len() != multiplicity.len() {
                return Err(MergeError::count_mismatch(
                    format!("step {name} multiplicities vs descriptors"),
                    step_descriptors.len(),
                    multiplicity.len(),
                ));
            }
            let jet_like = step_descriptors.iter().any(|d| d.is_jet_like());
            if sequences.len() != multiplicity.len() && !jet_like {
                return Err(MergeError::count_mismatch(
                    format!("step {name} sequences vs multiplicities"),
                    multiplicity.len(),
                    sequences.len(),
                ));
            }
        }
        let is_empty = multiplicity.is_empty();
        Ok(ChainStep {
            name,
            sequences,
            multiplicity,
            step_descriptors,
            combo_hypo: None,
            combo_tools: Vec::new(),
            is_empty,
        })
    }

    /// Create an explicit placeholder step that still carries sequences,
    /// as synthesized when padding a leg.
    pub fn empty_step(
        name: impl Into<String>,
        sequences: Vec<MenuSequence>,
        multiplicity: Vec<u32>,
        step_descriptors: Vec<StepDescriptor>,
    ) -> MergeResult<ChainStep> {
        let mut step = ChainStep::new(name, sequences, multiplicity, step_descriptors)?;
        step.is_empty = true;
        Ok(step)
    }

    /// Create a pure placeholder step with no sequences at all.
    pub fn placeholder(name: impl Into<String>, step_descriptors: Vec<StepDescriptor>) -> ChainStep {
        ChainStep {
            name: name.into(),
            sequences: Vec::new(),
            multiplicity: Vec::new(),
            step_descriptors,
            combo_hypo: None,
            combo_tools: Vec::new(),
            is_empty: true,
        }
    }

    /// Attach combined-decision configuration to the step.
    pub fn with_combo(
        mut self,
        combo_hypo: Option<ComboHypoConfig>,
        combo_tools: Vec<ComboToolConfig>,
    ) -> ChainStep {
        self.combo_hypo = combo_hypo;
        self.combo_tools = combo_tools;
        self
    }

    /// Number of legs this step references.
    pub fn leg_count(&self) -> usize {
        self.step_descriptors.len()
    }
}

// ── Chain ────────────────────────────────────────────────────────────

/// A trigger chain: one part per leg before merging, several after
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    pub steps: Vec<ChainStep>,
    /// One threshold per leg, flat across all constituent parts.
    pub l1_thresholds: Vec<L1Threshold>,
    /// Step count contributed by each constituent part.
    pub n_steps: Vec<usize>,
    /// Alignment-group label of each constituent part.
    pub alignment_groups: Vec<String>,
}

impl Chain {
    /// Create a chain, validating that every step references the same
    /// number of legs.
    pub fn new(
        name: impl Into<String>,
        steps: Vec<ChainStep>,
        l1_thresholds: Vec<L1Threshold>,
        n_steps: Vec<usize>,
        alignment_groups: Vec<String>,
    ) -> MergeResult<Chain> {
        let name = name.into();
        if let Some(first) = steps.first() {
            let legs = first.leg_count();
            for step in &steps {
                if step.leg_count() != legs {
                    return Err(MergeError::count_mismatch(
                        format!("chain {name} step {} legs", step.name),
                        legs,
                        step.leg_count(),
                    ));
                }
            }
        }
        Ok(Chain {
            name,
            steps,
            l1_thresholds,
            n_steps,
            alignment_groups,
        })
    }

    /// Number of legs, as referenced by the first step.
    pub fn leg_count(&self) -> usize {
        self.steps.first().map_or(0, ChainStep::leg_count)
    }

    /// Full-scan flag for each leg, derived from the thresholds.
    pub fn full_scan_flags(&self) -> Vec<bool> {
        self.l1_thresholds
            .iter()
            .map(L1Threshold::is_full_scan)
            .collect()
    }

    /// Whether one leg is seeded full-scan; absent legs count as not.
    pub fn is_full_scan_leg(&self, leg: usize) -> bool {
        self.l1_thresholds
            .get(leg)
            .is_some_and(L1Threshold::is_full_scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_descriptor(signature: &str) -> StepDescriptor {
        StepDescriptor::new("HLT_mu6_e5", signature, "Muon", 1)
    }

    #[test]
    fn test_step_counts_are_validated() {
        let err = ChainStep::new(
            "Step1_mu",
            vec![MenuSequence::real("muFastSeq")],
            vec![1, 1],
            vec![make_descriptor("Muon")],
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::CountMismatch { .. }));
    }

    #[test]
    fn test_zero_multiplicity_becomes_placeholder() {
        let step = ChainStep::new(
            "EmptyMuonAlign1_1Muon",
            vec![],
            vec![0, 0],
            vec![make_descriptor("Muon"), make_descriptor("Muon")],
        )
        .unwrap();
        assert!(step.is_empty);
        assert!(step.multiplicity.is_empty());
        assert_eq!(step.leg_count(), 2);
    }

    #[test]
    fn test_jet_steps_may_run_fewer_sequences() {
        let step = ChainStep::new(
            "Step1_jet",
            vec![MenuSequence::real("jetRecoSeq")],
            vec![1, 1],
            vec![
                StepDescriptor::new("HLT_j45", "Jet", "JetMET", 1),
                StepDescriptor::new("HLT_j45", "Jet", "JetMET", 1),
            ],
        );
        assert!(step.is_ok());
    }

    #[test]
    fn test_chain_requires_uniform_leg_counts() {
        let one_leg = ChainStep::new(
            "Step1_mu",
            vec![MenuSequence::real("muFastSeq")],
            vec![1],
            vec![make_descriptor("Muon")],
        )
        .unwrap();
        let two_legs = ChainStep::new(
            "Step2_mu",
            vec![
                MenuSequence::real("muCombSeq"),
                MenuSequence::real("elFastSeq"),
            ],
            vec![1, 1],
            vec![make_descriptor("Muon"), make_descriptor("Electron")],
        )
        .unwrap();

        let err = Chain::new(
            "HLT_mu6_e5",
            vec![one_leg, two_legs],
            vec![L1Threshold::new("MU8F")],
            vec![2],
            vec!["Muon".into()],
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::CountMismatch { .. }));
    }

    #[test]
    fn test_full_scan_flags_follow_thresholds() {
        let step = ChainStep::new(
            "Step1_mu",
            vec![MenuSequence::real("muFastSeq")],
            vec![1],
            vec![make_descriptor("Muon")],
        )
        .unwrap();
        let chain = Chain::new(
            "HLT_mu6_xe30",
            vec![step],
            vec![L1Threshold::new("MU8F"), L1Threshold::new("XE30")],
            vec![1],
            vec!["Muon".into()],
        )
        .unwrap();

        assert_eq!(chain.full_scan_flags(), vec![false, true]);
        assert!(!chain.is_full_scan_leg(0));
        assert!(chain.is_full_scan_leg(1));
        assert!(!chain.is_full_scan_leg(5));
    }

    #[test]
    fn test_chain_serializes_round_trip() {
        let step = ChainStep::new(
            "Step1_mu",
            vec![MenuSequence::real("muFastSeq")],
            vec![1],
            vec![make_descriptor("Muon")],
        )
        .unwrap()
        .with_combo(
            Some(ComboHypoConfig::new("dimuComboHypo")),
            vec![ComboToolConfig::new("dRTool")],
        );
        let chain = Chain::new(
            "HLT_mu6_e5",
            vec![step],
            vec![L1Threshold::new("MU8F")],
            vec![1],
            vec!["Muon".into()],
        )
        .unwrap();

        let json = serde_json::to_string(&chain).unwrap();
        let back: Chain = serde_json::from_str(&json).unwrap();
        assert_eq!(chain, back);
    }
}
