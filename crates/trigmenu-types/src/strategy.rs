//! Merge strategies and the per-chain merge request

use crate::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the parts of a combined chain are interleaved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Legs run concurrently at the same logical steps.
    Parallel,
    /// Legs run one after another in a declared order.
    Serial,
    /// Group by alignment, parallel-merge within groups, serial-merge
    /// the groups in ordering rank.
    Auto,
}

impl FromStr for MergeStrategy {
    type Err = MergeError;

    fn from_str(s: &str) -> MergeResult<Self> {
        match s {
            "parallel" => Ok(MergeStrategy::Parallel),
            "serial" => Ok(MergeStrategy::Serial),
            "auto" => Ok(MergeStrategy::Auto),
            other => Err(MergeError::UnknownStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MergeStrategy::Parallel => "parallel",
            MergeStrategy::Serial => "serial",
            MergeStrategy::Auto => "auto",
        };
        write!(f, "{s}")
    }
}

/// The declared merge for one combined chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Name of the combined chain, used for diagnostics.
    pub chain_name: String,
    pub strategy: MergeStrategy,
    /// Parallel merging supports no offset; any value here is refused.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub offset: Option<usize>,
    /// Serial position of each input chain; required for `Serial`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub serial_ordering: Option<Vec<usize>>,
    /// Signature tag of each part of the combined chain.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub signatures: Vec<String>,
}

impl MergeRequest {
    pub fn new(chain_name: impl Into<String>, strategy: MergeStrategy) -> Self {
        Self {
            chain_name: chain_name.into(),
            strategy,
            offset: None,
            serial_ordering: None,
            signatures: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_serial_ordering(mut self, ordering: Vec<usize>) -> Self {
        self.serial_ordering = Some(ordering);
        self
    }

    pub fn with_signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signatures = signatures.into_iter().map(Into::into).collect();
        self
    }

    /// Leg renumbering for the combined chain.
    ///
    /// Chains combining jet and b-jet parts keep every part on its
    /// signature position; everyone else gets no renumbering.
    pub fn leg_numbering(&self) -> Vec<usize> {
        let has = |sig: &str| self.signatures.iter().any(|s| s == sig);
        if has("Bjet") && has("Jet") {
            (0..self.signatures.len()).collect()
        } else {
            Vec::new()
        }
    }
}
