//! Solver output and rendered fingerprints

use serde::{Serialize, Deserialize};
use std::fmt;

use crate::models::feature::Feature;
use crate::models::method::MethodId;

/// How a minimal feature set was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Bounded exhaustive enumeration of small subsets
    Exhaustive,
    /// Greedy construction, rarest feature first
    RarityAscending,
    /// Greedy construction in extraction order
    ExtractionOrder,
    /// Greedy construction, most common feature first
    RarityDescending,
}

/// A feature subset that matches exactly one method
///
/// `indices` point into the target's full feature list and are ascending,
/// so `features` is always in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalFeatureSet {
    /// Method the set identifies
    pub target: MethodId,
    /// Positions in the target's feature list
    pub indices: Vec<usize>,
    /// The features themselves
    pub features: Vec<Feature>,
    /// Search strategy that produced the set
    pub strategy: Strategy,
}

impl MinimalFeatureSet {
    /// Number of features in the set
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the set is empty (only possible for a single-method corpus)
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Rendered predicate text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap rendered text
    pub fn new(text: String) -> Self {
        Self(text)
    }

    /// Borrow the text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One minimal set together with its rendered fingerprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedSet {
    /// Features in extraction order
    pub features: Vec<Feature>,
    /// Rendered text, verified to resolve back to the target
    pub fingerprint: Fingerprint,
    /// Search strategy that produced the set
    pub strategy: Strategy,
}

/// Everything produced for a "generate fingerprint" request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintReport {
    /// Target method
    pub method: MethodId,
    /// Corpus the report was computed against
    pub corpus_id: String,
    /// Digest of that corpus snapshot
    pub corpus_digest: String,
    /// Snapshot generation, see `Session::is_current`
    pub generation: u64,
    /// Size of the target's full feature list
    pub full_feature_count: usize,
    /// Fingerprint of the full feature list
    pub full_fingerprint: Fingerprint,
    /// Minimal fingerprints, shortest first
    pub fingerprints: Vec<RenderedSet>,
}
