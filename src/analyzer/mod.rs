//! Core analysis engine: extraction, indexing and the distinguishing set search

pub mod features;
pub mod index;
pub mod solver;

use log::{debug, info};

use crate::errors::{FingerprintError, FingerprintResult};
use crate::generator;
use crate::models::{Fingerprint, MethodId, RenderedSet};
use crate::resolver::{self, PredicateEvaluator};

pub use self::features::{extract, ExtractorConfig, FeatureExtractor};
pub use self::index::{FeatureIndex, IndexedMethod, MethodIdx};
pub use self::solver::{CancelFlag, Solver, SolverConfig};

/// Fingerprints for one method, before they are tied to a snapshot
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Fingerprint of the full feature list
    pub full_fingerprint: Fingerprint,
    /// Size of the full feature list
    pub full_feature_count: usize,
    /// Minimal fingerprints, shortest first
    pub fingerprints: Vec<RenderedSet>,
}

/// Runs the solve, render and verify pipeline for one target
pub struct Analyzer<'e> {
    solver: Solver,
    evaluator: &'e dyn PredicateEvaluator,
}

impl<'e> Analyzer<'e> {
    /// Create a new analyzer
    pub fn new(solver: Solver, evaluator: &'e dyn PredicateEvaluator) -> Self {
        Self { solver, evaluator }
    }

    /// Solve for `target`, render every set and check that each rendered
    /// fingerprint resolves back to `target`
    pub fn fingerprint(
        &self,
        target: &MethodId,
        index: &FeatureIndex,
        cancel: &CancelFlag,
    ) -> FingerprintResult<Analysis> {
        info!("Generating fingerprints for method: {}", target);

        let features = index
            .full_features(target)
            .ok_or_else(|| FingerprintError::UnknownMethod(target.clone()))?;
        let full_fingerprint = generator::render(features)?;

        let sets = self.solver.solve_with_cancel(target, index, cancel)?;

        let mut fingerprints = Vec::with_capacity(sets.len());
        for set in sets {
            let fingerprint = generator::render(&set.features)?;
            self.verify(target, &fingerprint, index)?;
            fingerprints.push(RenderedSet {
                features: set.features,
                fingerprint,
                strategy: set.strategy,
            });
        }

        Ok(Analysis {
            full_fingerprint,
            full_feature_count: features.len(),
            fingerprints,
        })
    }

    /// Render, re-parse and resolve: the fingerprint must come back to
    /// `target` and nothing else
    pub fn verify(&self, target: &MethodId, fingerprint: &Fingerprint, index: &FeatureIndex) -> FingerprintResult<()> {
        let round_trip = |reason: String| FingerprintError::RoundTrip {
            target: target.clone(),
            reason,
        };

        let predicate = self
            .evaluator
            .evaluate(fingerprint.as_str())
            .map_err(|e| round_trip(format!("rendered fingerprint does not parse: {}", e)))?;

        match resolver::resolve_unique(&predicate, index) {
            Ok(method) if &method.id == target => {
                debug!("Round trip confirmed for {}", target);
                Ok(())
            }
            Ok(method) => Err(round_trip(format!("resolved to {}", method.id))),
            Err(e) => Err(round_trip(e.to_string())),
        }
    }
}
