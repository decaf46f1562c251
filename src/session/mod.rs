//! Session state: the active corpus index and the request surface
//!
//! A session owns at most one snapshot of a loaded corpus. Loading builds a
//! new index off to the side and publishes it with a single pointer swap, so
//! readers see either the old snapshot or the new one, never a partial
//! build. Requests clone the snapshot `Arc` and run without holding a lock.

mod worker;
#[cfg(test)]
mod tests;

use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::analyzer::{Analyzer, CancelFlag, ExtractorConfig, FeatureExtractor, FeatureIndex, Solver, SolverConfig};
use crate::corpus::CorpusProvider;
use crate::errors::{ErrorContext, ErrorExt, FingerprintError, FingerprintResult};
use crate::models::{FingerprintReport, MethodId};
use crate::resolver::{self, DslEvaluator, PredicateEvaluator, Resolution};
use crate::utils::hash;

pub use self::worker::FingerprintTask;

/// Settings for every request made through a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Feature extraction settings, applied at load time
    pub extractor: ExtractorConfig,
    /// Solver settings, applied per request
    pub solver: SolverConfig,
}

/// One published corpus index
#[derive(Debug)]
pub struct Snapshot {
    /// Monotonic load counter, unique within a session
    pub generation: u64,
    /// Digest of method ids and feature lists
    pub digest: String,
    /// The index itself
    pub index: FeatureIndex,
}

impl Snapshot {
    /// Corpus the snapshot was built from
    pub fn corpus_id(&self) -> &str {
        self.index.corpus_id()
    }
}

/// Owner of the currently loaded corpus
pub struct Session {
    config: SessionConfig,
    evaluator: Arc<dyn PredicateEvaluator>,
    current: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
}

impl Session {
    /// Create a session using the built-in DSL evaluator
    pub fn new(config: SessionConfig) -> Self {
        Self::with_evaluator(config, Arc::new(DslEvaluator::new()))
    }

    /// Create a session with an external predicate evaluator
    pub fn with_evaluator(config: SessionConfig, evaluator: Arc<dyn PredicateEvaluator>) -> Self {
        Self {
            config,
            evaluator,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Settings in use
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Build an index for `provider` and make it the active snapshot
    ///
    /// On failure the previously loaded snapshot, if any, stays active.
    pub fn load(&self, provider: &dyn CorpusProvider) -> FingerprintResult<Arc<Snapshot>> {
        let corpus_id = provider.corpus_id();
        info!("Loading corpus {}", corpus_id);

        let members = provider
            .members()
            .with_context(ErrorContext::new("session", "enumerating members").corpus(&corpus_id))?;

        let extractor = FeatureExtractor::new(self.config.extractor);
        let index = match FeatureIndex::build_with(&corpus_id, members, &extractor) {
            Ok(index) => index,
            Err(e) => {
                warn!("Failed to load corpus {}: {}", corpus_id, e);
                return Err(e);
            }
        };
        let digest = hash::corpus_digest(index.methods().iter().map(|m| (&m.id, m.features.as_slice())))?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(Snapshot { generation, digest, index });
        *current = Some(Arc::clone(&snapshot));

        info!(
            "Published corpus {} as generation {} ({} methods)",
            corpus_id,
            generation,
            snapshot.index.len()
        );
        Ok(snapshot)
    }

    /// Drop the active snapshot; running requests keep their own copy
    pub fn unload(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(snapshot) = current.take() {
            info!("Unloaded corpus {} (generation {})", snapshot.corpus_id(), snapshot.generation);
        }
    }

    /// The active snapshot
    pub fn snapshot(&self) -> FingerprintResult<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(FingerprintError::NoCorpusLoaded)
    }

    /// Whether results computed against `generation` still describe the
    /// active snapshot
    pub fn is_current(&self, generation: u64) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(false, |snapshot| snapshot.generation == generation)
    }

    /// Generate fingerprints for `method` on the calling thread
    pub fn generate_fingerprints(&self, method: &MethodId) -> FingerprintResult<FingerprintReport> {
        let snapshot = self.snapshot()?;
        build_report(&snapshot, method, &self.config, self.evaluator.as_ref(), &CancelFlag::new())
    }

    /// Compile and resolve a predicate on the calling thread
    pub fn resolve_predicate(&self, source: &str) -> FingerprintResult<Resolution> {
        let snapshot = self.snapshot()?;
        resolver::resolve_source(self.evaluator.as_ref(), source, &snapshot.index)
    }

    /// Generate fingerprints for `method` on the blocking pool
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_fingerprint(&self, method: MethodId) -> FingerprintResult<FingerprintTask<FingerprintReport>> {
        let snapshot = self.snapshot()?;
        let config = self.config;
        let evaluator = Arc::clone(&self.evaluator);
        Ok(FingerprintTask::spawn(snapshot.generation, move |cancel| {
            build_report(&snapshot, &method, &config, evaluator.as_ref(), cancel)
        }))
    }

    /// Compile and resolve a predicate on the blocking pool
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_resolve(&self, source: String) -> FingerprintResult<FingerprintTask<Resolution>> {
        let snapshot = self.snapshot()?;
        let evaluator = Arc::clone(&self.evaluator);
        Ok(FingerprintTask::spawn(snapshot.generation, move |_| {
            resolver::resolve_source(evaluator.as_ref(), &source, &snapshot.index)
        }))
    }
}

fn build_report(
    snapshot: &Snapshot,
    method: &MethodId,
    config: &SessionConfig,
    evaluator: &dyn PredicateEvaluator,
    cancel: &CancelFlag,
) -> FingerprintResult<FingerprintReport> {
    let analyzer = Analyzer::new(Solver::new(config.solver), evaluator);
    let analysis = analyzer.fingerprint(method, &snapshot.index, cancel)?;
    Ok(FingerprintReport {
        method: method.clone(),
        corpus_id: snapshot.corpus_id().to_string(),
        corpus_digest: snapshot.digest.clone(),
        generation: snapshot.generation,
        full_feature_count: analysis.full_feature_count,
        full_fingerprint: analysis.full_fingerprint,
        fingerprints: analysis.fingerprints,
    })
}
