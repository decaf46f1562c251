//! Inverted index from features to the methods carrying them

use log::{debug, info};
use std::collections::HashMap;

use crate::analyzer::features::FeatureExtractor;
use crate::errors::{ErrorContext, ErrorExt, FingerprintError, FingerprintResult};
use crate::models::{Feature, FeatureList, Member, MethodDef, MethodId};
use crate::utils::postings;

/// Dense position of a method in corpus order
pub type MethodIdx = u32;

/// A method as held by the index
#[derive(Debug, Clone)]
pub struct IndexedMethod {
    /// Method identifier
    pub id: MethodId,
    /// Structure the features were extracted from
    pub def: MethodDef,
    /// Full feature list in extraction order
    pub features: FeatureList,
}

/// Feature index for one loaded corpus
///
/// Built once and never modified; a reload builds a new index. Posting
/// lists are sorted ascending by `MethodIdx`.
#[derive(Debug)]
pub struct FeatureIndex {
    corpus_id: String,
    methods: Vec<IndexedMethod>,
    positions: HashMap<MethodId, MethodIdx>,
    postings: HashMap<Feature, Vec<MethodIdx>>,
    skipped: usize,
}

impl FeatureIndex {
    /// Build an index with the default extractor
    pub fn build<I>(corpus_id: &str, members: I) -> FingerprintResult<Self>
    where
        I: IntoIterator<Item = Member>,
    {
        Self::build_with(corpus_id, members, &FeatureExtractor::default())
    }

    /// Build an index with a specific extractor
    ///
    /// Fields and classes are skipped. Fails when no method remains, when
    /// a method cannot be extracted, or when two methods share an id.
    pub fn build_with<I>(corpus_id: &str, members: I, extractor: &FeatureExtractor) -> FingerprintResult<Self>
    where
        I: IntoIterator<Item = Member>,
    {
        info!("Building feature index for corpus {}", corpus_id);

        let mut methods = Vec::new();
        let mut positions = HashMap::new();
        let mut skipped = 0;

        for member in members {
            let method = match member {
                Member::Method(method) => method,
                other => {
                    debug!("Skipping {} {}", other.kind_name(), other.id());
                    skipped += 1;
                    continue;
                }
            };

            let context = || {
                ErrorContext::new("feature_index", "extracting features")
                    .corpus(corpus_id)
                    .details(format!("method {}", method.id))
            };

            let features = match extractor.extract_method(&method) {
                Ok(features) => features,
                Err(e) => return Err(e).with_context(context()),
            };

            let idx = MethodIdx::try_from(methods.len()).map_err(|_| FingerprintError::IndexBuild {
                context: ErrorContext::new("feature_index", "assigning method positions").corpus(corpus_id),
                reason: "corpus has more methods than the index can address".to_string(),
            })?;

            if positions.insert(method.id.clone(), idx).is_some() {
                return Err(FingerprintError::IndexBuild {
                    context: context(),
                    reason: "duplicate method id".to_string(),
                });
            }

            methods.push(IndexedMethod {
                id: method.id.clone(),
                def: method,
                features,
            });
        }

        if methods.is_empty() {
            return Err(FingerprintError::IndexBuild {
                context: ErrorContext::new("feature_index", "building").corpus(corpus_id),
                reason: format!("corpus contains no methods ({} other members skipped)", skipped),
            });
        }

        let mut postings: HashMap<Feature, Vec<MethodIdx>> = HashMap::new();
        for (idx, method) in methods.iter().enumerate() {
            for feature in &method.features {
                // idx fits: it was checked when the method was assigned its position
                postings.entry(feature.clone()).or_default().push(idx as MethodIdx);
            }
        }

        info!(
            "Indexed {} methods with {} distinct features ({} non-method members skipped)",
            methods.len(),
            postings.len(),
            skipped
        );

        Ok(Self {
            corpus_id: corpus_id.to_string(),
            methods,
            positions,
            postings,
            skipped,
        })
    }

    /// Corpus this index was built from
    pub fn corpus_id(&self) -> &str {
        &self.corpus_id
    }

    /// Number of indexed methods
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Always false: an empty corpus never produces an index
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Number of distinct features across the corpus
    pub fn distinct_features(&self) -> usize {
        self.postings.len()
    }

    /// Number of non-method members skipped at build time
    pub fn skipped_members(&self) -> usize {
        self.skipped
    }

    /// Indexed methods in corpus order
    pub fn methods(&self) -> &[IndexedMethod] {
        &self.methods
    }

    /// Method at a position
    pub fn method(&self, idx: MethodIdx) -> Option<&IndexedMethod> {
        self.methods.get(idx as usize)
    }

    /// Position of a method
    pub fn position(&self, id: &MethodId) -> Option<MethodIdx> {
        self.positions.get(id).copied()
    }

    /// Full feature list of a method
    pub fn full_features(&self, id: &MethodId) -> Option<&FeatureList> {
        self.position(id)
            .and_then(|idx| self.method(idx))
            .map(|method| &method.features)
    }

    /// Methods carrying `feature`; empty for unknown features
    pub fn lookup(&self, feature: &Feature) -> &[MethodIdx] {
        self.postings.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Methods carrying every feature in `features`
    ///
    /// The empty conjunction matches the whole corpus.
    pub fn ambiguity(&self, features: &[&Feature]) -> Vec<MethodIdx> {
        let lists: Vec<&[MethodIdx]> = features.iter().map(|f| self.lookup(f)).collect();
        postings::intersect_all(&lists).unwrap_or_else(|| (0..self.methods.len() as MethodIdx).collect())
    }

    /// Identifiers for a set of positions
    pub fn ids(&self, positions: &[MethodIdx]) -> Vec<MethodId> {
        positions
            .iter()
            .filter_map(|&idx| self.method(idx))
            .map(|method| method.id.clone())
            .collect()
    }
}
