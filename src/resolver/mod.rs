//! Predicate matching against a loaded corpus

mod parser;
mod predicate;

use log::debug;
use serde::{Serialize, Deserialize};

use crate::analyzer::index::{FeatureIndex, IndexedMethod};
use crate::errors::{FingerprintError, FingerprintResult};
use crate::models::MethodId;

pub use self::parser::DslEvaluator;
pub use self::predicate::{Predicate, PredicateEvaluator};

/// Outcome of resolving a hand-written or generated predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// First matching method in corpus order
    pub method: MethodId,
    /// Other methods that also match, in corpus order
    pub additional_matches: Vec<MethodId>,
}

impl Resolution {
    /// Whether the predicate pinned exactly one method
    pub fn is_unique(&self) -> bool {
        self.additional_matches.is_empty()
    }
}

/// First method in corpus order satisfying `predicate`
///
/// Several matches are not an error here; callers that need uniqueness use
/// [`resolve_unique`].
pub fn resolve<'a>(predicate: &Predicate, index: &'a FeatureIndex) -> Option<&'a IndexedMethod> {
    index.methods().iter().find(|method| predicate.matches(&method.def))
}

/// Every method satisfying `predicate`, in corpus order
pub fn resolve_all<'a>(predicate: &Predicate, index: &'a FeatureIndex) -> Vec<&'a IndexedMethod> {
    index
        .methods()
        .iter()
        .filter(|method| predicate.matches(&method.def))
        .collect()
}

/// The single method satisfying `predicate`
///
/// Fails with `MatchNotFound` or `AmbiguousMatch`.
pub fn resolve_unique<'a>(predicate: &Predicate, index: &'a FeatureIndex) -> FingerprintResult<&'a IndexedMethod> {
    let mut matches = resolve_all(predicate, index);
    debug!("Predicate matched {} method(s) in {}", matches.len(), index.corpus_id());
    match matches.len() {
        0 => Err(FingerprintError::MatchNotFound),
        1 => Ok(matches.remove(0)),
        _ => Err(FingerprintError::AmbiguousMatch {
            matches: matches.into_iter().map(|m| m.id.clone()).collect(),
        }),
    }
}

/// Compile `source` and resolve it, reporting every match
pub fn resolve_source(
    evaluator: &dyn PredicateEvaluator,
    source: &str,
    index: &FeatureIndex,
) -> FingerprintResult<Resolution> {
    let predicate = evaluator.evaluate(source)?;
    let matches = resolve_all(&predicate, index);
    let (first, rest) = matches.split_first().ok_or(FingerprintError::MatchNotFound)?;
    Ok(Resolution {
        method: first.id.clone(),
        additional_matches: rest.iter().map(|m| m.id.clone()).collect(),
    })
}
