//! Minimal distinguishing feature set search
//!
//! For a target method the solver looks for small subsets of its features
//! whose posting lists intersect to the target alone. Finding the smallest
//! such subset is set cover in disguise, so the search is greedy:
//!
//! 1. Rank the features (several rankings, see [`Strategy`]).
//! 2. Walk the ranking, keeping each feature that narrows the running
//!    intersection, until only the target is left.
//! 3. Drop features again, last added first, while the set stays unique.
//!
//! Step 3 makes every returned set locally minimal: no single feature can
//! be removed. Short feature lists additionally get a bounded exhaustive
//! pass over all subsets of up to `exhaustive_max_size` features, which
//! finds the true minimum when it is that small.

use log::{debug, info, warn};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analyzer::index::{FeatureIndex, MethodIdx};
use crate::constants::defaults;
use crate::errors::{FingerprintError, FingerprintResult};
use crate::models::{FeatureList, MethodId, MinimalFeatureSet, Strategy};
use crate::utils::postings;

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Upper bound on returned sets (at least one is always returned)
    pub max_sets: usize,
    /// Feature lists up to this length also get an exhaustive pass
    pub exhaustive_feature_limit: usize,
    /// Largest subset size the exhaustive pass tries
    pub exhaustive_max_size: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_sets: defaults::MAX_SETS,
            exhaustive_feature_limit: defaults::EXHAUSTIVE_FEATURE_LIMIT,
            exhaustive_max_size: defaults::EXHAUSTIVE_MAX_SIZE,
        }
    }
}

/// Best-effort cancellation signal shared with a running search
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the search to stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Distinguishing set solver
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Create a new solver
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver settings in use
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find minimal feature sets that identify `target`
    ///
    /// Sets come back shortest first, ties ordered by their feature
    /// positions in the target's feature list. Fails with
    /// `NoDistinguishingSet` when the full feature list already matches
    /// another method.
    pub fn solve(&self, target: &MethodId, index: &FeatureIndex) -> FingerprintResult<Vec<MinimalFeatureSet>> {
        self.solve_with_cancel(target, index, &CancelFlag::default())
    }

    /// Like [`Solver::solve`], checking `cancel` between search strategies
    pub fn solve_with_cancel(
        &self,
        target: &MethodId,
        index: &FeatureIndex,
        cancel: &CancelFlag,
    ) -> FingerprintResult<Vec<MinimalFeatureSet>> {
        let target_idx = index
            .position(target)
            .ok_or_else(|| FingerprintError::UnknownMethod(target.clone()))?;
        let features = index
            .full_features(target)
            .ok_or_else(|| FingerprintError::UnknownMethod(target.clone()))?;

        let search = Search::new(target_idx, features, index);

        let full = search.ambiguity(&search.all());
        if full.len() > 1 {
            let twins: Vec<MethodIdx> = full.into_iter().filter(|&idx| idx != target_idx).collect();
            warn!("{} shares every feature with {} other method(s)", target, twins.len());
            return Err(FingerprintError::NoDistinguishingSet {
                method: target.clone(),
                twins: index.ids(&twins),
            });
        }

        if index.len() == 1 {
            debug!("{} is the only method in the corpus", target);
            return Ok(vec![search.finish(target, Vec::new(), Strategy::Exhaustive)]);
        }

        let max_sets = self.config.max_sets.max(1);
        let mut found: Vec<(Vec<usize>, Strategy)> = Vec::new();

        if features.len() <= self.config.exhaustive_feature_limit {
            found.extend(
                search
                    .exhaustive(self.config.exhaustive_max_size, max_sets)
                    .into_iter()
                    .map(|set| (set, Strategy::Exhaustive)),
            );
        }

        for strategy in [Strategy::RarityAscending, Strategy::ExtractionOrder, Strategy::RarityDescending] {
            if cancel.is_cancelled() {
                debug!("Search for {} cancelled", target);
                return Err(FingerprintError::Cancelled);
            }
            let order = search.ranking(strategy);
            let chosen = search.greedy(&order);
            let minimal = search.shrink(chosen);
            found.push((minimal, strategy));
        }

        let mut seen = HashSet::new();
        found.retain(|(set, _)| seen.insert(set.clone()));
        // Stable sort keeps the earliest strategy for equal sets
        found.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        found.truncate(max_sets);

        info!(
            "Found {} minimal feature set(s) for {} (smallest has {} of {} features)",
            found.len(),
            target,
            found.first().map(|(set, _)| set.len()).unwrap_or(0),
            features.len()
        );

        Ok(found
            .into_iter()
            .map(|(set, strategy)| search.finish(target, set, strategy))
            .collect())
    }
}

/// Per-request search state over one target's features
struct Search<'a> {
    target_idx: MethodIdx,
    features: &'a FeatureList,
    lists: Vec<&'a [MethodIdx]>,
    corpus_len: usize,
}

impl<'a> Search<'a> {
    fn new(target_idx: MethodIdx, features: &'a FeatureList, index: &'a FeatureIndex) -> Self {
        let lists = features.iter().map(|feature| index.lookup(feature)).collect();
        Self {
            target_idx,
            features,
            lists,
            corpus_len: index.len(),
        }
    }

    fn all(&self) -> Vec<usize> {
        (0..self.features.len()).collect()
    }

    /// Methods matching every feature at `subset`
    fn ambiguity(&self, subset: &[usize]) -> Vec<MethodIdx> {
        let lists: Vec<&[MethodIdx]> = subset.iter().map(|&i| self.lists[i]).collect();
        postings::intersect_all(&lists).unwrap_or_else(|| (0..self.corpus_len as MethodIdx).collect())
    }

    /// Whether the features at `subset` match the target alone
    ///
    /// Every list contains the target, so the running intersection can stop
    /// as soon as it is down to one entry.
    fn is_unique(&self, subset: &[usize]) -> bool {
        let mut lists: Vec<&[MethodIdx]> = subset.iter().map(|&i| self.lists[i]).collect();
        lists.sort_by_key(|list| list.len());

        let Some((first, rest)) = lists.split_first() else {
            return self.corpus_len == 1;
        };
        let mut running = first.to_vec();
        for list in rest {
            if running.len() <= 1 {
                break;
            }
            running = postings::intersect(&running, list);
        }
        debug_assert!(running.contains(&self.target_idx));
        running.len() == 1
    }

    /// Feature positions in the order a strategy visits them
    fn ranking(&self, strategy: Strategy) -> Vec<usize> {
        let mut order = self.all();
        match strategy {
            Strategy::RarityAscending => order.sort_by_key(|&i| (self.lists[i].len(), i)),
            Strategy::RarityDescending => order.sort_by_key(|&i| (Reverse(self.lists[i].len()), i)),
            Strategy::ExtractionOrder | Strategy::Exhaustive => {}
        }
        order
    }

    /// Forward pass: keep features that narrow the match until it is unique
    fn greedy(&self, order: &[usize]) -> Vec<usize> {
        let mut chosen = Vec::new();
        let mut running: Option<Vec<MethodIdx>> = None;

        for &i in order {
            let next = match &running {
                None => self.lists[i].to_vec(),
                Some(current) => {
                    let next = postings::intersect(current, self.lists[i]);
                    if next.len() == current.len() {
                        continue;
                    }
                    next
                }
            };
            chosen.push(i);
            let done = next.len() == 1;
            running = Some(next);
            if done {
                break;
            }
        }
        chosen
    }

    /// Backward pass: drop features, last added first, while still unique
    fn shrink(&self, mut chosen: Vec<usize>) -> Vec<usize> {
        loop {
            let mut removed = false;
            for pos in (0..chosen.len()).rev() {
                let mut candidate = chosen.clone();
                candidate.remove(pos);
                if self.is_unique(&candidate) {
                    chosen = candidate;
                    removed = true;
                }
            }
            if !removed {
                break;
            }
        }
        chosen.sort_unstable();
        chosen
    }

    /// Every unique subset of the smallest size up to `max_size` that has
    /// one, in lexicographic order, at most `limit` of them
    fn exhaustive(&self, max_size: usize, limit: usize) -> Vec<Vec<usize>> {
        let n = self.features.len();
        for size in 1..=max_size.min(n) {
            let mut found = Vec::new();
            let mut comb: Vec<usize> = (0..size).collect();
            loop {
                if self.is_unique(&comb) {
                    found.push(comb.clone());
                    if found.len() >= limit {
                        break;
                    }
                }
                if !next_combination(&mut comb, n) {
                    break;
                }
            }
            if !found.is_empty() {
                debug!("Exhaustive search found {} set(s) of size {}", found.len(), size);
                return found;
            }
        }
        Vec::new()
    }

    fn finish(&self, target: &MethodId, indices: Vec<usize>, strategy: Strategy) -> MinimalFeatureSet {
        MinimalFeatureSet {
            target: target.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            indices,
            strategy,
        }
    }
}

/// Advance `comb` to the next k-combination of `0..n` in lexicographic order
fn next_combination(comb: &mut [usize], n: usize) -> bool {
    let k = comb.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if comb[i] < n - k + i {
            comb[i] += 1;
            for j in i + 1..k {
                comb[j] = comb[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::next_combination;

    #[test]
    fn test_next_combination_enumerates_all() {
        let mut comb = vec![0, 1];
        let mut seen = vec![comb.clone()];
        while next_combination(&mut comb, 4) {
            seen.push(comb.clone());
        }
        assert_eq!(
            seen,
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]
        );
    }
}
