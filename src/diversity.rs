//! Diversity-aware selection
//!
//! Plain top-K by base score tends to return the same dominant recipe with a
//! different side dish each time. The selector picks greedily instead: every
//! round rescores the remaining pool as
//!
//! `final = base - strength * max_jaccard(plan, already_selected)`
//!
//! and takes the best. Plans whose composition equals an earlier pick are
//! never selected, so returned plans are pairwise distinct.

use std::collections::BTreeSet;

/// Penalty strength applied to the maximum Jaccard overlap
pub const DIVERSITY_STRENGTH: f64 = 0.4;

/// One entry of the selection pool
#[derive(Debug, Clone)]
pub struct DiversityCandidate<'a> {
    pub base_score: f64,
    /// Identity of the plan's parts (recipe names)
    pub members: BTreeSet<&'a str>,
}

/// A selected pool entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Index into the pool handed to [`DiversitySelector::select`]
    pub index: usize,
    pub final_score: f64,
    pub penalty: f64,
}

/// Greedy selector penalizing overlap with earlier picks
#[derive(Debug, Clone, Copy)]
pub struct DiversitySelector {
    strength: f64,
}

impl Default for DiversitySelector {
    fn default() -> Self {
        Self::new(DIVERSITY_STRENGTH)
    }
}

impl DiversitySelector {
    pub fn new(strength: f64) -> Self {
        Self { strength }
    }

    /// Select up to `k` entries. Returns fewer when the pool runs out.
    ///
    /// Ties keep pool order, so the result is deterministic for a given pool.
    pub fn select(&self, pool: &[DiversityCandidate<'_>], k: usize) -> Vec<Selection> {
        let mut taken = vec![false; pool.len()];
        let mut selected: Vec<Selection> = Vec::with_capacity(k.min(pool.len()));

        while selected.len() < k {
            let mut best: Option<Selection> = None;

            for (index, candidate) in pool.iter().enumerate() {
                if taken[index] {
                    continue;
                }

                let mut max_similarity: f64 = 0.0;
                let mut duplicate = false;
                for pick in &selected {
                    let chosen = &pool[pick.index].members;
                    if *chosen == candidate.members {
                        duplicate = true;
                        break;
                    }
                    max_similarity = max_similarity.max(jaccard(&candidate.members, chosen));
                }
                if duplicate {
                    taken[index] = true;
                    continue;
                }

                let penalty = self.strength * max_similarity;
                let final_score = candidate.base_score - penalty;
                if best.map_or(true, |b| final_score > b.final_score) {
                    best = Some(Selection {
                        index,
                        final_score,
                        penalty,
                    });
                }
            }

            match best {
                Some(pick) => {
                    taken[pick.index] = true;
                    selected.push(pick);
                }
                None => break,
            }
        }

        selected
    }
}

/// Intersection over union; two empty sets are treated as disjoint
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
