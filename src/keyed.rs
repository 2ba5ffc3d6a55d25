//! Matching over caller-supplied identities instead of dense vertex indices.

use std::hash::Hash;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::MatchingError;
use crate::graph::Weight;
use crate::matching::Matcher;

/// Pairs of keys chosen by the matching and their total weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedMatch<K> {
    pub pairs: Vec<(K, K)>,
    pub weight: Weight,
}

impl Matcher {
    /// Like [`Matcher::solve`], but vertices are arbitrary keys.
    ///
    /// Keys are numbered in order of first appearance, so pairs come back in
    /// that order too: each pair is `(earlier key, later key)`.
    pub fn solve_keyed<K, I>(&self, edges: I) -> Result<KeyedMatch<K>, MatchingError>
    where
        K: Eq + Hash + Clone,
        I: IntoIterator<Item = (K, K, Weight)>,
    {
        let mut keys = IndexSet::new();
        let indexed: Vec<(usize, usize, Weight)> = edges
            .into_iter()
            .map(|(a, b, wt)| (keys.insert_full(a).0, keys.insert_full(b).0, wt))
            .collect();

        let result = self.solve(indexed)?;
        let key = |v: usize| keys.get_index(v).cloned().expect("matched vertex has a key");
        Ok(KeyedMatch {
            pairs: result.pairs.iter().map(|&(v, w)| (key(v), key(w))).collect(),
            weight: result.weight,
        })
    }
}

/// Compute a maximum-cardinality, maximum-weight matching between keys.
pub fn match_keyed<K, I>(edges: I) -> Result<KeyedMatch<K>, MatchingError>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, K, Weight)>,
{
    Matcher::default().solve_keyed(edges)
}
