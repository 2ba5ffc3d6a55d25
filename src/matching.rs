//! Public entry points: configure a run, solve, read the pairs back.

use std::fmt::Display;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::blossom::BlossomState;
use crate::error::MatchingError;
use crate::graph::{Endpoint, Graph, Vertex, Weight};

/// Options for one matching run.
///
/// By default only maximum-cardinality matchings are considered, and the
/// optimality certificate is checked in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    max_cardinality: bool,
    verify: bool,
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher {
            max_cardinality: true,
            verify: cfg!(debug_assertions),
        }
    }
}

impl Matcher {
    pub fn new() -> Matcher {
        Matcher::default()
    }

    /// With `true`, maximise the number of pairs first and the weight second.
    /// With `false`, maximise weight alone; negative edges are then never
    /// used and a lighter matching may leave more vertices single.
    pub fn max_cardinality(&mut self, enabled: bool) -> &mut Self {
        self.max_cardinality = enabled;
        self
    }

    /// Check dual feasibility and complementary slackness after the search.
    /// A failed check panics, since it can only come from a bug.
    pub fn verify(&mut self, enabled: bool) -> &mut Self {
        self.verify = enabled;
        self
    }

    /// Validate `edges` and compute the matching.
    pub fn solve<V, I>(&self, edges: I) -> Result<MatchResult, MatchingError>
    where
        I: IntoIterator<Item = (V, V, Weight)>,
        V: TryInto<Vertex> + Copy + Display,
    {
        let graph = Graph::from_edges(edges)?;
        Ok(self.solve_graph(&graph))
    }

    /// Compute the matching of an already validated graph.
    pub fn solve_graph(&self, graph: &Graph) -> MatchResult {
        debug!(
            "matching {} vertices, {} edges (max cardinality: {})",
            graph.vertex_count(),
            graph.edge_count(),
            self.max_cardinality
        );

        let mate = if graph.edge_count() == 0 {
            vec![None; graph.vertex_count()]
        } else {
            BlossomState::new(graph, self.max_cardinality).solve(self.verify)
        };

        let result = MatchResult::from_mate_endpoints(graph, &mate);
        debug!(
            "matched {} pairs with total weight {}",
            result.cardinality(),
            result.weight
        );
        result
    }
}

/// Compute a maximum-cardinality matching of maximum weight.
///
/// ```ignore
/// let result = mwmatch::max_weight_matching(vec![(0, 1, 10), (1, 2, 5), (0, 2, 15)])?;
/// assert_eq!(result.pairs, vec![(0, 2)]);
/// assert_eq!(result.weight, 15);
/// ```
pub fn max_weight_matching<V, I>(edges: I) -> Result<MatchResult, MatchingError>
where
    I: IntoIterator<Item = (V, V, Weight)>,
    V: TryInto<Vertex> + Copy + Display,
{
    Matcher::default().solve(edges)
}

/// A matching and its total weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Matched pairs `(low, high)`, ordered by the lower vertex.
    pub pairs: Vec<(Vertex, Vertex)>,
    /// Sum of the weights of the input edges behind `pairs`.
    pub weight: Weight,
    /// `mates[v]` is the vertex paired with v, if any.
    pub mates: Vec<Option<Vertex>>,
}

impl MatchResult {
    fn from_mate_endpoints(graph: &Graph, mate: &[Option<Endpoint>]) -> MatchResult {
        let mates: Vec<Option<Vertex>> = mate.iter().map(|p| p.map(|p| graph.endpoint(p))).collect();
        for (v, m) in mates.iter().enumerate() {
            assert!(m.map_or(true, |w| mates[w] == Some(v)), "mate of {v} is not symmetric");
        }

        let mut pairs = vec![];
        let mut weight = 0;
        for (v, p) in mate.iter().enumerate() {
            if let Some(p) = *p {
                let w = graph.endpoint(p);
                if v < w {
                    pairs.push((v, w));
                    weight += graph.edges[p / 2].2;
                }
            }
        }

        MatchResult {
            pairs,
            weight,
            mates,
        }
    }

    /// The number of matched pairs.
    pub fn cardinality(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn mate(&self, v: Vertex) -> Option<Vertex> {
        self.mates.get(v).copied().flatten()
    }
}
