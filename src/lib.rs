//! Maximum-weight matching in general (not necessarily bipartite) graphs.
//!
//! Given an edge list `(i, j, weight)`, compute a set of vertex-disjoint
//! edges with the largest possible number of pairs and, among those, the
//! largest total weight. Edmonds' primal-dual blossom method is used, so odd
//! cycles are handled exactly and the result is optimal, not greedy.
//!
//! Weights are integers. Ties between equally good matchings are broken by
//! input order.
//!
//! ```ignore
//! use mwmatch::{max_weight_matching, Matcher};
//!
//! let result = max_weight_matching(vec![(0, 1, 10), (2, 3, 5)])?;
//! assert_eq!(result.pairs, vec![(0, 1), (2, 3)]);
//!
//! // Weight alone, allowing fewer pairs:
//! let result = Matcher::new()
//!     .max_cardinality(false)
//!     .solve(vec![(0, 1, 1), (1, 2, 9), (2, 3, 1)])?;
//! assert_eq!(result.pairs, vec![(1, 2)]);
//! ```

mod blossom;
pub mod error;
pub mod graph;
pub mod keyed;
pub mod matching;

pub use error::MatchingError;
pub use graph::{edges_from_adjacency, Edge, Edges, Graph, Vertex, Weight};
pub use keyed::{match_keyed, KeyedMatch};
pub use matching::{max_weight_matching, MatchResult, Matcher};
