use thiserror::Error;

use crate::graph::Weight;

/// Reasons an edge list is rejected before the matching search starts.
///
/// The search itself has no failure states; every variant here is a
/// precondition on the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    /// A vertex id that cannot be used as a dense non-negative index.
    #[error("edge {edge}: vertex id {vertex} is not a valid vertex index")]
    InvalidVertex { edge: usize, vertex: String },

    /// A weight so large that the dual variables could overflow.
    #[error("edge {edge}: weight {weight} is outside the supported range of +/-{limit}")]
    WeightOutOfRange {
        edge: usize,
        weight: Weight,
        limit: Weight,
    },

    #[error("adjacency row {row} has {len} entries, expected {expected}")]
    RaggedAdjacency {
        row: usize,
        len: usize,
        expected: usize,
    },
}
