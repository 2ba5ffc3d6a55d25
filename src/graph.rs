//! Validated edge lists and the endpoint tables the blossom search walks.

use std::fmt::Display;

use log::debug;

use crate::error::MatchingError;

pub type Vertex = usize;
pub type Weight = i64;
pub type Edge = (Vertex, Vertex, Weight); // i, j, wt
pub type Edges = Vec<Edge>;

/// Index of one directed end of an edge. Endpoints `2k` and `2k + 1` both
/// belong to edge `k`, and `p ^ 1` is the opposite end of `p`.
pub type Endpoint = usize;

/// An undirected weighted graph ready for matching.
///
/// Vertices are numbered `0 .. vertex_count()`, where the count is one more
/// than the largest id seen in the input. Self-loops widen the vertex range
/// but are otherwise dropped, since no vertex can be matched to itself.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) nvertex: usize,
    pub(crate) edges: Edges,

    // endpoint[p] is the vertex to which endpoint p is attached.
    pub(crate) endpoint: Vec<Vertex>,

    // neighbend[v] lists the remote endpoints of the edges incident to v.
    pub(crate) neighbend: Vec<Vec<Endpoint>>,

    pub(crate) max_weight: Weight,
}

impl Graph {
    /// Validate an edge list and build the endpoint tables.
    ///
    /// Vertex ids may be any integer type; negative ids are rejected with
    /// [`MatchingError::InvalidVertex`]. Each weight must satisfy
    /// `|w| <= i64::MAX / (4 * (n + 1))` so that the doubled dual variables
    /// cannot overflow.
    pub fn from_edges<V, I>(edges: I) -> Result<Graph, MatchingError>
    where
        I: IntoIterator<Item = (V, V, Weight)>,
        V: TryInto<Vertex> + Copy + Display,
    {
        let mut nvertex = 0;
        let mut checked: Vec<(usize, Edge)> = vec![];

        for (k, (i, j, wt)) in edges.into_iter().enumerate() {
            let i = vertex_index(k, i)?;
            let j = vertex_index(k, j)?;
            nvertex = nvertex.max(i + 1).max(j + 1);
            if i == j {
                debug!("edge {k} is a self-loop on vertex {i}; ignoring it");
                continue;
            }
            checked.push((k, (i, j, wt)));
        }

        let limit = weight_limit(nvertex);
        for &(k, (_, _, wt)) in &checked {
            if wt.unsigned_abs() > limit.unsigned_abs() {
                return Err(MatchingError::WeightOutOfRange {
                    edge: k,
                    weight: wt,
                    limit,
                });
            }
        }

        let edges: Edges = checked.into_iter().map(|(_, edge)| edge).collect();
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);

        let endpoint = (0..2 * edges.len())
            .map(|p| if p % 2 == 0 { edges[p / 2].0 } else { edges[p / 2].1 })
            .collect();

        let mut neighbend = vec![vec![]; nvertex];
        for (k, &(i, j, _wt)) in edges.iter().enumerate() {
            neighbend[i].push(2 * k + 1);
            neighbend[j].push(2 * k);
        }

        Ok(Graph {
            nvertex,
            edges,
            endpoint,
            neighbend,
            max_weight,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.nvertex
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The usable edges, self-loops removed.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub(crate) fn endpoint(&self, p: Endpoint) -> Vertex {
        self.endpoint[p]
    }
}

fn vertex_index<V>(edge: usize, v: V) -> Result<Vertex, MatchingError>
where
    V: TryInto<Vertex> + Copy + Display,
{
    // 2 * n slots are allocated for vertices plus blossoms.
    match v.try_into() {
        Ok(index) if index < Vertex::MAX / 2 => Ok(index),
        _ => Err(MatchingError::InvalidVertex {
            edge,
            vertex: v.to_string(),
        }),
    }
}

/// Largest absolute weight whose doubled duals fit in a `Weight` for a graph
/// with `nvertex` vertices.
pub fn weight_limit(nvertex: usize) -> Weight {
    let scale = Weight::try_from(nvertex)
        .unwrap_or(Weight::MAX)
        .saturating_add(1)
        .saturating_mul(4);
    Weight::MAX / scale
}

/// Convert a square adjacency matrix into an edge list.
///
/// A missing edge is `None`; there is no reserved "no edge" weight. Only the
/// upper triangle is read, so `matrix[i][j]` for `i < j` supplies the weight
/// of edge `(i, j)` and the diagonal is ignored.
pub fn edges_from_adjacency(matrix: &[Vec<Option<Weight>>]) -> Result<Edges, MatchingError> {
    let n = matrix.len();
    let mut edges = vec![];
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != n {
            return Err(MatchingError::RaggedAdjacency {
                row: i,
                len: row.len(),
                expected: n,
            });
        }
        edges.extend(
            row.iter()
                .enumerate()
                .skip(i + 1)
                .filter_map(|(j, wt)| wt.map(|wt| (i, j, wt))),
        );
    }
    Ok(edges)
}
