//! Reference matchers and graph generators shared by the integration tests.
#![allow(dead_code)]

use std::cmp::Reverse;
use std::sync::OnceLock;

use rand::Rng;

pub type TestEdge = (usize, usize, i64);

pub fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Highest weight first, skipping any edge whose endpoint is already used.
/// Returns (cardinality, weight).
pub fn greedy(edges: &[TestEdge]) -> (usize, i64) {
    let mut order: Vec<&TestEdge> = edges.iter().filter(|e| e.0 != e.1).collect();
    order.sort_by_key(|e| Reverse(e.2));

    let n = vertex_count(edges);
    let mut used = vec![false; n];
    let (mut card, mut weight) = (0, 0);
    for &&(i, j, wt) in &order {
        if !used[i] && !used[j] {
            used[i] = true;
            used[j] = true;
            card += 1;
            weight += wt;
        }
    }
    (card, weight)
}

/// Exhaustive search over all matchings. With `max_cardinality` the best is
/// the heaviest among the largest; otherwise simply the heaviest.
/// Returns (cardinality, weight).
pub fn brute_force(edges: &[TestEdge], max_cardinality: bool) -> (usize, i64) {
    let n = vertex_count(edges);
    let mut adj: Vec<Vec<(usize, i64)>> = vec![vec![]; n];
    for &(i, j, wt) in edges {
        if i != j {
            adj[i].push((j, wt));
            adj[j].push((i, wt));
        }
    }

    let mut best = (0, 0);
    let mut used = vec![false; n];
    search(0, &adj, &mut used, (0, 0), &mut best, max_cardinality);
    best
}

fn search(
    from: usize,
    adj: &[Vec<(usize, i64)>],
    used: &mut [bool],
    current: (usize, i64),
    best: &mut (usize, i64),
    max_cardinality: bool,
) {
    let Some(u) = (from..used.len()).find(|&u| !used[u]) else {
        let better = if max_cardinality {
            current > *best
        } else {
            current.1 > best.1
        };
        if better {
            *best = current;
        }
        return;
    };

    used[u] = true;
    // u stays single
    search(u + 1, adj, used, current, best, max_cardinality);
    for &(w, wt) in &adj[u] {
        if !used[w] {
            used[w] = true;
            search(u + 1, adj, used, (current.0 + 1, current.1 + wt), best, max_cardinality);
            used[w] = false;
        }
    }
    used[u] = false;
}

pub fn vertex_count(edges: &[TestEdge]) -> usize {
    edges.iter().map(|e| e.0.max(e.1) + 1).max().unwrap_or(0)
}

/// Each pair of the `n` vertices is joined with probability `p`; weights are
/// drawn from `weights`. At least one edge is always present.
pub fn random_graph<R: Rng>(rng: &mut R, n: usize, p: f64, weights: std::ops::RangeInclusive<i64>) -> Vec<TestEdge> {
    let mut edges = vec![];
    for i in 0..n {
        for j in i + 1..n {
            if rng.gen_bool(p) {
                edges.push((i, j, rng.gen_range(weights.clone())));
            }
        }
    }
    if edges.is_empty() {
        edges.push((0, 1, *weights.end()));
    }
    edges
}

pub fn complete_graph<R: Rng>(rng: &mut R, n: usize, weights: std::ops::RangeInclusive<i64>) -> Vec<TestEdge> {
    random_graph(rng, n, 1.0, weights)
}
