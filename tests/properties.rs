mod common;

use std::collections::HashSet;

use quickcheck::{quickcheck, Arbitrary, Gen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{brute_force, complete_graph, greedy, init_test_logger, random_graph, TestEdge};
use mwmatch::{MatchResult, Matcher};

/// Up to 15 edges over at most 10 vertices, with parallel edges, self-loops
/// and negative weights all allowed.
#[derive(Clone, Debug)]
struct SmallGraph(Vec<TestEdge>);

impl Arbitrary for SmallGraph {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = 1 + usize::arbitrary(g) % 10;
        let m = usize::arbitrary(g) % 16;
        let edges = (0..m)
            .map(|_| {
                (
                    usize::arbitrary(g) % n,
                    usize::arbitrary(g) % n,
                    i64::from(i8::arbitrary(g)),
                )
            })
            .collect();
        SmallGraph(edges)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(SmallGraph))
    }
}

fn solve(edges: &[TestEdge], max_cardinality: bool) -> MatchResult {
    Matcher::new()
        .max_cardinality(max_cardinality)
        .solve(edges.to_vec())
        .unwrap()
}

fn is_valid(edges: &[TestEdge], result: &MatchResult) -> bool {
    let mut seen = HashSet::new();
    let disjoint = result
        .pairs
        .iter()
        .all(|&(a, b)| a < b && seen.insert(a) && seen.insert(b));
    let present = result
        .pairs
        .iter()
        .all(|&(a, b)| edges.iter().any(|&(i, j, _)| (i, j) == (a, b) || (j, i) == (a, b)));
    let symmetric = result
        .pairs
        .iter()
        .all(|&(a, b)| result.mate(a) == Some(b) && result.mate(b) == Some(a));
    disjoint && present && symmetric && result.mates.iter().flatten().count() == 2 * result.pairs.len()
}

/// An optimal matching always uses the heaviest of any parallel edges.
fn heaviest_parallel_weight(edges: &[TestEdge], a: usize, b: usize) -> i64 {
    edges
        .iter()
        .filter(|&&(i, j, _)| (i, j) == (a, b) || (j, i) == (a, b))
        .map(|e| e.2)
        .max()
        .unwrap_or(i64::MIN)
}

quickcheck! {
    fn prop_matching_is_valid(graph: SmallGraph) -> bool {
        [true, false].iter().all(|&max_cardinality| is_valid(&graph.0, &solve(&graph.0, max_cardinality)))
    }

    fn prop_weight_is_sum_of_matched_edges(graph: SmallGraph) -> bool {
        [true, false].iter().all(|&max_cardinality| {
            let result = solve(&graph.0, max_cardinality);
            let sum: i64 = result
                .pairs
                .iter()
                .map(|&(a, b)| heaviest_parallel_weight(&graph.0, a, b))
                .sum();
            sum == result.weight
        })
    }

    fn prop_max_cardinality_is_optimal(graph: SmallGraph) -> bool {
        let result = solve(&graph.0, true);
        (result.cardinality(), result.weight) == brute_force(&graph.0, true)
    }

    fn prop_max_weight_is_optimal(graph: SmallGraph) -> bool {
        solve(&graph.0, false).weight == brute_force(&graph.0, false).1
    }

    fn prop_deterministic(graph: SmallGraph) -> bool {
        solve(&graph.0, true) == solve(&graph.0, true)
    }
}

#[test]
fn matches_brute_force_up_to_fifteen_vertices() {
    init_test_logger();

    let mut rng = StdRng::seed_from_u64(15);
    for _ in 0..10 {
        let n = rng.gen_range(10..=15);
        let edges = random_graph(&mut rng, n, 0.25, 1..=100);
        let result = solve(&edges, true);
        assert!(is_valid(&edges, &result));
        assert_eq!((result.cardinality(), result.weight), brute_force(&edges, true));
    }
}

#[test]
fn never_worse_than_greedy() {
    init_test_logger();

    let mut rng = StdRng::seed_from_u64(200);
    for _ in 0..20 {
        let n = rng.gen_range(60..=100);
        let edges = random_graph(&mut rng, n, 0.25, 1..=100);
        let result = solve(&edges, false);
        assert!(is_valid(&edges, &result));
        assert!(result.weight >= greedy(&edges).1);
    }
}

#[test]
fn perfect_matching_never_worse_than_greedy() {
    init_test_logger();

    // On a complete graph with an even vertex count greedy is perfect too,
    // so both compete over the same cardinality.
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let n = 2 * rng.gen_range(5..=30);
        let edges = complete_graph(&mut rng, n, -50..=50);
        let result = solve(&edges, true);
        let (greedy_card, greedy_weight) = greedy(&edges);
        assert_eq!(result.cardinality(), n / 2);
        assert_eq!(greedy_card, n / 2);
        assert!(result.weight >= greedy_weight);
    }
}
