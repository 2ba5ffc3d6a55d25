use std::time::Instant;

use rand::Rng;

use mwmatch::{Edges, Matcher, Vertex, Weight};

const N: Vertex = 1000;

fn main() {
    env_logger::init();

    let mut rng = rand::thread_rng();
    let mut edges: Edges = vec![];
    for i in 0..N - 1 {
        for j in i + 1..N {
            let wt: Weight = rng.gen_range(-50..50);
            edges.push((i, j, wt));
        }
    }

    let now = Instant::now();
    let result = Matcher::new()
        .verify(false)
        .solve(edges)
        .expect("generated edges are valid");
    println!(
        "{} pairs, weight {}; elapsed time: {:?}",
        result.cardinality(),
        result.weight,
        now.elapsed()
    );
}
