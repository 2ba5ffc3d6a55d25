// Weighted maximum matching in general graphs.
//
// This is a Rust re-implementation of a Python program by Joris van Rantwijk.
// Nearly all of the comments are taken directly from that version.
// For his original code, go to http://jorisvr.nl/article/maximum-matching.
//
// The algorithm is taken from "Efficient Algorithms for Finding Maximum
// Matching in Graphs" by Zvi Galil, ACM Computing Surveys, 1986.
// It is based on the "blossom" method for finding augmenting paths and
// the "primal-dual" method for finding a matching of maximum weight, both
// due to Jack Edmonds.
// Some ideas came from "Implementation of algorithms for maximum matching
// on non-bipartite graphs" by H.J. Gabow, Stanford Ph.D. thesis, 1973.
//
// Vertices are numbered 0 .. (nvertex-1).
// Non-trivial blossoms are numbered nvertex .. (2*nvertex-1).
// Many terms used below (sub-blossom, T-vertex) come from the paper by
// Galil; read the paper before reading this code.
//
// Runs in O(n^3) time.

use log::trace;

use crate::graph::{Endpoint, Graph, Vertex, Weight};

/// Label of a top-level blossom during a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Free,
    /// S: outer, even distance from a tree root.
    Outer,
    /// T: inner, odd distance from a tree root.
    Inner,
    /// An S-blossom visited while tracing back in `scan_blossom`.
    Breadcrumb,
}

/// How the dual variables were changed when the search stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delta {
    /// No further improvement possible.
    Exhausted,
    /// Edge from an S-blossom to a free vertex became tight.
    FreeEdge(usize),
    /// Edge between two S-blossoms became tight.
    OuterEdge(usize),
    /// A T-blossom reached zero dual and must be expanded.
    Expand(usize),
}

/// Per-run state of the primal-dual blossom search.
///
/// One instance lives for exactly one call of [`BlossomState::solve`]; nothing
/// in it survives the run.
pub(crate) struct BlossomState<'g> {
    graph: &'g Graph,
    nvertex: usize,
    max_cardinality: bool,
    // Cross-check the incrementally tracked least-slack edges before every
    // dual update (debug builds only).
    check_delta: bool,

    // If v is a vertex, mate[v] is the remote endpoint of its matched edge,
    // or None if it is single (i.e. endpoint[mate[v]] is v's partner).
    mate: Vec<Option<Endpoint>>,

    // If b is a top-level blossom, label[b] is its label. The label of a
    // vertex is found by looking at the label of its top-level blossom.
    // If v is a vertex inside a T-blossom, label[v] is Inner iff v is
    // reachable from an S-vertex outside the blossom.
    label: Vec<Label>,

    // If b is a labeled top-level blossom, label_end[b] is the remote
    // endpoint of the edge through which b obtained its label, or None if
    // b's base vertex is single.
    // If v is a vertex inside a T-blossom and label[v] is Inner,
    // label_end[v] is the remote endpoint of the edge through which v is
    // reachable from outside the blossom.
    label_end: Vec<Option<Endpoint>>,

    // in_blossom[v] is the top-level blossom to which vertex v belongs.
    in_blossom: Vec<usize>,

    // Immediate parent (sub-)blossom, or None for a top-level blossom.
    blossom_parent: Vec<Option<usize>>,

    // Ordered sub-blossoms of a non-trivial blossom, starting with the base
    // and going round the blossom.
    blossom_children: Vec<Vec<usize>>,

    // Base vertex of a (sub-)blossom; None for an unused blossom slot.
    blossom_base: Vec<Option<Vertex>>,

    // blossom_endps[b][i] is the local endpoint of blossom_children[b][i] on
    // the edge that connects it to blossom_children[b][i + 1] (wrapping).
    blossom_endps: Vec<Vec<Endpoint>>,

    // If v is a free vertex (or an unreached vertex inside a T-blossom),
    // best_edge[v] is the least-slack edge to an S-vertex.
    // If b is a top-level S-blossom, best_edge[b] is the least-slack edge to
    // a different S-blossom.
    best_edge: Vec<Option<usize>>,

    // Least-slack edges from a non-trivial top-level S-blossom to each
    // neighbouring S-blossom; None if not computed yet.
    blossom_best_edges: Vec<Option<Vec<usize>>>,

    unused_blossoms: Vec<usize>,

    // dual[v] = 2 * u(v) for a vertex, so duals stay integral.
    // dual[b] = z(b) for a non-trivial blossom.
    dual: Vec<Weight>,

    // allow_edge[k] means edge k is known to have zero slack.
    allow_edge: Vec<bool>,

    // Newly discovered S-vertices.
    queue: Vec<Vertex>,
}

impl<'g> BlossomState<'g> {
    pub(crate) fn new(graph: &'g Graph, max_cardinality: bool) -> BlossomState<'g> {
        let n = graph.nvertex;
        let nedge = graph.edges.len();

        let mut blossom_base: Vec<Option<Vertex>> = (0..n).map(Some).collect();
        blossom_base.resize(2 * n, None);

        let mut dual = vec![graph.max_weight; n];
        dual.resize(2 * n, 0);

        BlossomState {
            graph,
            nvertex: n,
            max_cardinality,
            check_delta: false,
            mate: vec![None; n],
            label: vec![Label::Free; 2 * n],
            label_end: vec![None; 2 * n],
            in_blossom: (0..n).collect(),
            blossom_parent: vec![None; 2 * n],
            blossom_children: vec![vec![]; 2 * n],
            blossom_base,
            blossom_endps: vec![vec![]; 2 * n],
            best_edge: vec![None; 2 * n],
            blossom_best_edges: vec![None; 2 * n],
            unused_blossoms: (n..2 * n).collect(),
            dual,
            allow_edge: vec![false; nedge],
            queue: vec![],
        }
    }

    /// Run stages until no augmenting path remains and return the mate
    /// endpoint of every vertex.
    pub(crate) fn solve(mut self, verify: bool) -> Vec<Option<Endpoint>> {
        let n = self.nvertex;
        let mut augmentations = 0;
        self.check_delta = verify && cfg!(debug_assertions);

        // Each stage finds one augmenting path, so at most n stages run.
        for stage in 0..n {
            trace!("stage {stage}: {augmentations} augmentations so far");
            self.reset_labels();

            if !self.run_stage() {
                break;
            }
            augmentations += 1;

            // End of a stage; expand all S-blossoms which have zero dual.
            for b in n..2 * n {
                if self.blossom_parent[b].is_none()
                    && self.blossom_base[b].is_some()
                    && self.label[b] == Label::Outer
                    && self.dual[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }
        trace!("search finished after {augmentations} augmentations");

        if verify {
            self.verify_optimum();
        }
        self.mate
    }

    /// Phase A: clear labels and root a tree at every single vertex.
    fn reset_labels(&mut self) {
        let n = self.nvertex;
        self.label.fill(Label::Free);
        self.best_edge.fill(None);
        for b in n..2 * n {
            self.blossom_best_edges[b] = None;
        }
        // Loss of labeling means that we can not be sure that currently
        // allowable edges remain allowable throughout this stage.
        self.allow_edge.fill(false);
        self.queue.clear();

        for v in 0..n {
            if self.mate[v].is_none() && self.label[self.in_blossom[v]] == Label::Free {
                self.assign_label(v, Label::Outer, None);
            }
        }
    }

    /// Alternate label propagation and dual adjustment until the matching is
    /// augmented (true) or no augmenting path exists (false).
    fn run_stage(&mut self) -> bool {
        loop {
            if self.propagate() {
                return true;
            }

            if self.check_delta {
                self.check_delta2();
                self.check_delta3();
            }
            let (delta, action) = self.choose_delta();
            trace!("delta {delta} via {action:?}");
            self.apply_delta(delta);

            match action {
                Delta::Exhausted => return false,
                Delta::FreeEdge(k) => {
                    self.allow_edge[k] = true;
                    let (i, j, _wt) = self.graph.edges[k];
                    let i = if self.label[self.in_blossom[i]] == Label::Free { j } else { i };
                    debug_assert_eq!(self.label[self.in_blossom[i]], Label::Outer);
                    self.queue.push(i);
                }
                Delta::OuterEdge(k) => {
                    self.allow_edge[k] = true;
                    let (i, _j, _wt) = self.graph.edges[k];
                    debug_assert_eq!(self.label[self.in_blossom[i]], Label::Outer);
                    self.queue.push(i);
                }
                Delta::Expand(b) => self.expand_blossom(b, false),
            }
        }
    }

    // Return 2 * slack of edge k (does not work inside blossoms).
    #[inline]
    fn slack(&self, k: usize) -> Weight {
        let (i, j, wt) = self.graph.edges[k];
        self.dual[i] + self.dual[j] - 2 * wt
    }

    #[inline]
    fn base(&self, b: usize) -> Vertex {
        self.blossom_base[b].expect("blossom slot is in use")
    }

    #[inline]
    fn child_at(&self, b: usize, j: isize) -> usize {
        let children = &self.blossom_children[b];
        children[ring_index(children.len(), j)]
    }

    #[inline]
    fn endp_at(&self, b: usize, j: isize) -> Endpoint {
        let endps = &self.blossom_endps[b];
        endps[ring_index(endps.len(), j)]
    }

    /// The leaf vertices of a blossom, in ring order.
    fn blossom_leaves(&self, b: usize) -> Vec<Vertex> {
        let mut leaves = vec![];
        let mut stack = vec![b];
        while let Some(t) = stack.pop() {
            if t < self.nvertex {
                leaves.push(t);
            } else {
                stack.extend(self.blossom_children[t].iter().rev());
            }
        }
        leaves
    }

    /// Assign label t to the top-level blossom containing vertex w and record
    /// that w was reached through the edge with remote endpoint p.
    fn assign_label(&mut self, w: Vertex, t: Label, p: Option<Endpoint>) {
        let b = self.in_blossom[w];
        debug_assert!(self.label[w] == Label::Free && self.label[b] == Label::Free);

        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = None;
        self.best_edge[b] = None;

        match t {
            Label::Outer => {
                // b became an S-vertex/blossom; add its vertices to the queue.
                let leaves = self.blossom_leaves(b);
                self.queue.extend(leaves);
            }
            Label::Inner => {
                // b became a T-vertex/blossom; assign label S to its mate.
                // (If b is a non-trivial blossom, its base is the only vertex
                // with an external mate.)
                let base = self.base(b);
                let mbase = self.mate[base].expect("T-blossom base is matched");
                self.assign_label(self.graph.endpoint(mbase), Label::Outer, Some(mbase ^ 1));
            }
            Label::Free | Label::Breadcrumb => unreachable!("only S and T labels are assigned"),
        }
    }

    /// Phase B: scan queued S-vertices until an augmentation happens or the
    /// queue runs dry.
    fn propagate(&mut self) -> bool {
        let graph = self.graph;

        while let Some(v) = self.queue.pop() {
            debug_assert_eq!(self.label[self.in_blossom[v]], Label::Outer);

            for &p in &graph.neighbend[v] {
                let k = p / 2;
                let w = graph.endpoint(p);
                if self.in_blossom[v] == self.in_blossom[w] {
                    // this edge is internal to a blossom; ignore it
                    continue;
                }

                let mut kslack = 0;
                if !self.allow_edge[k] {
                    kslack = self.slack(k);
                    if kslack <= 0 {
                        self.allow_edge[k] = true;
                    }
                }

                if self.allow_edge[k] {
                    match self.label[self.in_blossom[w]] {
                        Label::Free => {
                            // w is a free vertex;
                            // label w with T and label its mate with S.
                            self.assign_label(w, Label::Inner, Some(p ^ 1));
                        }
                        Label::Outer => {
                            // w is an S-vertex in another blossom; follow
                            // back-links to discover either an augmenting
                            // path or a new blossom.
                            match self.scan_blossom(v, w) {
                                Some(base) => self.add_blossom(base, k),
                                None => {
                                    self.augment_matching(k);
                                    return true;
                                }
                            }
                        }
                        _ if self.label[w] == Label::Free => {
                            // w is inside a T-blossom but has not been reached
                            // from outside it yet; mark it as reached, which
                            // T-blossom expansion needs for relabeling.
                            debug_assert_eq!(self.label[self.in_blossom[w]], Label::Inner);
                            self.label[w] = Label::Inner;
                            self.label_end[w] = Some(p ^ 1);
                        }
                        _ => {}
                    }
                } else if self.label[self.in_blossom[w]] == Label::Outer {
                    // keep track of the least-slack non-allowable edge to a
                    // different S-blossom.
                    let b = self.in_blossom[v];
                    if self.best_edge[b].map_or(true, |be| kslack < self.slack(be)) {
                        self.best_edge[b] = Some(k);
                    }
                } else if self.label[w] == Label::Free {
                    // w is free (or an unreached vertex inside a T-blossom) but
                    // can not be reached yet; keep the least-slack edge to it.
                    if self.best_edge[w].map_or(true, |be| kslack < self.slack(be)) {
                        self.best_edge[w] = Some(k);
                    }
                }
            }
        }
        false
    }

    /// Trace back from vertices v and w to discover either a new blossom or an
    /// augmenting path. Return the base vertex of the new blossom, if any.
    fn scan_blossom(&mut self, v: Vertex, w: Vertex) -> Option<Vertex> {
        let graph = self.graph;
        let mut path = vec![];
        let mut base = None;
        let mut v = Some(v);
        let mut w = Some(w);

        while let Some(cur) = v {
            // Look for a breadcrumb in v's blossom or put a new breadcrumb.
            let b = self.in_blossom[cur];
            if self.label[b] == Label::Breadcrumb {
                base = self.blossom_base[b];
                break;
            }
            debug_assert_eq!(self.label[b], Label::Outer);
            path.push(b);
            self.label[b] = Label::Breadcrumb;

            // Trace one step back.
            debug_assert_eq!(self.label_end[b], self.mate[self.base(b)]);
            v = self.label_end[b].map(|p| {
                let t = self.in_blossom[graph.endpoint(p)];
                debug_assert_eq!(self.label[t], Label::Inner);
                // t is a T-blossom; trace one more step back.
                let q = self.label_end[t].expect("T-blossom has a label edge");
                graph.endpoint(q)
            });

            // Alternate between both paths.
            if w.is_some() {
                std::mem::swap(&mut v, &mut w);
            }
        }

        for b in path {
            self.label[b] = Label::Outer;
        }
        base
    }

    /// Phase C: construct a new blossom with the given base, closed by edge
    /// k which connects a pair of S-vertices. Label it S with zero dual and
    /// queue its former T-vertices.
    fn add_blossom(&mut self, base: Vertex, k: usize) {
        let graph = self.graph;
        let n = self.nvertex;
        let (v, w, _wt) = graph.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let b = self
            .unused_blossoms
            .pop()
            .expect("at most n - 1 blossoms exist at once");
        trace!("contracting blossom {b} with base {base} through edge {k}");
        self.blossom_base[b] = Some(base);
        self.blossom_parent[b] = None;
        self.blossom_parent[bb] = Some(b);

        let mut children = vec![];
        let mut endps = vec![];

        // Trace back from v to base.
        while bv != bb {
            self.blossom_parent[bv] = Some(b);
            children.push(bv);
            let p = self.label_end[bv].expect("sub-blossom has a label edge");
            debug_assert!(
                self.label[bv] == Label::Inner
                    || (self.label[bv] == Label::Outer
                        && self.label_end[bv] == self.mate[self.base(bv)])
            );
            endps.push(p);
            bv = self.in_blossom[graph.endpoint(p)];
        }

        // Reverse lists, add endpoint that connects the pair of S vertices.
        children.push(bb);
        children.reverse();
        endps.reverse();
        endps.push(2 * k);

        // Trace back from w to base.
        while bw != bb {
            self.blossom_parent[bw] = Some(b);
            children.push(bw);
            let p = self.label_end[bw].expect("sub-blossom has a label edge");
            endps.push(p ^ 1);
            bw = self.in_blossom[graph.endpoint(p)];
        }

        debug_assert_eq!(self.label[bb], Label::Outer);
        self.label[b] = Label::Outer;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0;
        self.blossom_children[b] = children;
        self.blossom_endps[b] = endps;

        for v in self.blossom_leaves(b) {
            if self.label[self.in_blossom[v]] == Label::Inner {
                // This T-vertex now turns into an S-vertex because it becomes
                // part of an S-blossom; add it to the queue.
                self.queue.push(v);
            }
            self.in_blossom[v] = b;
        }

        // Merge the least-slack edge lists of the sub-blossoms.
        let mut best_edge_to: Vec<Option<usize>> = vec![None; 2 * n];
        for bv in self.blossom_children[b].clone() {
            let candidates: Vec<usize> = match self.blossom_best_edges[bv].take() {
                Some(list) => list,
                // No list yet for this sub-blossom; use its vertices' edges.
                None => self
                    .blossom_leaves(bv)
                    .into_iter()
                    .flat_map(move |v| graph.neighbend[v].iter().map(|p| p / 2))
                    .collect(),
            };
            for k in candidates {
                let (i, j, _wt) = graph.edges[k];
                let j = if self.in_blossom[j] == b { i } else { j };
                let bj = self.in_blossom[j];
                if bj != b
                    && self.label[bj] == Label::Outer
                    && best_edge_to[bj].map_or(true, |bk| self.slack(k) < self.slack(bk))
                {
                    best_edge_to[bj] = Some(k);
                }
            }
            self.best_edge[bv] = None;
        }

        let best_edges: Vec<usize> = best_edge_to.into_iter().flatten().collect();
        self.best_edge[b] = best_edges.iter().copied().min_by_key(|&k| self.slack(k));
        self.blossom_best_edges[b] = Some(best_edges);
    }

    /// Phase E: expand the given top-level blossom.
    ///
    /// Mid-stage only T-blossoms are expanded, and the alternating tree
    /// through them is rebuilt. At the end of a stage sub-blossoms with zero
    /// dual are expanded recursively.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) {
        let n = self.nvertex;
        trace!("expanding blossom {b} (end of stage: {end_stage})");

        // Convert sub-blossoms into top-level blossoms.
        for s in self.blossom_children[b].clone() {
            self.blossom_parent[s] = None;
            if s < n {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0 {
                self.expand_blossom(s, end_stage);
            } else {
                for v in self.blossom_leaves(s) {
                    self.in_blossom[v] = s;
                }
            }
        }

        if !end_stage && self.label[b] == Label::Inner {
            self.relabel_expanded(b);
        }

        // Recycle the blossom number.
        self.label[b] = Label::Free;
        self.label_end[b] = None;
        self.blossom_base[b] = None;
        self.best_edge[b] = None;
        self.blossom_children[b].clear();
        self.blossom_endps[b].clear();
        self.blossom_best_edges[b] = None;
        self.unused_blossoms.push(b);
    }

    /// Relabel the sub-blossoms of an expanding T-blossom so that the
    /// alternating tree stays intact.
    fn relabel_expanded(&mut self, b: usize) {
        let graph = self.graph;

        // Start at the sub-blossom through which the expanding blossom
        // obtained its label, and relabel sub-blossoms until we reach the
        // base.
        let mut p = self.label_end[b].expect("T-blossom has a label edge");
        let entry_child = self.in_blossom[graph.endpoint(p ^ 1)];
        let (mut j, jstep, endptrick) = self.ring_walk(b, entry_child);

        while j != 0 {
            // Relabel the T-sub-blossom.
            let q = graph.endpoint(p ^ 1);
            let e = self.endp_at(b, j - endptrick as isize);
            self.label[q] = Label::Free;
            self.label[graph.endpoint(e ^ endptrick ^ 1)] = Label::Free;
            self.assign_label(q, Label::Inner, Some(p));

            // Step to the next S-sub-blossom and note its forward endpoint.
            self.allow_edge[e / 2] = true;
            j += jstep;
            p = self.endp_at(b, j - endptrick as isize) ^ endptrick;

            // Step to the next T-sub-blossom.
            self.allow_edge[p / 2] = true;
            j += jstep;
        }

        // Relabel the base T-sub-blossom without stepping through to its
        // mate (so don't call assign_label).
        let bv = self.child_at(b, j);
        let q = graph.endpoint(p ^ 1);
        self.label[q] = Label::Inner;
        self.label[bv] = Label::Inner;
        self.label_end[q] = Some(p);
        self.label_end[bv] = Some(p);
        self.best_edge[bv] = None;

        // Continue along the blossom until we get back to entry_child.
        j += jstep;
        while self.child_at(b, j) != entry_child {
            let bv = self.child_at(b, j);
            j += jstep;
            if self.label[bv] == Label::Outer {
                // This sub-blossom just got label S through one of its
                // neighbours; leave it.
                continue;
            }
            // If the sub-blossom contains a vertex reachable from outside the
            // expanding blossom, assign label T to the sub-blossom.
            let reached = self
                .blossom_leaves(bv)
                .into_iter()
                .find(|&v| self.label[v] != Label::Free);
            if let Some(v) = reached {
                debug_assert_eq!(self.label[v], Label::Inner);
                debug_assert_eq!(self.in_blossom[v], bv);
                let mbase = self.mate[self.base(bv)].expect("sub-blossom base is matched");
                self.label[v] = Label::Free;
                self.label[graph.endpoint(mbase)] = Label::Free;
                let end = self.label_end[v];
                self.assign_label(v, Label::Inner, end);
            }
        }
    }

    /// Position of `child` in blossom b's ring and the direction that walks
    /// an even number of steps to the base: (start index, step, endpoint
    /// trick).
    fn ring_walk(&self, b: usize, child: usize) -> (isize, isize, usize) {
        let children = &self.blossom_children[b];
        let i = children
            .iter()
            .position(|&c| c == child)
            .expect("child belongs to the blossom");
        if i & 1 != 0 {
            // Start index is odd; go forward and wrap.
            (i as isize - children.len() as isize, 1, 0)
        } else {
            // Start index is even; go backward.
            (i as isize, -1, 1)
        }
    }

    /// Swap matched/unmatched edges over an alternating path through blossom b
    /// between vertex v and the base vertex, then rotate b so v is its base.
    fn augment_blossom(&mut self, b: usize, v: Vertex) {
        let graph = self.graph;
        let n = self.nvertex;

        // Bubble up through the blossom tree from vertex v to an immediate
        // sub-blossom of b.
        let mut t = v;
        while self.blossom_parent[t] != Some(b) {
            t = self.blossom_parent[t].expect("vertex lies inside the blossom");
        }

        // Recursively deal with the first sub-blossom.
        if t >= n {
            self.augment_blossom(t, v);
        }

        let (start, jstep, endptrick) = self.ring_walk(b, t);
        let mut j = start;

        // Move along the blossom until we get to the base.
        while j != 0 {
            // Step to the next sub-blossom and augment it recursively.
            j += jstep;
            let t = self.child_at(b, j);
            let p = self.endp_at(b, j - endptrick as isize) ^ endptrick;
            if t >= n {
                self.augment_blossom(t, graph.endpoint(p));
            }

            // Step to the next sub-blossom and augment it recursively.
            j += jstep;
            let t = self.child_at(b, j);
            if t >= n {
                self.augment_blossom(t, graph.endpoint(p ^ 1));
            }

            // Match the edge connecting those sub-blossoms.
            self.mate[graph.endpoint(p)] = Some(p ^ 1);
            self.mate[graph.endpoint(p ^ 1)] = Some(p);
        }

        // Rotate the list of sub-blossoms to put the new base at the front.
        let i = ring_index(self.blossom_children[b].len(), start);
        self.blossom_children[b].rotate_left(i);
        self.blossom_endps[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];
        debug_assert_eq!(self.blossom_base[b], Some(v));
    }

    /// Phase F: swap matched/unmatched edges over an alternating path between
    /// two single vertices. The path runs through edge k, which connects a
    /// pair of S-vertices.
    fn augment_matching(&mut self, k: usize) {
        let graph = self.graph;
        let n = self.nvertex;
        let (v, w, _wt) = graph.edges[k];
        trace!("augmenting through edge {k} ({v}, {w})");

        for (s, p) in [(v, 2 * k + 1), (w, 2 * k)] {
            // Match vertex s to remote endpoint p. Then trace back from s
            // until we find a single vertex, swapping matched and unmatched
            // edges as we go.
            let (mut s, mut p) = (s, p);
            loop {
                let bs = self.in_blossom[s];
                debug_assert_eq!(self.label[bs], Label::Outer);
                debug_assert_eq!(self.label_end[bs], self.mate[self.base(bs)]);

                // Augment through the S-blossom from s to base.
                if bs >= n {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = Some(p);

                // Trace one step back.
                let Some(end) = self.label_end[bs] else {
                    // Reached single vertex; stop.
                    break;
                };
                let t = graph.endpoint(end);
                let bt = self.in_blossom[t];
                debug_assert_eq!(self.label[bt], Label::Inner);

                // Trace one more step back.
                let bt_end = self.label_end[bt].expect("T-blossom has a label edge");
                s = graph.endpoint(bt_end);
                let j = graph.endpoint(bt_end ^ 1);

                // Augment through the T-blossom from j to base.
                debug_assert_eq!(self.blossom_base[bt], Some(t));
                if bt >= n {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = Some(bt_end);

                // Keep the opposite endpoint;
                // it will be assigned to mate[s] in the next step.
                p = bt_end ^ 1;
            }
        }
    }

    /// Phase D: the largest dual shift that keeps every edge feasible, and
    /// what to do once it is applied.
    ///
    /// Vertex duals, edge slacks and deltas are all pre-multiplied by two.
    fn choose_delta(&self) -> (Weight, Delta) {
        let n = self.nvertex;
        let mut best: Option<(Weight, Delta)> = None;
        let mut offer = |d: Weight, action: Delta| {
            if best.map_or(true, |(delta, _)| d < delta) {
                best = Some((d, action));
            }
        };

        // delta1: the minimum dual of any vertex. Only a candidate when
        // cardinality does not have to be maximal.
        if !self.max_cardinality {
            offer(self.min_vertex_dual(), Delta::Exhausted);
        }

        // delta2: the minimum slack on any edge between an S-vertex and a
        // free vertex.
        for v in 0..n {
            if self.label[self.in_blossom[v]] == Label::Free {
                if let Some(k) = self.best_edge[v] {
                    offer(self.slack(k), Delta::FreeEdge(k));
                }
            }
        }

        // delta3: half the minimum slack on any edge between a pair of
        // S-blossoms. With integer weights this slack is always even.
        for b in 0..2 * n {
            if self.blossom_parent[b].is_none() && self.label[b] == Label::Outer {
                if let Some(k) = self.best_edge[b] {
                    let kslack = self.slack(k);
                    debug_assert_eq!(kslack % 2, 0);
                    offer(kslack / 2, Delta::OuterEdge(k));
                }
            }
        }

        // delta4: the minimum dual of any T-blossom.
        for b in n..2 * n {
            if self.blossom_base[b].is_some()
                && self.blossom_parent[b].is_none()
                && self.label[b] == Label::Inner
            {
                offer(self.dual[b], Delta::Expand(b));
            }
        }

        best.unwrap_or_else(|| {
            // No further improvement possible; max-cardinality optimum
            // reached. Do a final delta update to make the optimum
            // verifiable.
            debug_assert!(self.max_cardinality);
            (self.min_vertex_dual().max(0), Delta::Exhausted)
        })
    }

    fn apply_delta(&mut self, delta: Weight) {
        let n = self.nvertex;
        for v in 0..n {
            match self.label[self.in_blossom[v]] {
                Label::Outer => self.dual[v] -= delta,
                Label::Inner => self.dual[v] += delta,
                _ => {}
            }
        }
        for b in n..2 * n {
            if self.blossom_base[b].is_some() && self.blossom_parent[b].is_none() {
                match self.label[b] {
                    Label::Outer => self.dual[b] += delta,
                    Label::Inner => self.dual[b] -= delta,
                    _ => {}
                }
            }
        }
    }

    /// Check the tracked delta2 edges against a trivial computation.
    fn check_delta2(&self) {
        for v in 0..self.nvertex {
            if self.label[self.in_blossom[v]] != Label::Free {
                continue;
            }
            let least = self.graph.neighbend[v]
                .iter()
                .filter(|&&p| self.label[self.in_blossom[self.graph.endpoint(p)]] == Label::Outer)
                .map(|&p| self.slack(p / 2))
                .min();
            debug_assert_eq!(least, self.best_edge[v].map(|k| self.slack(k)), "delta2 of vertex {v}");
        }
    }

    /// Check the tracked delta3 edges against a trivial computation.
    fn check_delta3(&self) {
        let mut least: Option<Weight> = None;
        let mut tracked: Option<Weight> = None;

        for b in 0..2 * self.nvertex {
            if self.blossom_parent[b].is_some() || self.label[b] != Label::Outer {
                continue;
            }
            for v in self.blossom_leaves(b) {
                for &p in &self.graph.neighbend[v] {
                    let bw = self.in_blossom[self.graph.endpoint(p)];
                    if bw != b && self.label[bw] == Label::Outer {
                        let d = self.slack(p / 2);
                        least = Some(least.map_or(d, |l| l.min(d)));
                    }
                }
            }
            if let Some(k) = self.best_edge[b] {
                let (i, j, _wt) = self.graph.edges[k];
                let (bi, bj) = (self.in_blossom[i], self.in_blossom[j]);
                debug_assert!(bi == b || bj == b);
                debug_assert!(bi != b || bj != b);
                debug_assert!(self.label[bi] == Label::Outer && self.label[bj] == Label::Outer);
                let d = self.slack(k);
                tracked = Some(tracked.map_or(d, |t| t.min(d)));
            }
        }
        debug_assert_eq!(least, tracked, "delta3");
    }

    fn min_vertex_dual(&self) -> Weight {
        self.dual[..self.nvertex].iter().copied().min().unwrap_or(0)
    }

    /// Verify that the optimum solution has been reached.
    ///
    /// Panics on violation; any failure here is a bug in the search.
    fn verify_optimum(&self) {
        let graph = self.graph;
        let n = self.nvertex;

        // In max-cardinality mode vertices may have negative dual; find a
        // constant non-negative number to add to all vertex duals.
        let offset = if self.max_cardinality {
            (-self.min_vertex_dual()).max(0)
        } else {
            0
        };
        assert!(self.min_vertex_dual() + offset >= 0);
        assert!(self.dual[n..].iter().all(|&z| z >= 0));

        // All edges have non-negative slack and matched edges have zero
        // slack.
        for (k, &(i, j, wt)) in graph.edges.iter().enumerate() {
            let mut s = self.dual[i] + self.dual[j] - 2 * wt;
            let mut iblossoms = self.ancestors(i);
            let mut jblossoms = self.ancestors(j);
            iblossoms.reverse();
            jblossoms.reverse();
            for (bi, bj) in iblossoms.into_iter().zip(jblossoms) {
                if bi != bj {
                    break;
                }
                s += 2 * self.dual[bi];
            }
            assert!(s >= 0, "edge {k} has negative slack {s}");

            let matched_i = self.mate[i].map(|p| p / 2) == Some(k);
            let matched_j = self.mate[j].map(|p| p / 2) == Some(k);
            if matched_i || matched_j {
                assert!(matched_i && matched_j, "edge {k} is matched on one side only");
                assert_eq!(s, 0, "matched edge {k} is not tight");
            }
        }

        // All single vertices have zero dual (up to the offset).
        for v in 0..n {
            assert!(self.mate[v].is_some() || self.dual[v] + offset == 0);
        }

        // All blossoms with positive dual are full.
        for b in n..2 * n {
            if self.blossom_base[b].is_some() && self.dual[b] > 0 {
                let endps = &self.blossom_endps[b];
                assert_eq!(endps.len() % 2, 1);
                for &p in endps.iter().skip(1).step_by(2) {
                    assert_eq!(self.mate[graph.endpoint(p)], Some(p ^ 1));
                    assert_eq!(self.mate[graph.endpoint(p ^ 1)], Some(p));
                }
            }
        }

        // LP duality: twice the matching weight equals the dual objective.
        let weight: Weight = (0..n)
            .filter_map(|v| self.mate[v].map(|p| (v, p)))
            .filter(|&(v, p)| v < graph.endpoint(p))
            .map(|(_, p)| graph.edges[p / 2].2)
            .sum();
        assert_eq!(2 * weight, self.dual_objective());
    }

    /// Twice the dual objective: matched vertex duals plus `z(B) * (|B| - 1)`
    /// over all live blossoms.
    fn dual_objective(&self) -> Weight {
        let n = self.nvertex;
        let vertices: Weight = (0..n)
            .filter(|&v| self.mate[v].is_some())
            .map(|v| self.dual[v])
            .sum();
        let blossoms: Weight = (n..2 * n)
            .filter(|&b| self.blossom_base[b].is_some())
            .map(|b| self.dual[b] * (self.blossom_leaves(b).len() as Weight - 1))
            .sum();
        vertices + blossoms
    }

    /// v followed by each enclosing blossom, innermost first.
    fn ancestors(&self, v: Vertex) -> Vec<usize> {
        let mut chain = vec![v];
        let mut t = v;
        while let Some(parent) = self.blossom_parent[t] {
            chain.push(parent);
            t = parent;
        }
        chain
    }
}

/// Python-style ring index: negative positions count from the end.
#[inline]
fn ring_index(len: usize, j: isize) -> usize {
    j.rem_euclid(len as isize) as usize
}
