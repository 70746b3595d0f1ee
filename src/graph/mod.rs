//! General-purpose directed graph used for sweep-order construction.
//!
//! Holds integer-indexed vertices with weighted downstream (successor) and
//! upstream (dependency) adjacency, plus the three algorithms the sweep
//! orderers need: strongly-connected-component detection (Tarjan),
//! topological sorting (Kahn), and an approximate minimum feedback-arc-set
//! ordering (Eades, Lin & Smyth's greedy heuristic). All adjacency is kept
//! in ordered containers so every traversal is deterministic; ranks that
//! run the same algorithm on the same input must reach identical results.

pub mod cycle_removal;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use itertools::Itertools;

use crate::sweep_error::SweepError;

/// A vertex with downstream ("ds", successor) and upstream ("us",
/// dependency) edge sets. Edge weights are kept on both endpoints.
#[derive(Debug, Clone, Default)]
pub struct GraphVertex {
    pub id: usize,
    ds_edges: BTreeSet<usize>,
    us_edges: BTreeSet<usize>,
    ds_weights: BTreeMap<usize, f64>,
    us_weights: BTreeMap<usize, f64>,
}

/// Directed graph with stable vertex indices.
///
/// Vertices are never reindexed; `remove_vertex` detaches a vertex and
/// flags it invalid, which is what the feedback-arc-set heuristic needs
/// while it peels the graph apart.
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    vertices: Vec<GraphVertex>,
    valid: Vec<bool>,
    num_valid: usize,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its id (0, 1, 2, ...).
    pub fn add_vertex(&mut self) -> usize {
        let id = self.vertices.len();
        self.vertices.push(GraphVertex {
            id,
            ..GraphVertex::default()
        });
        self.valid.push(true);
        self.num_valid += 1;
        id
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_valid(&self) -> usize {
        self.num_valid
    }

    fn check_vertex(&self, v: usize) -> Result<(), SweepError> {
        if v >= self.vertices.len() || !self.valid[v] {
            return Err(SweepError::InvalidVertex(v));
        }
        Ok(())
    }

    /// Inserts the edge `from -> to`. Re-inserting an existing edge
    /// collapses onto the single logical edge, the new weight winning.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<(), SweepError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.vertices[from].ds_edges.insert(to);
        self.vertices[from].ds_weights.insert(to, weight);
        self.vertices[to].us_edges.insert(from);
        self.vertices[to].us_weights.insert(from, weight);
        Ok(())
    }

    /// Removes the edge `from -> to`; the edge must exist.
    pub fn remove_edge(&mut self, from: usize, to: usize) -> Result<(), SweepError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        if !self.vertices[from].ds_edges.remove(&to) {
            return Err(SweepError::MissingEdge(from, to));
        }
        self.vertices[from].ds_weights.remove(&to);
        self.vertices[to].us_edges.remove(&from);
        self.vertices[to].us_weights.remove(&from);
        Ok(())
    }

    /// Detaches a vertex from all neighbors and flags it invalid. Ids of
    /// the remaining vertices are unchanged.
    pub fn remove_vertex(&mut self, v: usize) -> Result<(), SweepError> {
        self.check_vertex(v)?;
        self.detach(v);
        Ok(())
    }

    fn detach(&mut self, v: usize) {
        let ds: Vec<usize> = self.vertices[v].ds_edges.iter().copied().collect();
        let us: Vec<usize> = self.vertices[v].us_edges.iter().copied().collect();
        for u in ds {
            self.vertices[u].us_edges.remove(&v);
            self.vertices[u].us_weights.remove(&v);
        }
        for u in us {
            self.vertices[u].ds_edges.remove(&v);
            self.vertices[u].ds_weights.remove(&v);
        }
        self.vertices[v].ds_edges.clear();
        self.vertices[v].us_edges.clear();
        self.vertices[v].ds_weights.clear();
        self.vertices[v].us_weights.clear();
        self.valid[v] = false;
        self.num_valid -= 1;
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.vertices
            .get(from)
            .is_some_and(|v| v.ds_edges.contains(&to))
    }

    pub fn edge_weight(&self, from: usize, to: usize) -> Option<f64> {
        self.vertices.get(from)?.ds_weights.get(&to).copied()
    }

    /// Successors of `v` in ascending id order.
    pub fn successors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.vertices[v].ds_edges.iter().copied()
    }

    /// Predecessors of `v` in ascending id order.
    pub fn predecessors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.vertices[v].us_edges.iter().copied()
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.vertices[v].ds_edges.len()
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.vertices[v].us_edges.len()
    }

    pub fn num_edges(&self) -> usize {
        self.vertices.iter().map(|v| v.ds_edges.len()).sum()
    }

    /// Strongly connected components, excluding singletons.
    ///
    /// Iterative form of Tarjan's algorithm (Tarjan, SIAM J. Computing,
    /// 1972). The recursive presentation would be at the mercy of mesh
    /// size for stack depth, so an explicit frame stack is used. Returns
    /// only components of size >= 2; an acyclic graph yields an empty
    /// list. Runs in O(V+E).
    pub fn find_strongly_connected_components(&self) -> Vec<Vec<usize>> {
        const UNDISCOVERED: usize = usize::MAX;
        let n = self.vertices.len();
        let mut disc = vec![UNDISCOVERED; n];
        let mut low = vec![0usize; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut sccs: Vec<Vec<usize>> = Vec::new();
        let mut time = 0usize;

        // (vertex, remaining successor list) DFS frames
        let mut frames: Vec<(usize, std::vec::IntoIter<usize>)> = Vec::new();

        for root in 0..n {
            if !self.valid[root] || disc[root] != UNDISCOVERED {
                continue;
            }
            disc[root] = time;
            low[root] = time;
            time += 1;
            stack.push(root);
            on_stack[root] = true;
            frames.push((root, self.successor_list(root)));

            loop {
                let (u, next) = match frames.last_mut() {
                    Some((u, it)) => (*u, it.next()),
                    None => break,
                };
                match next {
                    Some(v) => {
                        if disc[v] == UNDISCOVERED {
                            disc[v] = time;
                            low[v] = time;
                            time += 1;
                            stack.push(v);
                            on_stack[v] = true;
                            frames.push((v, self.successor_list(v)));
                        } else if on_stack[v] {
                            low[u] = low[u].min(disc[v]);
                        }
                    }
                    None => {
                        frames.pop();
                        if let Some((parent, _)) = frames.last() {
                            let p = *parent;
                            low[p] = low[p].min(low[u]);
                        }
                        if low[u] == disc[u] {
                            let mut component = Vec::new();
                            while let Some(w) = stack.pop() {
                                on_stack[w] = false;
                                component.push(w);
                                if w == u {
                                    break;
                                }
                            }
                            if component.len() > 1 {
                                sccs.push(component);
                            }
                        }
                    }
                }
            }
        }
        sccs
    }

    fn successor_list(&self, v: usize) -> std::vec::IntoIter<usize> {
        self.vertices[v]
            .ds_edges
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Topological sort via Kahn's algorithm (Kahn, CACM 5(11), 1962).
    ///
    /// Returns the vertex ids ordered so that every edge `u -> v` has `u`
    /// before `v`; vertices with no dependencies come first. Returns an
    /// EMPTY vector when the graph contains a cycle; that empty result is
    /// the failure signal callers test for, not an error value.
    pub fn generate_topological_sort(&self) -> Vec<usize> {
        let n = self.vertices.len();
        let mut in_degree: Vec<usize> = (0..n)
            .map(|v| if self.valid[v] { self.in_degree(v) } else { 0 })
            .collect();

        let mut ready: VecDeque<usize> = (0..n)
            .filter(|&v| self.valid[v] && in_degree[v] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.num_valid);
        while let Some(u) = ready.pop_front() {
            order.push(u);
            for v in self.successors(u) {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    ready.push_back(v);
                }
            }
        }

        if order.len() != self.num_valid {
            return Vec::new();
        }
        order
    }

    /// Approximate minimum Feedback Arc Set sequence.
    ///
    /// Greedy GR heuristic of Eades, Lin & Smyth ("A fast and effective
    /// heuristic for the feedback arc set problem", Information Processing
    /// Letters 47, 1993): repeatedly strip sinks to the tail and sources
    /// to the head, then move the vertex with the largest weighted
    /// out-minus-in delta to the head. The returned total order makes the
    /// backward-edge count approximately minimal; exact minimum FAS is
    /// NP-hard and the quality only affects how many dependencies end up
    /// delayed, not correctness. Consumes the graph's live vertices.
    pub fn find_approx_minimum_fas(&mut self) -> Vec<usize> {
        let mut s1: Vec<usize> = Vec::new();
        let mut s2: VecDeque<usize> = VecDeque::new();

        while self.num_valid > 0 {
            // sinks to the tail
            while let Some(u) = self.first_valid(|v| v.ds_edges.is_empty()) {
                self.detach(u);
                s2.push_front(u);
            }
            // sources to the head
            while let Some(u) = self.first_valid(|v| v.us_edges.is_empty()) {
                self.detach(u);
                s1.push(u);
            }
            if self.num_valid == 0 {
                break;
            }
            // largest out-minus-in weighted delta; ties resolve to the
            // smallest id so all ranks agree
            let mut best: Option<(usize, f64)> = None;
            for v in self.vertices.iter().filter(|v| self.valid[v.id]) {
                let delta: f64 = v.ds_weights.values().sum::<f64>()
                    - v.us_weights.values().sum::<f64>();
                if best.is_none_or(|(_, d)| delta > d) {
                    best = Some((v.id, delta));
                }
            }
            if let Some((u, _)) = best {
                self.detach(u);
                s1.push(u);
            }
        }

        s1.extend(s2);
        s1
    }

    fn first_valid(&self, pred: impl Fn(&GraphVertex) -> bool) -> Option<usize> {
        self.vertices
            .iter()
            .find(|v| self.valid[v.id] && pred(v))
            .map(|v| v.id)
    }

    /// Dot-format dump of the live graph, for offline inspection.
    pub fn to_graphviz(&self) -> String {
        let verts = self
            .vertices
            .iter()
            .filter(|v| self.valid[v.id])
            .map(|v| format!("    {} [shape=\"circle\"]", v.id))
            .join("\n");
        let edges = self
            .vertices
            .iter()
            .filter(|v| self.valid[v.id])
            .flat_map(|v| v.ds_edges.iter().map(move |w| format!("    {} -> {}", v.id, w)))
            .join("\n");
        format!(
            "digraph DG {{\n    splines=\"FALSE\";\n    rankdir=\"LR\";\n\n{verts}\n\n{edges}\n}}\n"
        )
    }
}
