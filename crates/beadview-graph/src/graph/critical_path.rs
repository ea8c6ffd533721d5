//! Critical path analysis for the dependency graph.
//!
//! # Overview
//!
//! The critical path is the *longest* dependency chain, counted in items.
//! It bounds how many sequential steps the remaining work needs, so the
//! visualizer highlights it.
//!
//! # Algorithm
//!
//! 1. Drop every edge that [`detect_cycles`] placed in a reported cycle. Every
//!    DFS back edge is among them, so what remains is acyclic.
//! 2. Order the remaining graph topologically with Kahn's algorithm.
//! 3. **Forward pass**: `longest[v] = 1 + max(longest[u])` over predecessors
//!    `u`, or `1` for a node without predecessors. The predecessor that
//!    achieved the maximum is remembered; ties go to the smallest id.
//! 4. The node with the largest `longest` (smallest id on ties) ends the
//!    path. Walking the remembered predecessors back from it rebuilds the
//!    chain.
//!
//! Everything is O(V + E) and deterministic for a given input.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use beadview_core::model::node::edge_key;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::graph::build::GraphModel;
use crate::graph::cycles::{CycleReport, detect_cycles};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of critical path analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    /// Item ids on the path in dependency order (first blocker first).
    ///
    /// Empty when the graph has no items.
    pub path: Vec<String>,
    /// The same ids as a set, for membership checks while rendering.
    pub node_ids: BTreeSet<String>,
    /// Edge keys (`"dependsOnId->issueId"`) linking consecutive path items.
    pub edge_ids: BTreeSet<String>,
}

impl CriticalPath {
    /// Number of items on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    #[must_use]
    pub fn contains_edge(&self, key: &str) -> bool {
        self.edge_ids.contains(key)
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Detect cycles, then compute the critical path on the remaining DAG.
#[must_use]
pub fn critical_path(model: &GraphModel) -> CriticalPath {
    let cycles = detect_cycles(model);
    compute_critical_path(model, &cycles)
}

/// Compute the critical path using a previously computed [`CycleReport`].
///
/// Edges on the reported cycles are ignored; nodes on cycles still take part
/// through their remaining edges.
#[must_use]
#[instrument(skip_all, fields(nodes = model.node_count(), excluded = cycles.edges_in_cycles.len()))]
pub fn compute_critical_path(model: &GraphModel, cycles: &CycleReport) -> CriticalPath {
    if model.is_empty() {
        return CriticalPath::default();
    }

    let chains = longest_chains(model, cycles);

    let Some(terminal) = chains.order.iter().copied().max_by(|&a, &b| {
        chains.longest[a.index()]
            .cmp(&chains.longest[b.index()])
            .then_with(|| model.id_of(b).cmp(model.id_of(a)))
    }) else {
        return CriticalPath::default();
    };

    let mut indices: Vec<NodeIndex> = vec![terminal];
    let mut cursor = terminal;
    while let Some(prev) = chains.via[cursor.index()] {
        indices.push(prev);
        cursor = prev;
    }
    indices.reverse();

    let path: Vec<String> = indices
        .iter()
        .map(|&idx| model.id_of(idx).to_string())
        .collect();
    let edge_ids: BTreeSet<String> = indices
        .windows(2)
        .map(|pair| edge_key(model.id_of(pair[0]), model.id_of(pair[1])))
        .collect();
    let node_ids: BTreeSet<String> = path.iter().cloned().collect();

    debug!(length = path.len(), "critical path computed");

    CriticalPath {
        path,
        node_ids,
        edge_ids,
    }
}

/// Length of the longest chain ending at each node, ignoring the edges of the
/// cycles in `cycles`.
///
/// A node with no remaining predecessors has depth 1. If the remaining graph
/// still has a cycle, nodes on it are left out of the map.
#[must_use]
pub fn chain_depths(model: &GraphModel, cycles: &CycleReport) -> BTreeMap<String, usize> {
    let chains = longest_chains(model, cycles);
    chains
        .order
        .iter()
        .map(|&idx| (model.id_of(idx).to_string(), chains.longest[idx.index()]))
        .collect()
}

// ---------------------------------------------------------------------------
// Forward pass
// ---------------------------------------------------------------------------

struct Chains {
    /// Topological order of the nodes Kahn's algorithm could release.
    order: Vec<NodeIndex>,
    longest: Vec<usize>,
    /// Predecessor on the longest chain into each node.
    via: Vec<Option<NodeIndex>>,
}

/// Cycle edges as index pairs. Ids are unique within a model, unlike the
/// formatted edge keys, which collide once an id contains `->`.
fn excluded_edges(model: &GraphModel, cycles: &CycleReport) -> HashSet<(NodeIndex, NodeIndex)> {
    cycles
        .cycle_edges()
        .filter_map(|(from, to)| Some((model.node_index(from)?, model.node_index(to)?)))
        .collect()
}

fn longest_chains(model: &GraphModel, cycles: &CycleReport) -> Chains {
    let n = model.node_count();
    let excluded = excluded_edges(model, cycles);

    let successors: Vec<Vec<NodeIndex>> = model
        .graph()
        .node_indices()
        .map(|u| {
            model
                .successors(u)
                .into_iter()
                .filter(|&v| !excluded.contains(&(u, v)))
                .collect()
        })
        .collect();

    let mut in_degree = vec![0_usize; n];
    for targets in &successors {
        for v in targets {
            in_degree[v.index()] += 1;
        }
    }

    let mut queue: VecDeque<NodeIndex> = model
        .graph()
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    let mut order: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut longest = vec![1_usize; n];
    let mut via: Vec<Option<NodeIndex>> = vec![None; n];

    while let Some(u) = queue.pop_front() {
        order.push(u);
        let candidate = longest[u.index()] + 1;

        for &v in &successors[u.index()] {
            let vi = v.index();
            let better = candidate > longest[vi]
                || (candidate == longest[vi]
                    && via[vi].is_some_and(|p| model.id_of(u) < model.id_of(p)));
            if better {
                longest[vi] = candidate;
                via[vi] = Some(u);
            }

            in_degree[vi] -= 1;
            if in_degree[vi] == 0 {
                queue.push_back(v);
            }
        }
    }

    if order.len() < n {
        warn!(
            unresolved = n - order.len(),
            "graph still cyclic after removing cycle edges; skipping unresolved nodes"
        );
    }

    Chains {
        order,
        longest,
        via,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use beadview_core::{Edge, Node};

    // -----------------------------------------------------------------------
    // Test helpers
    // -----------------------------------------------------------------------

    /// `(blocker, dependent)` links, traversal `blocker → dependent`.
    fn graph_with_links(nodes: &[&str], links: &[(&str, &str)]) -> GraphModel {
        let nodes: Vec<Node> = nodes.iter().map(|id| Node::task(*id)).collect();
        let edges: Vec<Edge> = links
            .iter()
            .map(|(blocker, dependent)| Edge::new(*dependent, *blocker))
            .collect();
        GraphModel::build(&nodes, &edges)
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // Empty / trivial graphs
    // -----------------------------------------------------------------------

    #[test]
    fn empty_graph_returns_empty_result() {
        let result = critical_path(&graph_with_links(&[], &[]));
        assert!(result.is_empty());
        assert!(result.node_ids.is_empty());
        assert!(result.edge_ids.is_empty());
    }

    #[test]
    fn single_node_is_trivial_chain() {
        let result = critical_path(&graph_with_links(&["A"], &[]));
        assert_eq!(result.path, ids(&["A"]));
        assert_eq!(result.len(), 1);
        assert!(result.edge_ids.is_empty());
    }

    #[test]
    fn isolated_nodes_pick_smallest_id() {
        let result = critical_path(&graph_with_links(&["C", "A", "B"], &[]));
        assert_eq!(result.path, ids(&["A"]));
    }

    // -----------------------------------------------------------------------
    // DAGs
    // -----------------------------------------------------------------------

    #[test]
    fn linear_chain_is_whole_path() {
        let model = graph_with_links(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let result = critical_path(&model);

        assert_eq!(result.path, ids(&["A", "B", "C"]));
        assert_eq!(result.node_ids, set(&["A", "B", "C"]));
        assert_eq!(result.edge_ids, set(&["A->B", "B->C"]));
    }

    #[test]
    fn diamond_predecessor_tie_goes_to_smallest_id() {
        // A → B → D, A → C → D. D reaches length 3 via B or C.
        let model = graph_with_links(
            &["A", "C", "B", "D"],
            &[("A", "C"), ("A", "B"), ("C", "D"), ("B", "D")],
        );
        let result = critical_path(&model);
        assert_eq!(result.path, ids(&["A", "B", "D"]));
    }

    #[test]
    fn terminal_tie_goes_to_smallest_id() {
        // n1 → n2 → {n4, n3}; n3 and n4 both end a chain of 3.
        let model = graph_with_links(
            &["n1", "n2", "n4", "n3"],
            &[("n1", "n2"), ("n2", "n4"), ("n2", "n3")],
        );
        let result = critical_path(&model);
        assert_eq!(result.path, ids(&["n1", "n2", "n3"]));
        assert_eq!(result.edge_ids, set(&["n1->n2", "n2->n3"]));
    }

    #[test]
    fn longer_branch_beats_smaller_ids() {
        // A → Z1 → Z2 → Z3 is longer than A → B.
        let model = graph_with_links(
            &["A", "B", "Z1", "Z2", "Z3"],
            &[("A", "B"), ("A", "Z1"), ("Z1", "Z2"), ("Z2", "Z3")],
        );
        let result = critical_path(&model);
        assert_eq!(result.path, ids(&["A", "Z1", "Z2", "Z3"]));
    }

    #[test]
    fn disconnected_components_pick_longest() {
        let model = graph_with_links(
            &["a", "b", "x", "y", "z"],
            &[("a", "b"), ("x", "y"), ("y", "z")],
        );
        assert_eq!(critical_path(&model).path, ids(&["x", "y", "z"]));
    }

    // -----------------------------------------------------------------------
    // Cyclic input
    // -----------------------------------------------------------------------

    #[test]
    fn cycle_edges_are_excluded() {
        // A ⇄ B, then B → C → D.
        let model = graph_with_links(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "D")],
        );
        let result = critical_path(&model);

        assert_eq!(result.path, ids(&["B", "C", "D"]));
        assert!(!result.contains_edge("A->B"));
        assert!(!result.contains_edge("B->A"));
    }

    #[test]
    fn self_loop_does_not_extend_path() {
        let model = graph_with_links(&["A", "B"], &[("A", "A"), ("A", "B")]);
        let result = critical_path(&model);
        assert_eq!(result.path, ids(&["A", "B"]));
        assert_eq!(result.edge_ids, set(&["A->B"]));
    }

    #[test]
    fn precomputed_report_matches_convenience_call() {
        let model = graph_with_links(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A")],
        );
        let report = detect_cycles(&model);
        assert_eq!(compute_critical_path(&model, &report), critical_path(&model));
    }

    #[test]
    fn fully_cyclic_graph_still_yields_a_path() {
        let model = graph_with_links(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let result = critical_path(&model);
        // Every edge sits on the cycle, so each node is a chain of one.
        assert_eq!(result.path, ids(&["A"]));
    }

    #[test]
    fn arrow_in_ids_does_not_exclude_unrelated_edges() {
        // `a ⇄ b->c` is a cycle. `a->b → c` is not on it, yet its key
        // "a->b->c" is the same string as the cycle edge `a → b->c`.
        let model = graph_with_links(
            &["a", "b->c", "a->b", "c"],
            &[("a", "b->c"), ("b->c", "a"), ("a->b", "c")],
        );
        let report = detect_cycles(&model);
        assert!(report.contains_edge("a->b->c"));

        let result = compute_critical_path(&model, &report);
        assert_eq!(result.path, ids(&["a->b", "c"]));
        assert_eq!(result.edge_ids, set(&["a->b->c"]));
    }

    #[test]
    fn long_chain_is_handled_iteratively() {
        let ids: Vec<String> = (0..50_000).map(|i| format!("bd-{i:05}")).collect();
        let nodes: Vec<Node> = ids.iter().map(Node::task).collect();
        let edges: Vec<Edge> = ids.windows(2).map(|w| Edge::new(&w[1], &w[0])).collect();

        let result = critical_path(&GraphModel::build(&nodes, &edges));
        assert_eq!(result.len(), ids.len());
        assert_eq!(result.path.first(), ids.first());
        assert_eq!(result.path.last(), ids.last());
    }

    // -----------------------------------------------------------------------
    // chain_depths
    // -----------------------------------------------------------------------

    #[test]
    fn chain_depths_reports_longest_chain_per_node() {
        let model = graph_with_links(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("A", "C")],
        );
        let depths = chain_depths(&model, &CycleReport::default());

        assert_eq!(depths["A"], 1);
        assert_eq!(depths["B"], 2);
        assert_eq!(depths["C"], 3);
        assert_eq!(depths["D"], 1);
    }

    #[test]
    fn chain_depths_skips_unresolved_cycle_members() {
        let model = graph_with_links(&["A", "B", "C"], &[("A", "B"), ("B", "A"), ("A", "C")]);
        let depths = chain_depths(&model, &CycleReport::default());
        assert!(depths.is_empty(), "A and B block each other, C waits on A");

        let report = detect_cycles(&model);
        let depths = chain_depths(&model, &report);
        assert_eq!(depths.len(), 3);
        assert_eq!(depths["C"], 2);
    }
}
