//! Cycle detection over the dependency graph.
//!
//! # Edge Direction
//!
//! The model uses edge direction `dependency → dependent`. A cycle is any
//! closed walk along those edges; a self-dependency is a one-node cycle.
//!
//! # Reporting Policy
//!
//! [`detect_cycles`] runs a white/gray/black depth-first search and reports
//! **one cycle per back edge**: for a back edge `u → v` (with `v` still on the
//! DFS path) the cycle is the path slice `v ..= u` closed by `u → v`. This is
//! not an exhaustive enumeration of simple cycles; overlapping loops that share
//! a back edge are reported once. The node and edge sets are unions over every
//! reported cycle, which is what the visualizer highlights.
//!
//! The traversal keeps its own frame stack, so chains of any depth are safe.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeSet, VecDeque};

use beadview_core::model::node::edge_key;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::graph::build::GraphModel;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Result of cycle detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub has_cycles: bool,
    /// One entry per back edge, in DFS path order starting at the back edge's
    /// target.
    pub cycles: Vec<Vec<String>>,
    /// Union of the nodes of every reported cycle.
    pub nodes_in_cycles: BTreeSet<String>,
    /// Union of the edge keys (`"dependsOnId->issueId"`) of every reported cycle.
    pub edges_in_cycles: BTreeSet<String>,
}

impl CycleReport {
    /// Number of reported cycles.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes_in_cycles.contains(id)
    }

    #[must_use]
    pub fn contains_edge(&self, key: &str) -> bool {
        self.edges_in_cycles.contains(key)
    }

    /// `(dependsOnId, issueId)` pairs of every reported cycle, closing edge
    /// included. May repeat an edge shared by two cycles.
    pub fn cycle_edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.cycles.iter().flat_map(|cycle| {
            let closing = cycle.last().zip(cycle.first());
            cycle
                .windows(2)
                .map(|pair| (pair[0].as_str(), pair[1].as_str()))
                .chain(closing.map(|(tail, head)| (tail.as_str(), head.as_str())))
        })
    }

    fn record(&mut self, model: &GraphModel, cycle: &[NodeIndex], closing: (NodeIndex, NodeIndex)) {
        let ids: Vec<String> = cycle.iter().map(|&idx| model.id_of(idx).to_string()).collect();

        for pair in cycle.windows(2) {
            self.edges_in_cycles
                .insert(edge_key(model.id_of(pair[0]), model.id_of(pair[1])));
        }
        self.edges_in_cycles
            .insert(edge_key(model.id_of(closing.0), model.id_of(closing.1)));
        self.nodes_in_cycles.extend(ids.iter().cloned());

        self.cycles.push(ids);
        self.has_cycles = true;
    }
}

// ---------------------------------------------------------------------------
// Full detection
// ---------------------------------------------------------------------------

/// Find cycles in `model`, one per DFS back edge.
///
/// Roots are tried in node order and the search restarts from every node not
/// yet visited, so disconnected components are all covered. Never fails and
/// always terminates: each node is entered once and each edge examined once.
#[must_use]
#[instrument(skip_all, fields(nodes = model.node_count(), edges = model.edge_count()))]
pub fn detect_cycles(model: &GraphModel) -> CycleReport {
    let mut search = CycleSearch::new(model);

    for root in model.graph().node_indices() {
        if search.color[root.index()] == Color::White {
            search.run_from(root);
        }
    }

    let report = search.report;
    debug!(
        cycles = report.cycle_count(),
        nodes_in_cycles = report.nodes_in_cycles.len(),
        "cycle detection finished"
    );
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current DFS path.
    Gray,
    /// Fully explored.
    Black,
}

/// One entry of the explicit DFS stack.
struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    next: usize,
}

struct CycleSearch<'a> {
    model: &'a GraphModel,
    color: Vec<Color>,
    /// Current DFS path, root first.
    path: Vec<NodeIndex>,
    /// Index into `path` for every gray node.
    path_pos: Vec<usize>,
    stack: Vec<Frame>,
    report: CycleReport,
}

impl<'a> CycleSearch<'a> {
    fn new(model: &'a GraphModel) -> Self {
        let n = model.node_count();
        Self {
            model,
            color: vec![Color::White; n],
            path: Vec::new(),
            path_pos: vec![0; n],
            stack: Vec::new(),
            report: CycleReport::default(),
        }
    }

    fn enter(&mut self, node: NodeIndex) {
        self.color[node.index()] = Color::Gray;
        self.path_pos[node.index()] = self.path.len();
        self.path.push(node);
        self.stack.push(Frame {
            node,
            successors: self.model.successors(node),
            next: 0,
        });
    }

    fn run_from(&mut self, root: NodeIndex) {
        self.enter(root);

        loop {
            let Some(frame) = self.stack.last_mut() else {
                break;
            };

            let Some(&next) = frame.successors.get(frame.next) else {
                // Every successor handled: current node is the path tip.
                let done = frame.node;
                self.stack.pop();
                self.path.pop();
                self.color[done.index()] = Color::Black;
                continue;
            };
            frame.next += 1;
            let current = frame.node;

            match self.color[next.index()] {
                Color::White => self.enter(next),
                Color::Gray => {
                    let start = self.path_pos[next.index()];
                    let cycle = &self.path[start..];
                    self.report.record(self.model, cycle, (current, next));
                }
                Color::Black => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Incremental check
// ---------------------------------------------------------------------------

/// Check whether adding "`issue_id` depends on `depends_on_id`" would close a
/// dependency cycle.
///
/// When it would, returns the loop as `depends_on, issue, ..., depends_on`,
/// following the shortest existing route from `issue` back to `depends_on`.
///
/// Checked in order:
/// 1. Either id missing from the model: `None`.
/// 2. Self-dependency: `[id, id]`, even when that self-loop is already present.
/// 3. Edge already present: `None`, since it closes nothing new.
#[must_use]
pub fn would_create_cycle(
    model: &GraphModel,
    issue_id: &str,
    depends_on_id: &str,
) -> Option<Vec<String>> {
    let blocker = model.node_index(depends_on_id)?;
    let dependent = model.node_index(issue_id)?;

    if blocker == dependent {
        let id = model.id_of(blocker).to_string();
        return Some(vec![id.clone(), id]);
    }
    if model.graph().contains_edge(blocker, dependent) {
        return None;
    }

    let route = shortest_route(model, dependent, blocker)?;
    let mut cycle = Vec::with_capacity(route.len() + 1);
    cycle.push(model.id_of(blocker).to_string());
    cycle.extend(route.into_iter().map(|idx| model.id_of(idx).to_string()));
    Some(cycle)
}

/// Breadth-first route `start ..= goal` along dependency edges.
fn shortest_route(
    model: &GraphModel,
    start: NodeIndex,
    goal: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut came_from: Vec<Option<NodeIndex>> = vec![None; model.node_count()];
    let mut seen = vec![false; model.node_count()];
    seen[start.index()] = true;
    let mut frontier = VecDeque::from([start]);

    while let Some(node) = frontier.pop_front() {
        if node == goal {
            let mut route = vec![goal];
            let mut step = goal;
            while let Some(prev) = came_from[step.index()] {
                route.push(prev);
                step = prev;
            }
            route.reverse();
            return Some(route);
        }
        for next in model.successors(node) {
            if !seen[next.index()] {
                seen[next.index()] = true;
                came_from[next.index()] = Some(node);
                frontier.push_back(next);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadview_core::{Edge, Node};

    /// Build a model from `(blocker, dependent)` links: each becomes the edge
    /// "dependent depends on blocker", i.e. traversal `blocker → dependent`.
    fn graph_with_links(nodes: &[&str], links: &[(&str, &str)]) -> GraphModel {
        let nodes: Vec<Node> = nodes.iter().map(|id| Node::task(*id)).collect();
        let edges: Vec<Edge> = links
            .iter()
            .map(|(blocker, dependent)| Edge::new(*dependent, *blocker))
            .collect();
        GraphModel::build(&nodes, &edges)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        let report = detect_cycles(&graph_with_links(&[], &[]));
        assert_eq!(report, CycleReport::default());
    }

    #[test]
    fn acyclic_chain_has_no_cycles() {
        let model = graph_with_links(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let report = detect_cycles(&model);
        assert!(!report.has_cycles);
        assert!(report.cycles.is_empty());
        assert!(report.nodes_in_cycles.is_empty());
        assert!(report.edges_in_cycles.is_empty());
    }

    #[test]
    fn diamond_cross_edge_is_not_a_cycle() {
        // A → B → D, A → C → D: second visit to D hits a black node.
        let model = graph_with_links(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        assert!(!detect_cycles(&model).has_cycles);
    }

    #[test]
    fn two_node_cycle_reports_both_edges() {
        let model = graph_with_links(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let report = detect_cycles(&model);

        assert!(report.has_cycles);
        assert_eq!(report.cycles, vec![vec!["A".to_string(), "B".to_string()]]);
        assert_eq!(report.nodes_in_cycles, set(&["A", "B"]));
        assert_eq!(report.edges_in_cycles, set(&["A->B", "B->A"]));
    }

    #[test]
    fn self_loop_is_single_node_cycle() {
        let model = graph_with_links(&["A", "B"], &[("A", "A"), ("A", "B")]);
        let report = detect_cycles(&model);

        assert!(report.has_cycles);
        assert_eq!(report.cycles, vec![vec!["A".to_string()]]);
        assert_eq!(report.nodes_in_cycles, set(&["A"]));
        assert_eq!(report.edges_in_cycles, set(&["A->A"]));
    }

    #[test]
    fn one_cycle_per_back_edge() {
        // A → B → C → A and B → A: two back edges, two reported cycles.
        let model = graph_with_links(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("B", "A")],
        );
        let report = detect_cycles(&model);

        assert_eq!(
            report.cycles,
            vec![
                vec!["A".to_string(), "B".to_string(), "C".to_string()],
                vec!["A".to_string(), "B".to_string()],
            ]
        );
        assert_eq!(report.nodes_in_cycles, set(&["A", "B", "C"]));
        assert_eq!(report.edges_in_cycles, set(&["A->B", "B->C", "C->A", "B->A"]));
    }

    #[test]
    fn cycles_in_disconnected_components_are_all_found() {
        let model = graph_with_links(
            &["A", "B", "C", "D", "E", "F", "G"],
            &[
                ("A", "B"),
                ("B", "A"),
                ("C", "D"),
                ("D", "E"),
                ("E", "C"),
                ("F", "F"),
            ],
        );
        let report = detect_cycles(&model);

        assert_eq!(report.cycle_count(), 3);
        assert_eq!(report.nodes_in_cycles, set(&["A", "B", "C", "D", "E", "F"]));
        assert!(!report.contains_node("G"));
        assert!(report.contains_edge("E->C"));
        assert!(report.contains_edge("F->F"));
    }

    #[test]
    fn tail_leading_into_cycle_is_not_reported() {
        // T → A → B → A: T is upstream of the loop but not on it.
        let model = graph_with_links(&["T", "A", "B"], &[("T", "A"), ("A", "B"), ("B", "A")]);
        let report = detect_cycles(&model);

        assert_eq!(report.nodes_in_cycles, set(&["A", "B"]));
        assert!(!report.contains_edge("T->A"));
    }

    #[test]
    fn dense_graph_terminates_with_subset_output() {
        let ids = ["a", "b", "c", "d", "e"];
        let mut links = Vec::new();
        for from in ids {
            for to in ids {
                links.push((from, to));
            }
        }
        let model = graph_with_links(&ids, &links);
        let report = detect_cycles(&model);

        assert!(report.has_cycles);
        assert_eq!(report.nodes_in_cycles, set(&ids));
        let all_keys: BTreeSet<String> = model.edges().iter().map(Edge::key).collect();
        assert!(report.edges_in_cycles.is_subset(&all_keys));
    }

    #[test]
    fn long_chain_does_not_overflow_stack() {
        let ids: Vec<String> = (0..100_000).map(|i| format!("bd-{i}")).collect();
        let nodes: Vec<Node> = ids.iter().map(Node::task).collect();
        let mut edges: Vec<Edge> = ids.windows(2).map(|w| Edge::new(&w[1], &w[0])).collect();
        // Close the loop from the tail back to the head.
        edges.push(Edge::new(&ids[0], &ids[ids.len() - 1]));

        let report = detect_cycles(&GraphModel::build(&nodes, &edges));
        assert_eq!(report.cycle_count(), 1);
        assert_eq!(report.cycles[0].len(), ids.len());
        assert_eq!(report.edges_in_cycles.len(), ids.len());
    }

    #[test]
    fn detection_is_deterministic() {
        let model = graph_with_links(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D"), ("D", "B")],
        );
        assert_eq!(detect_cycles(&model), detect_cycles(&model));
    }

    // -----------------------------------------------------------------------
    // would_create_cycle
    // -----------------------------------------------------------------------

    #[test]
    fn would_create_cycle_detects_self_dependency() {
        let model = graph_with_links(&["A"], &[]);
        assert_eq!(
            would_create_cycle(&model, "A", "A"),
            Some(vec!["A".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn would_create_cycle_detects_three_node_loop() {
        // Existing: A → B → C. New: "A depends on C" adds C → A.
        let model = graph_with_links(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let cycle = would_create_cycle(&model, "A", "C")
            .unwrap_or_else(|| panic!("expected cycle"));
        assert_eq!(cycle, vec!["C", "A", "B", "C"]);
    }

    #[test]
    fn would_create_cycle_follows_shortest_route() {
        // A → B → C → D and A → D. "A depends on D" closes via A → D.
        let model = graph_with_links(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
        );
        assert_eq!(
            would_create_cycle(&model, "A", "D"),
            Some(vec!["D".to_string(), "A".to_string(), "D".to_string()])
        );
    }

    #[test]
    fn would_create_cycle_reports_existing_self_loop() {
        let model = graph_with_links(&["A"], &[("A", "A")]);
        assert_eq!(
            would_create_cycle(&model, "A", "A"),
            Some(vec!["A".to_string(), "A".to_string()])
        );
    }

    #[test]
    fn cycle_edges_include_closing_edge() {
        let model = graph_with_links(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("C", "C")],
        );
        let report = detect_cycles(&model);
        let pairs: BTreeSet<(&str, &str)> = report.cycle_edges().collect();
        assert_eq!(
            pairs,
            BTreeSet::from([("A", "B"), ("B", "C"), ("C", "A"), ("C", "C")])
        );
    }

    #[test]
    fn would_create_cycle_returns_none_for_safe_edge() {
        // Existing: A → B → C. New: "C depends on A" adds A → C.
        let model = graph_with_links(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        assert!(would_create_cycle(&model, "C", "A").is_none());
    }

    #[test]
    fn would_create_cycle_returns_none_for_existing_edge() {
        let model = graph_with_links(&["A", "B"], &[("A", "B")]);
        assert!(would_create_cycle(&model, "B", "A").is_none());
    }

    #[test]
    fn would_create_cycle_ignores_unknown_ids() {
        let model = graph_with_links(&["A"], &[]);
        assert!(would_create_cycle(&model, "A", "ghost").is_none());
        assert!(would_create_cycle(&model, "ghost", "A").is_none());
    }
}
