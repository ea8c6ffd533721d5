//! Graph construction from a node/edge snapshot.
//!
//! # Edge Direction
//!
//! An input edge `{issueId: B, dependsOnId: A}` reads "B depends on A". In the
//! graph it becomes `A → B`: dependencies flow toward the dependent item, so
//! forward traversal from an epic reaches everything waiting on it.
//!
//! # Normalization
//!
//! - Duplicate node ids: the last occurrence's payload wins; the node keeps
//!   the position of its first occurrence.
//! - Edges naming an unknown id on either side are dropped silently.
//! - Repeated edges (same ordered pair) are kept once.
//!
//! # Neighbor Order
//!
//! petgraph walks a node's adjacency most-recent-first. Every accessor here
//! reverses that so neighbors come back in edge input order, which keeps DFS
//! results aligned with how the snapshot listed its edges.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use beadview_core::{Edge, Node};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// GraphModel
// ---------------------------------------------------------------------------

/// Indexed dependency graph built from one snapshot.
///
/// Nodes are [`Node`] payloads; an edge `A → B` means "B depends on A".
/// The model may contain cycles and self-loops.
#[derive(Debug, Clone)]
pub struct GraphModel {
    graph: DiGraph<Node, ()>,
    node_map: HashMap<String, NodeIndex>,
    edges: Vec<Edge>,
    dropped_edges: usize,
    duplicate_nodes: usize,
    content_hash: String,
}

impl GraphModel {
    /// Build a model from raw node and edge lists.
    ///
    /// Pure: the inputs are only read, and identical inputs produce identical
    /// models (including `content_hash`).
    #[must_use]
    #[instrument(skip_all, fields(nodes = nodes.len(), edges = edges.len()))]
    pub fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut graph = DiGraph::<Node, ()>::with_capacity(nodes.len(), edges.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(nodes.len());
        let mut duplicate_nodes = 0;

        for node in nodes {
            if let Some(&idx) = node_map.get(&node.id) {
                graph[idx] = node.clone();
                duplicate_nodes += 1;
            } else {
                let idx = graph.add_node(node.clone());
                node_map.insert(node.id.clone(), idx);
            }
        }

        let mut kept: Vec<Edge> = Vec::with_capacity(edges.len());
        let mut dropped_edges = 0;

        for edge in edges {
            let (Some(&from), Some(&to)) = (
                node_map.get(&edge.depends_on_id),
                node_map.get(&edge.issue_id),
            ) else {
                dropped_edges += 1;
                continue;
            };

            if graph.contains_edge(from, to) {
                continue;
            }
            graph.add_edge(from, to, ());
            kept.push(edge.clone());
        }

        if dropped_edges > 0 || duplicate_nodes > 0 {
            debug!(dropped_edges, duplicate_nodes, "normalized graph input");
        }

        let content_hash = compute_content_hash(&graph, &kept);

        Self {
            graph,
            node_map,
            edges: kept,
            dropped_edges,
            duplicate_nodes,
            content_hash,
        }
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of retained dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Edges dropped because an endpoint was not in the node list.
    #[must_use]
    pub const fn dropped_edge_count(&self) -> usize {
        self.dropped_edges
    }

    /// Node entries that repeated an earlier id and overwrote its payload.
    #[must_use]
    pub const fn duplicate_node_count(&self) -> usize {
        self.duplicate_nodes
    }

    /// BLAKE3 hash of the normalized nodes and edges, `blake3:`-prefixed.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// The underlying petgraph graph.
    #[must_use]
    pub const fn graph(&self) -> &DiGraph<Node, ()> {
        &self.graph
    }

    /// Look up the `NodeIndex` for a node id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a node payload by id (`nodeById`).
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    /// Return the id of the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this model.
    #[must_use]
    pub fn id_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].id
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Retained edges in input order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Items that directly depend on `id` (forward neighbors).
    #[must_use]
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    /// Items that `id` directly depends on (reverse neighbors).
    #[must_use]
    pub fn dependencies(&self, id: &str) -> Vec<&str> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// `dependsOnId → [issueId]` for every node with at least one dependent.
    #[must_use]
    pub fn forward_adj(&self) -> BTreeMap<String, Vec<String>> {
        self.adjacency(Direction::Outgoing)
    }

    /// `issueId → [dependsOnId]` for every node with at least one dependency.
    #[must_use]
    pub fn reverse_adj(&self) -> BTreeMap<String, Vec<String>> {
        self.adjacency(Direction::Incoming)
    }

    /// Forward neighbors of `idx` in edge input order.
    pub(crate) fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.ordered_neighbors(idx, Direction::Outgoing)
    }

    /// Reverse neighbors of `idx` in edge input order.
    pub(crate) fn predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.ordered_neighbors(idx, Direction::Incoming)
    }

    fn ordered_neighbors(&self, idx: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        neighbors.reverse();
        neighbors
    }

    fn neighbor_ids(&self, id: &str, dir: Direction) -> Vec<&str> {
        self.node_index(id)
            .map(|idx| {
                self.ordered_neighbors(idx, dir)
                    .into_iter()
                    .map(|n| self.id_of(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn adjacency(&self, dir: Direction) -> BTreeMap<String, Vec<String>> {
        self.graph
            .node_indices()
            .filter_map(|idx| {
                let neighbors: Vec<String> = self
                    .ordered_neighbors(idx, dir)
                    .into_iter()
                    .map(|n| self.id_of(n).to_string())
                    .collect();
                (!neighbors.is_empty()).then(|| (self.id_of(idx).to_string(), neighbors))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Hash node payloads (in index order) and retained edges.
fn compute_content_hash(graph: &DiGraph<Node, ()>, edges: &[Edge]) -> String {
    let mut hasher = blake3::Hasher::new();
    for node in graph.node_weights() {
        let status = node.status.to_string();
        let kind = node.kind.to_string();
        let fields: [&str; 6] = [
            node.id.as_str(),
            node.title.as_str(),
            status.as_str(),
            kind.as_str(),
            node.assignee.as_deref().unwrap_or_default(),
            node.source.as_deref().unwrap_or_default(),
        ];
        for field in fields {
            hasher.update(field.as_bytes());
            hasher.update(b"\x00");
        }
        hasher.update(&node.priority.to_le_bytes());
        hasher.update(b"\x01");
    }
    for edge in edges {
        hasher.update(edge.depends_on_id.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.issue_id.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
