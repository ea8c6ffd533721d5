//! Collapsing and expanding subtrees rooted at epic nodes.
//!
//! The set of collapsed roots is UI state. It lives with the caller as a
//! [`CollapsedRoots`] value, survives refreshes there, and is only ever lent
//! to this module by shared reference.
//!
//! Collapsing root `r` hides every node reachable from `r` along dependency
//! edges (everything that transitively depends on `r`), but never `r` itself.
//! The hidden set for several roots is the union of their descendant sets.
//! A collapsed root that is itself a descendant of another collapsed root is
//! therefore hidden too.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};

use beadview_core::{Edge, Node};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::build::GraphModel;

// ---------------------------------------------------------------------------
// CollapsedRoots
// ---------------------------------------------------------------------------

/// Ids of the nodes the user has collapsed.
///
/// Single-writer state owned by the UI layer; updated one toggle at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapsedRoots(BTreeSet<String>);

impl CollapsedRoots {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Mark `id` collapsed. Returns `false` if it already was.
    pub fn collapse(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    /// Mark `id` expanded. Returns `false` if it was not collapsed.
    pub fn expand(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    /// Flip `id` and return whether it is now collapsed.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    /// Collapse every epic in `model`.
    pub fn collapse_all(&mut self, model: &GraphModel) {
        self.0.extend(
            model
                .nodes()
                .filter(|node| node.is_epic())
                .map(|node| node.id.clone()),
        );
    }

    /// Expand everything.
    pub fn expand_all(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_collapsed(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CollapsedRoots {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// CollapsedView
// ---------------------------------------------------------------------------

/// The part of the graph that stays on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapsedView {
    /// Visible nodes in model order.
    pub visible_nodes: Vec<Node>,
    /// Edges whose endpoints are both visible, in model order.
    pub visible_edges: Vec<Edge>,
    /// Union of the descendants of every collapsed root.
    pub hidden: BTreeSet<String>,
    /// Descendant count per collapsed root present in the model.
    ///
    /// Counted per root; descendants shared by two collapsed roots count
    /// toward both.
    pub child_counts: BTreeMap<String, usize>,
}

impl CollapsedView {
    #[must_use]
    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    /// Badge count for a collapsed root; `None` if `id` is not collapsed.
    #[must_use]
    pub fn child_count(&self, id: &str) -> Option<usize> {
        self.child_counts.get(id).copied()
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Everything that transitively depends on `root`, excluding `root`.
///
/// Empty when `root` is unknown or has no dependents.
#[must_use]
pub fn descendants(model: &GraphModel, root: &str) -> BTreeSet<String> {
    model
        .node_index(root)
        .map(|idx| {
            reachable(model, idx)
                .into_iter()
                .map(|n| model.id_of(n).to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Union of [`descendants`] over every collapsed root.
#[must_use]
pub fn hidden_ids(model: &GraphModel, roots: &CollapsedRoots) -> BTreeSet<String> {
    roots
        .iter()
        .flat_map(|root| descendants(model, root))
        .collect()
}

/// Compute the visible subset of `model` for the given collapsed roots.
///
/// Roots that are not in the model (stale UI state from an earlier refresh)
/// are ignored.
#[must_use]
#[instrument(skip_all, fields(nodes = model.node_count(), roots = roots.len()))]
pub fn collapse(model: &GraphModel, roots: &CollapsedRoots) -> CollapsedView {
    let mut hidden_mask = vec![false; model.node_count()];
    let mut child_counts: BTreeMap<String, usize> = BTreeMap::new();

    for root in roots.iter() {
        let Some(idx) = model.node_index(root) else {
            debug!(root, "collapsed root not in graph; ignoring");
            continue;
        };
        let reached = reachable(model, idx);
        for n in &reached {
            hidden_mask[n.index()] = true;
        }
        child_counts.insert(root.to_string(), reached.len());
    }

    let is_hidden = |id: &str| {
        model
            .node_index(id)
            .is_some_and(|idx| hidden_mask[idx.index()])
    };

    let visible_nodes: Vec<Node> = model
        .nodes()
        .filter(|node| !is_hidden(&node.id))
        .cloned()
        .collect();
    let visible_edges: Vec<Edge> = model
        .edges()
        .iter()
        .filter(|edge| !is_hidden(&edge.issue_id) && !is_hidden(&edge.depends_on_id))
        .cloned()
        .collect();
    let hidden: BTreeSet<String> = model
        .graph()
        .node_indices()
        .filter(|idx| hidden_mask[idx.index()])
        .map(|idx| model.id_of(idx).to_string())
        .collect();

    debug!(
        hidden = hidden.len(),
        visible = visible_nodes.len(),
        "collapsed view computed"
    );

    CollapsedView {
        visible_nodes,
        visible_edges,
        hidden,
        child_counts,
    }
}

/// Iterative forward DFS from `root`; returns reached nodes except `root`.
fn reachable(model: &GraphModel, root: NodeIndex) -> Vec<NodeIndex> {
    let mut visited = vec![false; model.node_count()];
    let mut stack: Vec<NodeIndex> = vec![root];
    let mut reached: Vec<NodeIndex> = Vec::new();
    visited[root.index()] = true;

    while let Some(current) = stack.pop() {
        for next in model.successors(current) {
            if !visited[next.index()] {
                visited[next.index()] = true;
                reached.push(next);
                stack.push(next);
            }
        }
    }

    reached
}
