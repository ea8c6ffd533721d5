//! Boundary to the layout engine.
//!
//! Positioning nodes on screen is somebody else's job. This module only fixes
//! the contract: the engine receives the visible nodes (in a stable order,
//! with per-kind size hints) plus the visible edges, and hands back one
//! position per node. Nothing here knows how a concrete engine works.

#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;

use beadview_core::config::LayoutConfig;
use beadview_core::{Edge, NodeKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::graph::collapse::CollapsedView;

/// Rendered dimensions of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

impl NodeSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Size hints per node kind. Epics render larger than everything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeHints {
    pub epic: NodeSize,
    pub task: NodeSize,
}

impl SizeHints {
    #[must_use]
    pub const fn for_kind(&self, kind: NodeKind) -> NodeSize {
        match kind {
            NodeKind::Epic => self.epic,
            NodeKind::Task | NodeKind::Other => self.task,
        }
    }
}

impl Default for SizeHints {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for SizeHints {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            epic: NodeSize::new(config.epic_width, config.epic_height),
            task: NodeSize::new(config.task_width, config.task_height),
        }
    }
}

/// One node as the layout engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub kind: NodeKind,
    pub size: NodeSize,
}

/// Everything a layout engine gets to see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutInput {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<Edge>,
}

/// Top-left corner of a node, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

pub type Positions = BTreeMap<String, Position>;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid size hint for {kind} nodes: {width}x{height}")]
    InvalidSize {
        kind: NodeKind,
        width: f64,
        height: f64,
    },
    #[error("layout engine returned no position for node '{0}'")]
    MissingPosition(String),
    #[error("layout engine failed: {0}")]
    Engine(String),
}

/// A pluggable layout algorithm.
pub trait LayoutEngine {
    /// Assign a position to every node in `input`.
    ///
    /// # Errors
    ///
    /// Implementations report their own failures as [`LayoutError::Engine`].
    fn compute_layout(&self, input: &LayoutInput) -> Result<Positions, LayoutError>;
}

/// Build the engine input from a collapsed view.
///
/// Node order follows the view (model order), so engines that are sensitive
/// to input order produce stable results across refreshes.
#[must_use]
pub fn layout_input(view: &CollapsedView, hints: &SizeHints) -> LayoutInput {
    LayoutInput {
        nodes: view
            .visible_nodes
            .iter()
            .map(|node| LayoutNode {
                id: node.id.clone(),
                kind: node.kind,
                size: hints.for_kind(node.kind),
            })
            .collect(),
        edges: view.visible_edges.clone(),
    }
}

/// Run `engine` on `input`, checking both sides of the contract.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidSize`] before calling the engine if a size
/// hint is non-positive or non-finite, [`LayoutError::MissingPosition`] if the
/// engine skipped a node, and passes engine failures through.
#[instrument(skip_all, fields(nodes = input.nodes.len(), edges = input.edges.len()))]
pub fn run_layout(engine: &dyn LayoutEngine, input: &LayoutInput) -> Result<Positions, LayoutError> {
    if let Some(bad) = input.nodes.iter().find(|node| !node.size.is_valid()) {
        return Err(LayoutError::InvalidSize {
            kind: bad.kind,
            width: bad.size.width,
            height: bad.size.height,
        });
    }

    let positions = engine.compute_layout(input)?;

    if let Some(missing) = input
        .nodes
        .iter()
        .find(|node| !positions.contains_key(&node.id))
    {
        return Err(LayoutError::MissingPosition(missing.id.clone()));
    }

    Ok(positions)
}
