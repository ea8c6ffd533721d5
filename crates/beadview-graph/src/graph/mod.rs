//! Dependency graph analysis for the bead visualizer.
//!
//! # Overview
//!
//! Raw node/edge lists from the dashboard's graph endpoint are normalized into
//! a petgraph-backed [`GraphModel`]. Three independent analyses consume it:
//! cycle detection, critical-path extraction, and subtree collapsing. The
//! collapsed view is what a layout engine finally positions.
//!
//! ## Pipeline
//!
//! ```text
//! GraphSnapshot { nodes, edges }
//!        ↓  build::GraphModel::build()        (dangling edges dropped)
//! GraphModel (DiGraph, edge dependsOnId → issueId, may contain cycles)
//!        ├─ cycles::detect_cycles()          → CycleReport
//!        │      ↓
//!        │  critical_path::compute_critical_path() → CriticalPath
//!        └─ collapse::collapse(&CollapsedRoots) → CollapsedView
//!               ↓  layout::layout_input()
//!           LayoutEngine (external)          → Positions
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use beadview_core::{Edge, Node};
//! use beadview_graph::graph::{CollapsedRoots, GraphModel, collapse, critical_path, detect_cycles};
//!
//! let nodes = vec![Node::epic("e1"), Node::task("t1"), Node::task("t2")];
//! let edges = vec![Edge::new("t1", "e1"), Edge::new("t2", "t1")];
//!
//! let model = GraphModel::build(&nodes, &edges);
//! let cycles = detect_cycles(&model);
//! let path = critical_path(&model);
//!
//! let mut roots = CollapsedRoots::new();
//! roots.collapse("e1");
//! let view = collapse(&model, &roots);
//!
//! assert!(!cycles.has_cycles);
//! assert_eq!(path.path, vec!["e1", "t1", "t2"]);
//! assert_eq!(view.child_counts["e1"], 2);
//! ```

pub mod build;
pub mod collapse;
pub mod critical_path;
pub mod cycles;
pub mod layout;

// Re-export primary types at module level for convenience.
pub use build::GraphModel;
pub use collapse::{CollapsedRoots, CollapsedView, collapse, descendants, hidden_ids};
pub use critical_path::{CriticalPath, chain_depths, compute_critical_path, critical_path};
pub use cycles::{CycleReport, detect_cycles, would_create_cycle};
pub use layout::{
    LayoutEngine, LayoutError, LayoutInput, LayoutNode, NodeSize, Position, Positions, SizeHints,
    layout_input, run_layout,
};
