//! Reference layered layout engine.
//!
//! Nodes are ranked by the longest dependency chain ending at them (cycle
//! edges ignored), ranks become columns left to right, and the nodes of one
//! rank are stacked top to bottom in input order.

use beadview_core::Node;
use beadview_core::config::LayoutConfig;
use beadview_graph::graph::{
    GraphModel, LayoutEngine, LayoutError, LayoutInput, Position, Positions, chain_depths,
    detect_cycles,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredLayout {
    /// Horizontal space between two ranks.
    pub rank_gap: f64,
    /// Vertical space between two nodes of the same rank.
    pub node_gap: f64,
}

impl LayeredLayout {
    pub const fn from_config(config: &LayoutConfig) -> Self {
        Self {
            rank_gap: config.rank_gap,
            node_gap: config.node_gap,
        }
    }

    fn check_gaps(&self) -> Result<(), LayoutError> {
        for (name, gap) in [("rank_gap", self.rank_gap), ("node_gap", self.node_gap)] {
            if !gap.is_finite() || gap < 0.0 {
                return Err(LayoutError::Engine(format!(
                    "{name} must be a non-negative number, got {gap}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl LayoutEngine for LayeredLayout {
    fn compute_layout(&self, input: &LayoutInput) -> Result<Positions, LayoutError> {
        self.check_gaps()?;

        let nodes: Vec<Node> = input
            .nodes
            .iter()
            .map(|node| Node::new(node.id.clone(), node.kind))
            .collect();
        let model = GraphModel::build(&nodes, &input.edges);
        let cycles = detect_cycles(&model);
        let depths = chain_depths(&model, &cycles);

        // ranks[r] holds indices into input.nodes, in input order.
        let mut ranks: Vec<Vec<usize>> = Vec::new();
        for (i, node) in input.nodes.iter().enumerate() {
            let depth = depths.get(&node.id).copied().ok_or_else(|| {
                LayoutError::Engine(format!("node '{}' could not be ranked", node.id))
            })?;
            let rank = depth.saturating_sub(1);
            if ranks.len() <= rank {
                ranks.resize_with(rank + 1, Vec::new);
            }
            ranks[rank].push(i);
        }

        let mut positions = Positions::new();
        let mut x = 0.0;
        for members in &ranks {
            let mut y = 0.0;
            let mut column_width: f64 = 0.0;
            for &i in members {
                let node = &input.nodes[i];
                positions.insert(node.id.clone(), Position { x, y });
                y += node.size.height + self.node_gap;
                column_width = column_width.max(node.size.width);
            }
            if !members.is_empty() {
                x += column_width + self.rank_gap;
            }
        }

        Ok(positions)
    }
}
