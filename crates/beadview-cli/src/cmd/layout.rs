//! `bv layout`: position the visible subgraph with the layered engine.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use beadview_core::config::ProjectConfig;
use beadview_core::error::ErrorCode;
use beadview_core::{Edge, NodeKind};
use beadview_graph::graph::{LayoutInput, Positions, SizeHints, collapse, layout_input, run_layout};
use clap::Args;
use serde::Serialize;

use super::CollapseFlags;
use crate::input::load_model;
use crate::layout::LayeredLayout;
use crate::output::{CliError, OutputMode, render, render_error};

/// Arguments for `bv layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Graph snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub flags: CollapseFlags,
}

#[derive(Debug, Serialize)]
struct PlacedNode {
    id: String,
    kind: NodeKind,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOutput {
    nodes: Vec<PlacedNode>,
    edges: Vec<Edge>,
    child_counts: BTreeMap<String, usize>,
}

/// Execute `bv layout`.
pub fn run_layout_cmd(
    args: &LayoutArgs,
    output: OutputMode,
    config: &ProjectConfig,
) -> anyhow::Result<()> {
    let model = load_model(&args.snapshot, output)?;
    let roots = args.flags.roots(&model, &config.view);
    let view = collapse(&model, &roots);

    let input = layout_input(&view, &SizeHints::from(&config.layout));
    let engine = LayeredLayout::from_config(&config.layout);
    let positions = match run_layout(&engine, &input) {
        Ok(positions) => positions,
        Err(err) => {
            render_error(
                output,
                &CliError::from_code(ErrorCode::LayoutFailed, err.to_string()),
            )?;
            return Err(err.into());
        }
    };

    let payload = LayoutOutput {
        nodes: place(&input, &positions),
        edges: input.edges,
        child_counts: view.child_counts,
    };

    render(output, &payload, |payload, w| render_layout_human(payload, w))
}

/// Pair every input node with its position. Nodes without one are skipped;
/// `run_layout` has already rejected that case.
fn place(input: &LayoutInput, positions: &Positions) -> Vec<PlacedNode> {
    input
        .nodes
        .iter()
        .filter_map(|node| {
            positions.get(&node.id).map(|pos| PlacedNode {
                id: node.id.clone(),
                kind: node.kind,
                x: pos.x,
                y: pos.y,
                width: node.size.width,
                height: node.size.height,
            })
        })
        .collect()
}

fn render_layout_human(payload: &LayoutOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for node in &payload.nodes {
        let badge = payload
            .child_counts
            .get(&node.id)
            .map(|count| format!("  (+{count})"))
            .unwrap_or_default();
        writeln!(
            w,
            "{:<16} {:<6} x={:<8} y={:<8} {}x{}{badge}",
            node.id,
            node.kind.to_string(),
            node.x,
            node.y,
            node.width,
            node.height
        )?;
    }
    Ok(())
}
