//! `bv analyze`: one-shot summary of a snapshot.
//!
//! Runs the full refresh pipeline (model, cycles, critical path, collapse) and
//! reports everything a dashboard would render in one payload.

use std::io::Write;
use std::path::PathBuf;

use beadview_core::config::ViewConfig;
use beadview_graph::graph::{
    CollapsedRoots, CollapsedView, CriticalPath, CycleReport, GraphModel, collapse,
    compute_critical_path, detect_cycles,
};
use clap::Args;
use serde::Serialize;

use super::CollapseFlags;
use crate::input::load_model;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bv analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Graph snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub flags: CollapseFlags,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphSummary {
    nodes: usize,
    edges: usize,
    dropped_edges: usize,
    duplicate_nodes: usize,
    content_hash: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOutput {
    summary: GraphSummary,
    cycles: CycleReport,
    critical_path: CriticalPath,
    collapsed_roots: CollapsedRoots,
    view: CollapsedView,
}

/// Execute `bv analyze`.
pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode, view: &ViewConfig) -> anyhow::Result<()> {
    let model = load_model(&args.snapshot, output)?;
    let roots = args.flags.roots(&model, view);
    let payload = analyze(&model, roots);

    render_mode(
        output,
        &payload,
        |payload, w| render_analyze_text(payload, w),
        |payload, w| render_analyze_pretty(payload, w),
    )
}

fn analyze(model: &GraphModel, roots: CollapsedRoots) -> AnalyzeOutput {
    let cycles = detect_cycles(model);
    let critical_path = compute_critical_path(model, &cycles);
    let view = collapse(model, &roots);

    AnalyzeOutput {
        summary: GraphSummary {
            nodes: model.node_count(),
            edges: model.edge_count(),
            dropped_edges: model.dropped_edge_count(),
            duplicate_nodes: model.duplicate_node_count(),
            content_hash: model.content_hash().to_string(),
        },
        cycles,
        critical_path,
        collapsed_roots: roots,
        view,
    }
}

fn render_analyze_text(payload: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let summary = &payload.summary;
    writeln!(
        w,
        "nodes {}  edges {}  dropped {}  cycles {}  path {}  hidden {}",
        summary.nodes,
        summary.edges,
        summary.dropped_edges,
        payload.cycles.cycle_count(),
        payload.critical_path.len(),
        payload.view.hidden.len()
    )?;
    writeln!(w, "path {}", payload.critical_path.path.join(" "))?;
    for cycle in &payload.cycles.cycles {
        writeln!(w, "cycle {}", cycle.join(" "))?;
    }
    Ok(())
}

fn render_analyze_pretty(payload: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let summary = &payload.summary;

    pretty_section(w, "Graph")?;
    pretty_kv(w, "nodes", summary.nodes.to_string())?;
    pretty_kv(w, "edges", summary.edges.to_string())?;
    if summary.dropped_edges > 0 {
        pretty_kv(w, "dropped", format!("{} dangling edges", summary.dropped_edges))?;
    }
    if summary.duplicate_nodes > 0 {
        pretty_kv(w, "duplicates", format!("{} repeated ids", summary.duplicate_nodes))?;
    }
    pretty_kv(w, "hash", &summary.content_hash)?;

    writeln!(w)?;
    pretty_section(w, "Cycles")?;
    if payload.cycles.has_cycles {
        for cycle in &payload.cycles.cycles {
            writeln!(w, "  {}", cycle.join(" -> "))?;
        }
    } else {
        writeln!(w, "  none")?;
    }

    writeln!(w)?;
    pretty_section(w, "Critical path")?;
    if payload.critical_path.is_empty() {
        writeln!(w, "  none")?;
    } else {
        writeln!(
            w,
            "  {} ({} items)",
            payload.critical_path.path.join(" -> "),
            payload.critical_path.len()
        )?;
    }

    if !payload.collapsed_roots.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Collapsed")?;
        for (root, count) in &payload.view.child_counts {
            writeln!(w, "  {root}  (+{count})")?;
        }
        pretty_kv(w, "visible", payload.view.visible_nodes.len().to_string())?;
    }

    Ok(())
}
