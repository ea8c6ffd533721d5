//! `bv collapse`: compute the visible subgraph for a set of collapsed roots.

use std::io::Write;
use std::path::PathBuf;

use beadview_core::config::ViewConfig;
use beadview_graph::graph::{CollapsedRoots, CollapsedView, collapse};
use clap::Args;
use serde::Serialize;

use super::CollapseFlags;
use crate::input::load_model;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bv collapse`.
#[derive(Args, Debug)]
pub struct CollapseArgs {
    /// Graph snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub flags: CollapseFlags,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollapseOutput {
    collapsed_roots: CollapsedRoots,
    #[serde(flatten)]
    view: CollapsedView,
}

/// Execute `bv collapse`.
pub fn run_collapse(args: &CollapseArgs, output: OutputMode, view: &ViewConfig) -> anyhow::Result<()> {
    let model = load_model(&args.snapshot, output)?;
    let roots = args.flags.roots(&model, view);
    let payload = CollapseOutput {
        view: collapse(&model, &roots),
        collapsed_roots: roots,
    };

    render_mode(
        output,
        &payload,
        |payload, w| render_collapse_text(payload, w),
        |payload, w| render_collapse_pretty(payload, w),
    )
}

fn render_collapse_text(payload: &CollapseOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let visible: Vec<&str> = payload
        .view
        .visible_nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect();
    let hidden: Vec<&str> = payload.view.hidden.iter().map(String::as_str).collect();

    writeln!(w, "visible  {}", visible.join(" "))?;
    writeln!(w, "hidden   {}", hidden.join(" "))?;
    for (root, count) in &payload.view.child_counts {
        writeln!(w, "{root}  {count}")?;
    }
    Ok(())
}

fn render_collapse_pretty(payload: &CollapseOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let view = &payload.view;

    pretty_section(w, "Collapsed view")?;
    pretty_kv(w, "visible", view.visible_nodes.len().to_string())?;
    pretty_kv(w, "hidden", view.hidden.len().to_string())?;
    pretty_kv(w, "edges", view.visible_edges.len().to_string())?;

    if !view.child_counts.is_empty() {
        writeln!(w, "\nCollapsed roots:")?;
        for (root, count) in &view.child_counts {
            writeln!(w, "  {root}  (+{count})")?;
        }
    }

    let stale: Vec<&str> = payload
        .collapsed_roots
        .iter()
        .filter(|root| !view.child_counts.contains_key(*root))
        .collect();
    if !stale.is_empty() {
        writeln!(w, "\nIgnored (not in graph): {}", stale.join(", "))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadview_core::{Edge, Node};
    use beadview_graph::graph::GraphModel;

    fn payload(roots: &[&str]) -> CollapseOutput {
        let model = GraphModel::build(
            &[
                Node::epic("e1"),
                Node::task("c1"),
                Node::task("c2"),
                Node::task("other"),
            ],
            &[Edge::new("c1", "e1"), Edge::new("c2", "e1")],
        );
        let roots: CollapsedRoots = roots.iter().copied().collect();
        CollapseOutput {
            view: collapse(&model, &roots),
            collapsed_roots: roots,
        }
    }

    #[test]
    fn json_flattens_view_fields() {
        let value = serde_json::to_value(payload(&["e1"])).unwrap();
        assert_eq!(value["collapsedRoots"], serde_json::json!(["e1"]));
        assert_eq!(value["hidden"], serde_json::json!(["c1", "c2"]));
        assert_eq!(value["childCounts"]["e1"], 2);
        assert!(value["visibleNodes"].is_array());
        assert!(value["visibleEdges"].is_array());
    }

    #[test]
    fn text_lists_visible_hidden_and_counts() {
        let mut out = Vec::new();
        render_collapse_text(&payload(&["e1"]), &mut out).unwrap();

        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("visible  e1 other"));
        assert!(rendered.contains("hidden   c1 c2"));
        assert!(rendered.contains("e1  2"));
    }

    #[test]
    fn pretty_mentions_ignored_roots() {
        let mut out = Vec::new();
        render_collapse_pretty(&payload(&["e1", "ghost"]), &mut out).unwrap();

        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("e1  (+2)"));
        assert!(rendered.contains("Ignored (not in graph): ghost"));
    }
}
