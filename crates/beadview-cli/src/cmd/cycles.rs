//! `bv cycles`: list dependency cycles.

use std::io::Write;
use std::path::PathBuf;

use beadview_graph::graph::{CycleReport, GraphModel, detect_cycles};
use clap::Args;

use crate::input::load_model;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bv cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// Graph snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,
}

/// Execute `bv cycles`.
pub fn run_cycles(args: &CyclesArgs, output: OutputMode) -> anyhow::Result<()> {
    let model = load_model(&args.snapshot, output)?;
    let report = detect_cycles(&model);

    render_mode(
        output,
        &report,
        |report, w| render_cycles_text(report, w),
        |report, w| render_cycles_pretty(report, &model, w),
    )
}

fn render_cycles_text(report: &CycleReport, w: &mut dyn Write) -> std::io::Result<()> {
    for cycle in &report.cycles {
        writeln!(w, "{}", cycle.join(" "))?;
    }
    Ok(())
}

fn render_cycles_pretty(
    report: &CycleReport,
    model: &GraphModel,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if !report.has_cycles {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    pretty_section(w, &format!("Dependency cycles ({})", report.cycle_count()))?;
    pretty_kv(w, "nodes", report.nodes_in_cycles.len().to_string())?;
    pretty_kv(w, "edges", report.edges_in_cycles.len().to_string())?;

    for (idx, cycle) in report.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for item_id in cycle {
            match model.node(item_id).map(|node| node.title.as_str()) {
                Some(title) if !title.is_empty() => writeln!(w, "  - {item_id}  {title}")?,
                _ => writeln!(w, "  - {item_id}")?,
            }
        }
    }

    Ok(())
}
