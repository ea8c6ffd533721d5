//! `bv critical-path`: show the longest dependency chain.

use std::io::Write;
use std::path::PathBuf;

use beadview_graph::graph::{CriticalPath, GraphModel, critical_path};
use clap::Args;

use crate::input::load_model;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `bv critical-path`.
#[derive(Args, Debug)]
pub struct CriticalPathArgs {
    /// Graph snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,
}

/// Execute `bv critical-path`.
pub fn run_critical_path(args: &CriticalPathArgs, output: OutputMode) -> anyhow::Result<()> {
    let model = load_model(&args.snapshot, output)?;
    let path = critical_path(&model);

    render_mode(
        output,
        &path,
        |path, w| writeln!(w, "{}", path.path.join(" ")),
        |path, w| render_critical_path_pretty(path, &model, w),
    )
}

fn render_critical_path_pretty(
    path: &CriticalPath,
    model: &GraphModel,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if path.is_empty() {
        writeln!(w, "Graph is empty; no critical path.")?;
        return Ok(());
    }

    pretty_section(w, "Critical path")?;
    pretty_kv(w, "length", path.len().to_string())?;
    writeln!(w)?;

    for (step, id) in path.path.iter().enumerate() {
        let node = model.node(id);
        let title = node.map_or("", |node| node.title.as_str());
        let status = node.map(|node| node.status.to_string()).unwrap_or_default();
        writeln!(w, "{:>3}. {id:<16} {status:<12} {title}", step + 1)?;
    }

    Ok(())
}
