//! Snapshot loading shared by every analysis command.

use std::path::Path;

use beadview_core::GraphSnapshot;
use beadview_core::model::SnapshotError;
use beadview_graph::graph::GraphModel;
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// Read a snapshot from `path`, or from stdin when `path` is `-`.
///
/// # Errors
///
/// Returns the underlying [`SnapshotError`] if the source cannot be read or
/// parsed.
pub fn read_snapshot(path: &Path) -> Result<GraphSnapshot, SnapshotError> {
    if path == Path::new("-") {
        GraphSnapshot::from_reader(std::io::stdin().lock())
    } else {
        GraphSnapshot::load(path)
    }
}

/// Load a snapshot and normalize it into a [`GraphModel`].
///
/// Load failures are rendered to stderr in the active output mode before
/// being returned.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or parsed.
pub fn load_model(path: &Path, output: OutputMode) -> anyhow::Result<GraphModel> {
    let snapshot = match read_snapshot(path) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            render_error(output, &CliError::from_code(err.code(), err.to_string()))?;
            return Err(err.into());
        }
    };

    let model = GraphModel::build(&snapshot.nodes, &snapshot.edges);
    debug!(
        nodes = model.node_count(),
        edges = model.edge_count(),
        dropped = model.dropped_edge_count(),
        hash = model.content_hash(),
        "graph model ready"
    );
    Ok(model)
}
