pub mod analyze;
pub mod check_dep;
pub mod collapse;
pub mod completions;
pub mod critical_path;
pub mod cycles;
pub mod layout;

use beadview_core::config::ViewConfig;
use beadview_graph::graph::{CollapsedRoots, GraphModel};
use clap::Args;

/// Collapse selection shared by `analyze`, `collapse` and `layout`.
#[derive(Args, Debug, Default, Clone)]
pub struct CollapseFlags {
    /// Collapse the subtree under this node (repeatable).
    #[arg(long = "collapse", value_name = "ID")]
    pub collapse: Vec<String>,

    /// Collapse every epic.
    #[arg(long, conflicts_with = "collapse")]
    pub collapse_all: bool,
}

impl CollapseFlags {
    /// Resolve the collapsed roots for `model`.
    ///
    /// Explicit flags win; with none given, `[view] collapse_epics` decides.
    pub fn roots(&self, model: &GraphModel, view: &ViewConfig) -> CollapsedRoots {
        if self.collapse_all || (self.collapse.is_empty() && view.collapse_epics) {
            let mut roots = CollapsedRoots::new();
            roots.collapse_all(model);
            return roots;
        }
        self.collapse.iter().cloned().collect()
    }
}
