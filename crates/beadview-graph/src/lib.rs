#![forbid(unsafe_code)]
//! beadview-graph library.
//!
//! The dependency-graph analysis engine behind the bead visualizer. Every
//! entry point is a pure, synchronous function of one input snapshot; callers
//! rebuild on each refresh and keep whichever result is newest.
//!
//! # Conventions
//!
//! - **Errors**: analysis never fails; malformed data is handled by policy
//!   (dangling edges dropped, cycles reported). Only the layout interface
//!   returns `Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod graph;

pub use graph::{
    CollapsedRoots, CollapsedView, CriticalPath, CycleReport, GraphModel, collapse,
    critical_path, detect_cycles,
};
