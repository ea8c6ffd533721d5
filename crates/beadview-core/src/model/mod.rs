//! Work-item graph data model.
//!
//! - [`node`]: beads, dependency edges, and their status/kind enums.
//! - [`snapshot`]: the `{nodes, edges}` document fetched from the dependency
//!   graph endpoint, plus loading helpers.

pub mod node;
pub mod snapshot;

pub use node::{Edge, Node, NodeKind, ParseEnumError, Status};
pub use snapshot::{GraphSnapshot, SnapshotError};
