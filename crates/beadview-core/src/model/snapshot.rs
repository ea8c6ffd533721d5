//! The `{nodes, edges}` document served by the dependency graph endpoint.
//!
//! The transport that fetches it is not part of this crate; callers hand us
//! the raw JSON (or a file containing it) and get typed records back. Shape
//! validation happens here, once, so the analysis code never re-checks it.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::node::{Edge, Node};

/// One refresh worth of graph data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Failure to obtain a [`GraphSnapshot`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    /// Machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::SnapshotUnreadable,
            Self::Parse { .. } => ErrorCode::SnapshotParseError,
        }
    }
}

impl GraphSnapshot {
    #[must_use]
    pub const fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Parse a snapshot from a JSON string. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Parse`] when the JSON is malformed or a node
    /// lacks an `id`.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|source| SnapshotError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        debug!(
            origin,
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "parsed graph snapshot"
        );
        Ok(snapshot)
    }

    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the file cannot be read and
    /// [`SnapshotError::Parse`] if its contents are not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    /// Read a snapshot from any reader (typically stdin).
    ///
    /// # Errors
    ///
    /// Same as [`GraphSnapshot::load`], with `<stdin>` as the reported path.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, SnapshotError> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| SnapshotError::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        Self::from_json_str(&content, "<stdin>")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
