#![forbid(unsafe_code)]
//! beadview-core library.
//!
//! Shared data model for the dependency visualizer: work items ([`model::Node`]),
//! dependency links ([`model::Edge`]), the snapshot document delivered by the
//! dashboard transport, stable error codes, and layered configuration.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for application-level return types and
//!   `thiserror` enums where callers need to match on the failure.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;

pub use model::{Edge, GraphSnapshot, Node, NodeKind, Status};
