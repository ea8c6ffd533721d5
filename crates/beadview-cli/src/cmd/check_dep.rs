//! `bv check-dep`: test whether a new dependency would close a cycle.

use std::io::Write;
use std::path::PathBuf;

use beadview_core::error::ErrorCode;
use beadview_graph::graph::{GraphModel, would_create_cycle};
use clap::Args;
use serde::Serialize;

use crate::input::load_model;
use crate::output::{CliError, OutputMode, render, render_error};

/// Arguments for `bv check-dep`.
#[derive(Args, Debug)]
pub struct CheckDepArgs {
    /// Graph snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    /// Item that would gain the dependency.
    pub issue: String,

    /// Item it would depend on.
    pub depends_on: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckDepOutput {
    issue_id: String,
    depends_on_id: String,
}

/// Execute `bv check-dep`.
///
/// Fails with `E2001` when either id is unknown and `E2003` when the
/// dependency would close a cycle.
pub fn run_check_dep(args: &CheckDepArgs, output: OutputMode) -> anyhow::Result<()> {
    let model = load_model(&args.snapshot, output)?;

    if let Some(missing) = first_missing(&model, &[&args.issue, &args.depends_on]) {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::NodeNotFound,
                format!("node '{missing}' is not in the snapshot"),
            ),
        )?;
        anyhow::bail!("{}: node '{missing}' not found", ErrorCode::NodeNotFound);
    }

    if let Some(cycle) = would_create_cycle(&model, &args.issue, &args.depends_on) {
        let message = format!(
            "'{}' depending on '{}' would close a cycle: {}",
            args.issue,
            args.depends_on,
            cycle.join(" -> ")
        );
        render_error(output, &CliError::from_code(ErrorCode::CycleDetected, &message))?;
        anyhow::bail!("{}: {message}", ErrorCode::CycleDetected);
    }

    let payload = CheckDepOutput {
        issue_id: args.issue.clone(),
        depends_on_id: args.depends_on.clone(),
    };
    render(output, &payload, |payload, w| render_check_dep_human(payload, w))
}

fn first_missing<'a>(model: &GraphModel, ids: &[&'a String]) -> Option<&'a str> {
    ids.iter()
        .copied()
        .find(|id| !model.contains(id))
        .map(String::as_str)
}

fn render_check_dep_human(payload: &CheckDepOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "ok: '{}' can depend on '{}' without creating a cycle",
        payload.issue_id, payload.depends_on_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadview_core::{Edge, Node};

    #[test]
    fn first_missing_reports_unknown_id() {
        let model = GraphModel::build(&[Node::task("a")], &[]);
        let a = "a".to_string();
        let ghost = "ghost".to_string();

        assert_eq!(first_missing(&model, &[&a, &a]), None);
        assert_eq!(first_missing(&model, &[&a, &ghost]), Some("ghost"));
    }

    #[test]
    fn human_confirms_safe_dependency() {
        let payload = CheckDepOutput {
            issue_id: "b".into(),
            depends_on_id: "a".into(),
        };
        let mut out = Vec::new();
        render_check_dep_human(&payload, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("ok:"));
    }

    #[test]
    fn json_payload_names_both_ends() {
        let payload = CheckDepOutput {
            issue_id: "b".into(),
            depends_on_id: "a".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, serde_json::json!({ "issueId": "b", "dependsOnId": "a" }));
    }

    #[test]
    fn closing_edge_is_detected_on_model() {
        let model = GraphModel::build(
            &[Node::task("a"), Node::task("b")],
            &[Edge::new("b", "a")],
        );
        assert!(would_create_cycle(&model, "a", "b").is_some());
        assert!(would_create_cycle(&model, "b", "a").is_none());
    }
}
