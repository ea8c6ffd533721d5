use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Kind of work item. Only epics change how the visualizer treats a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Task,
    Epic,
    /// Any other upstream type (bug, feature, chore, ...).
    #[serde(other)]
    Other,
}

impl NodeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Other => "other",
        }
    }

    /// Returns `true` for epic nodes.
    #[must_use]
    pub const fn is_epic(self) -> bool {
        matches!(self, Self::Epic)
    }
}

/// Lifecycle status as reported by the tracker.
///
/// Unrecognized values deserialize to [`Status::Unknown`] so a new upstream
/// status never rejects a whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Blocked,
    Deferred,
    Closed,
    #[serde(other)]
    Unknown,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Deferred => "deferred",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` once the item no longer needs work.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A bead: one node of the dependency graph.
///
/// Identity is `id`. Everything else is display payload carried through the
/// analysis untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Status,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Node {
    /// Create an open node of the given kind with the id doubling as title.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            status: Status::Open,
            kind,
            priority: 0,
            assignee: None,
            source: None,
        }
    }

    #[must_use]
    pub fn task(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Task)
    }

    #[must_use]
    pub fn epic(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Epic)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn is_epic(&self) -> bool {
        self.kind.is_epic()
    }
}

/// A dependency link: `issue_id` depends on `depends_on_id`.
///
/// Traversal direction is `depends_on_id → issue_id`, i.e. from the blocker
/// toward the item waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub issue_id: String,
    pub depends_on_id: String,
}

impl Edge {
    #[must_use]
    pub fn new(issue_id: impl Into<String>, depends_on_id: impl Into<String>) -> Self {
        Self {
            issue_id: issue_id.into(),
            depends_on_id: depends_on_id.into(),
        }
    }

    /// Stable identifier for this edge, `"dependsOnId->issueId"`.
    #[must_use]
    pub fn key(&self) -> String {
        edge_key(&self.depends_on_id, &self.issue_id)
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.issue_id == self.depends_on_id
    }
}

/// Build the edge key for a traversal edge `from → to`.
///
/// `from` is the dependency (blocker) and `to` the dependent item.
#[must_use]
pub fn edge_key(from: &str, to: &str) -> String {
    format!("{from}->{to}")
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for NodeKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "task" => Ok(Self::Task),
            "epic" => Ok(Self::Epic),
            "other" => Ok(Self::Other),
            _ => Err(ParseEnumError {
                expected: "type",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "deferred" => Ok(Self::Deferred),
            "closed" => Ok(Self::Closed),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_deserializes_wire_shape() {
        let node: Node = serde_json::from_str(
            r#"{"id":"bd-1","title":"Ship it","status":"in_progress","type":"epic",
                "priority":1,"assignee":null,"source":"rig-a"}"#,
        )
        .unwrap();

        assert_eq!(node.id, "bd-1");
        assert_eq!(node.status, Status::InProgress);
        assert_eq!(node.kind, NodeKind::Epic);
        assert_eq!(node.priority, 1);
        assert!(node.assignee.is_none());
        assert_eq!(node.source.as_deref(), Some("rig-a"));
    }

    #[test]
    fn node_optional_fields_default() {
        let node: Node = serde_json::from_str(r#"{"id":"bd-2"}"#).unwrap();
        assert_eq!(node.title, "");
        assert_eq!(node.status, Status::Open);
        assert_eq!(node.kind, NodeKind::Task);
        assert_eq!(node.priority, 0);
        assert!(node.source.is_none());
    }

    #[test]
    fn unknown_enum_values_fall_back() {
        let node: Node =
            serde_json::from_str(r#"{"id":"bd-3","status":"hooked","type":"bug"}"#).unwrap();
        assert_eq!(node.status, Status::Unknown);
        assert_eq!(node.kind, NodeKind::Other);
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(serde_json::from_str::<Node>(r#"{"title":"no id"}"#).is_err());
    }

    #[test]
    fn source_omitted_when_absent() {
        let json = serde_json::to_string(&Node::task("bd-4")).unwrap();
        assert!(!json.contains("source"));
        assert!(json.contains(r#""type":"task""#));
        assert!(json.contains(r#""assignee":null"#));
    }

    #[test]
    fn edge_uses_camel_case_keys() {
        let edge: Edge = serde_json::from_str(r#"{"issueId":"b","dependsOnId":"a"}"#).unwrap();
        assert_eq!(edge, Edge::new("b", "a"));
        assert_eq!(edge.key(), "a->b");
        assert!(!edge.is_self_loop());
        assert!(Edge::new("x", "x").is_self_loop());
    }

    #[test]
    fn display_parse_roundtrips() {
        for status in [
            Status::Open,
            Status::InProgress,
            Status::Blocked,
            Status::Deferred,
            Status::Closed,
            Status::Unknown,
        ] {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
        for kind in [NodeKind::Task, NodeKind::Epic, NodeKind::Other] {
            assert_eq!(kind.to_string().parse::<NodeKind>().unwrap(), kind);
        }
        assert_eq!(" In-Progress ".parse::<Status>().unwrap(), Status::InProgress);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "sprint".parse::<NodeKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid type: 'sprint'");
    }
}
