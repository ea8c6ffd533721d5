use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotUnreadable,
    SnapshotParseError,
    NodeNotFound,
    CycleDetected,
    LayoutFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::SnapshotUnreadable => "E1101",
            Self::SnapshotParseError => "E1102",
            Self::NodeNotFound => "E2001",
            Self::CycleDetected => "E2003",
            Self::LayoutFailed => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotUnreadable => "Graph snapshot could not be read",
            Self::SnapshotParseError => "Graph snapshot is not valid JSON",
            Self::NodeNotFound => "Node not found",
            Self::CycleDetected => "Cycle would be created",
            Self::LayoutFailed => "Layout computation failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .beadview/config.toml and retry."),
            Self::SnapshotUnreadable => Some("Check the snapshot path, or pass `-` to read stdin."),
            Self::SnapshotParseError => {
                Some("Expected an object of the form {\"nodes\": [...], \"edges\": [...]}.")
            }
            Self::NodeNotFound => Some("Use an id present in the snapshot's node list."),
            Self::CycleDetected => Some("Remove/adjust dependency links to keep the graph acyclic."),
            Self::LayoutFailed => Some("Check layout size hints in the [layout] config section."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
