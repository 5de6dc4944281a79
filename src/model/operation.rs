//! Joined tool operations.
//!
//! An [`Operation`] is one tool request paired with its result. Operations are
//! ordered by the position of the request in the log, never by when the
//! result arrived, and are read-only once constructed.

use crate::model::{Origin, SessionId, ToolCall, ToolName, ToolUseId};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ===== Operation =====

/// Closed set of operation shapes produced by the joiner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Read tool call with its returned content.
    Read(ReadOp),
    /// Write tool call; the request carries the full content.
    Write(WriteOp),
    /// Edit tool call.
    Edit(EditOp),
    /// MultiEdit tool call.
    MultiEdit(MultiEditOp),
    /// Bash tool call.
    BashCommand(BashOp),
    /// Any other tool.
    Other(OtherOp),
    /// Request without a usable result.
    Incomplete(IncompleteOp),
}

impl Operation {
    /// File path this operation concerns, if any.
    ///
    /// Incomplete operations report the path named by their request so a
    /// failed write or an unanswered read still shows up on that file.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Read(op) => Some(&op.path),
            Self::Write(op) => Some(&op.path),
            Self::Edit(op) => Some(&op.path),
            Self::MultiEdit(op) => Some(&op.path),
            Self::Incomplete(op) => op.request.target_path(),
            Self::BashCommand(_) | Self::Other(_) => None,
        }
    }

    /// Fieldless discriminant, with reads split by coverage.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Read(op) if op.is_partial => OperationKind::PartialRead,
            Self::Read(_) => OperationKind::FullRead,
            Self::Write(_) => OperationKind::Write,
            Self::Edit(_) => OperationKind::Edit,
            Self::MultiEdit(_) => OperationKind::MultiEdit,
            Self::BashCommand(_) => OperationKind::BashCommand,
            Self::Other(_) => OperationKind::Other,
            Self::Incomplete(_) => OperationKind::Incomplete,
        }
    }
}

/// Fieldless discriminant of [`Operation`], used in summaries and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Read covering the whole file.
    FullRead,
    /// Read limited by offset/limit or truncated by the tool.
    PartialRead,
    /// See [`Operation::Write`].
    Write,
    /// See [`Operation::Edit`].
    Edit,
    /// See [`Operation::MultiEdit`].
    MultiEdit,
    /// See [`Operation::BashCommand`].
    BashCommand,
    /// See [`Operation::Other`].
    Other,
    /// See [`Operation::Incomplete`].
    Incomplete,
}

impl OperationKind {
    /// Singular and plural labels for human-readable summaries.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            Self::FullRead => ("full read", "full reads"),
            Self::PartialRead => ("partial read", "partial reads"),
            Self::Write => ("write", "writes"),
            Self::Edit => ("edit", "edits"),
            Self::MultiEdit => ("multi-edit", "multi-edits"),
            Self::BashCommand => ("bash command", "bash commands"),
            Self::Other => ("other operation", "other operations"),
            Self::Incomplete => ("incomplete operation", "incomplete operations"),
        }
    }
}

// ===== Variants =====

/// File content returned by the Read tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOp {
    /// Path as logged.
    pub path: String,
    /// Returned text, normalized unless normalization is disabled.
    pub content: String,
    /// True when the result does not cover the whole file.
    pub is_partial: bool,
    /// First line requested, if any.
    pub offset: Option<u64>,
    /// Maximum number of lines requested, if any.
    pub limit: Option<u64>,
}

/// Full-file replacement; content comes verbatim from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOp {
    /// Path as logged.
    pub path: String,
    /// Complete new file content.
    pub content: String,
}

/// A single string replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSpec {
    /// Text to find.
    pub old_string: String,
    /// Replacement text.
    pub new_string: String,
    /// Replace every occurrence instead of requiring exactly one.
    pub replace_all: bool,
}

/// One replacement in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOp {
    /// Path as logged.
    pub path: String,
    /// The replacement itself.
    #[serde(flatten)]
    pub edit: EditSpec,
    /// What the tool reported.
    pub tool_outcome: ToolOutcome,
}

/// Several replacements applied to one file as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiEditOp {
    /// Path as logged.
    pub path: String,
    /// Replacements in application order.
    pub edits: Vec<EditSpec>,
    /// What the tool reported.
    pub tool_outcome: ToolOutcome,
}

/// What the tool itself reported about an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The result was not flagged as an error.
    Succeeded,
    /// The result was flagged as an error.
    Failed {
        /// Error text returned by the tool.
        message: String,
    },
}

impl ToolOutcome {
    /// True for [`ToolOutcome::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A shell command and what it printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BashOp {
    /// Command line as requested.
    pub command: String,
    /// Combined output text.
    pub output: String,
}

/// Any tool the engine does not interpret, or a request that lacked the
/// fields its tool requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherOp {
    /// Tool that was called.
    pub tool_name: ToolName,
    /// Raw request input.
    pub input: serde_json::Value,
    /// Result text.
    pub output: String,
}

/// A request that never produced a usable result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncompleteOp {
    /// The original request.
    pub request: ToolCall,
    /// Why no operation could be built from it.
    pub reason: IncompleteReason,
}

/// Why a request is [`Operation::Incomplete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IncompleteReason {
    /// No result with a matching id appeared before the end of the log.
    NoResult,
    /// The tool answered with an error.
    ToolError {
        /// Error text returned by the tool.
        message: String,
    },
}

// ===== SequencedOperation =====

/// An operation together with its place in the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedOperation {
    position: usize,
    tool_use_id: ToolUseId,
    timestamp: Option<DateTime<Utc>>,
    session_id: SessionId,
    origin: Origin,
    operation: Operation,
}

impl SequencedOperation {
    /// Bundle an operation with where its request appeared.
    pub fn new(
        position: usize,
        tool_use_id: ToolUseId,
        timestamp: Option<DateTime<Utc>>,
        session_id: SessionId,
        origin: Origin,
        operation: Operation,
    ) -> Self {
        Self {
            position,
            tool_use_id,
            timestamp,
            session_id,
            origin,
            operation,
        }
    }

    /// Index of the originating request among all requests in the log.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Id shared by the request and its result.
    pub fn tool_use_id(&self) -> &ToolUseId {
        &self.tool_use_id
    }

    /// Timestamp of the entry holding the request.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Session of the entry holding the request.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Line holding the request.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The joined operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// See [`Operation::path`].
    pub fn path(&self) -> Option<&str> {
        self.operation.path()
    }

    /// See [`Operation::kind`].
    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}
