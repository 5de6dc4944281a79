//! Content block types for Claude Code log entries.
//!
//! A log entry's `message.content` is an ordered list of heterogeneous blocks.
//! Only tool requests and tool results matter for reconstruction; the rest are
//! kept so that consumers browsing a conversation see the same sequence.

use crate::model::ToolUseId;
use serde::{Serialize, Serializer};

// ===== ContentBlock =====

/// Individual content block within a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Plain text authored by the user or assistant
    Text {
        /// Markdown content
        text: String,
    },
    /// Tool invocation by the assistant
    ToolUse(ToolCall),
    /// Result returned from a tool execution
    ToolResult(ToolResult),
    /// Extended thinking block
    Thinking {
        /// Reasoning content
        thinking: String,
    },
    /// Block type the parser does not model (images, future additions)
    Other {
        /// The block's `type` tag as written in the log
        block_type: String,
    },
}

// ===== ToolCall =====

/// Tool invocation recorded in a Claude Code log.
///
/// The id links to a corresponding [`ToolResult`] in a later entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    id: ToolUseId,
    name: ToolName,
    input: serde_json::Value,
}

impl ToolCall {
    /// Create a tool call from its parsed parts.
    pub fn new(id: ToolUseId, name: ToolName, input: serde_json::Value) -> Self {
        Self { id, name, input }
    }

    /// Unique identifier linking this call to its result
    pub fn id(&self) -> &ToolUseId {
        &self.id
    }

    /// Tool name (Read, Write, Bash, etc.)
    pub fn name(&self) -> &ToolName {
        &self.name
    }

    /// Tool-specific input parameters
    pub fn input(&self) -> &serde_json::Value {
        &self.input
    }

    /// String-valued input parameter, if present.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(serde_json::Value::as_str)
    }

    /// `file_path` input, for the file tools that take one.
    ///
    /// Notebook tools name their target with `notebook_path` and are never
    /// reconstructed, so their requests have no target here.
    pub fn target_path(&self) -> Option<&str> {
        self.input_str("file_path").filter(|p| !p.is_empty())
    }
}

// ===== ToolResult =====

/// Output of a tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    tool_use_id: ToolUseId,
    content: String,
    is_error: bool,
}

impl ToolResult {
    /// Create a tool result from its parsed parts.
    pub fn new(tool_use_id: ToolUseId, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            tool_use_id,
            content: content.into(),
            is_error,
        }
    }

    /// ID of the tool_use this result answers
    pub fn tool_use_id(&self) -> &ToolUseId {
        &self.tool_use_id
    }

    /// Tool output text (file contents, command output, error message)
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the tool reported a failure
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

// ===== ToolName =====

/// Tool names recognized in Claude Code logs.
///
/// Enumerates known tools with a fallback variant for custom or future tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolName {
    /// Read files from filesystem
    Read,
    /// Write files to filesystem
    Write,
    /// Edit existing files (string replacement)
    Edit,
    /// Apply multiple edits atomically
    MultiEdit,
    /// Execute bash commands
    Bash,
    /// Edit a Jupyter notebook cell
    NotebookEdit,
    /// Search file contents with regex
    Grep,
    /// Find files by glob pattern
    Glob,
    /// Create or manage subagent tasks
    Task,
    /// Search the web
    WebSearch,
    /// Fetch web resources
    WebFetch,
    /// Unknown or custom tool
    Other(String),
}

impl ToolName {
    /// Parse a tool name from the JSONL log.
    ///
    /// Recognizes standard Claude Code tools, wrapping unknown names in `Other`.
    pub fn parse(name: &str) -> Self {
        match name {
            "Read" => Self::Read,
            "Write" => Self::Write,
            "Edit" => Self::Edit,
            "MultiEdit" => Self::MultiEdit,
            "Bash" => Self::Bash,
            "NotebookEdit" => Self::NotebookEdit,
            "Grep" => Self::Grep,
            "Glob" => Self::Glob,
            "Task" => Self::Task,
            "WebSearch" => Self::WebSearch,
            "WebFetch" => Self::WebFetch,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Edit => "Edit",
            Self::MultiEdit => "MultiEdit",
            Self::Bash => "Bash",
            Self::NotebookEdit => "NotebookEdit",
            Self::Grep => "Grep",
            Self::Glob => "Glob",
            Self::Task => "Task",
            Self::WebSearch => "WebSearch",
            Self::WebFetch => "WebFetch",
            Self::Other(s) => s,
        }
    }
}

impl Serialize for ToolName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
