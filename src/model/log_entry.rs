//! Log entry types representing parsed JSONL entries.
//!
//! LogEntry is the core parsed log entry from the JSONL file.
//! All fields are validated at construction time and never mutated afterwards.

use crate::model::{ContentBlock, EntryUuid, SessionId, ToolCall, ToolResult};
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// ===== Origin =====

/// Where a line came from: an optional source label and a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    source: Option<Arc<str>>,
    line: usize,
}

impl Origin {
    /// Origin of line `line` (1-based) in `source`.
    pub fn new(source: Option<Arc<str>>, line: usize) -> Self {
        Self { source, line }
    }

    /// Source label (usually the log file path), if the caller supplied one.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// 1-based line number within the source.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}:{}", source, self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Origin", 2)?;
        state.serialize_field("source", &self.source())?;
        state.serialize_field("line", &self.line)?;
        state.end()
    }
}

// ===== EntryType =====

/// Type of log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryType {
    /// User message; carries tool results.
    User,
    /// Assistant message; carries tool requests.
    Assistant,
    /// System notice.
    System,
    /// Any other record type (`summary`, `progress`, `result`, ...)
    Other(String),
}

impl EntryType {
    /// Whether tool blocks in this entry take part in joining.
    pub fn carries_tool_blocks(&self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

// ===== EntryMetadata =====

/// Additional metadata from the log entry.
#[derive(Debug, Clone, Default)]
pub struct EntryMetadata {
    /// Working directory of the session when the entry was written.
    pub cwd: Option<PathBuf>,
    /// Entry belongs to a subagent conversation.
    pub is_sidechain: bool,
    /// Structured tool metadata (`toolUseResult`) recorded alongside results.
    pub tool_use_result: Option<serde_json::Value>,
}

// ===== LogEntry =====

/// A parsed log entry from the JSONL file.
#[derive(Debug, Clone)]
pub struct LogEntry {
    origin: Origin,
    uuid: Option<EntryUuid>,
    session_id: SessionId,
    timestamp: Option<DateTime<Utc>>,
    entry_type: EntryType,
    content_blocks: Vec<ContentBlock>,
    metadata: EntryMetadata,
}

impl LogEntry {
    /// Assemble an entry from validated parts.
    pub fn new(
        origin: Origin,
        uuid: Option<EntryUuid>,
        session_id: SessionId,
        timestamp: Option<DateTime<Utc>>,
        entry_type: EntryType,
        content_blocks: Vec<ContentBlock>,
        metadata: EntryMetadata,
    ) -> Self {
        Self {
            origin,
            uuid,
            session_id,
            timestamp,
            entry_type,
            content_blocks,
            metadata,
        }
    }

    // ===== Accessors (read-only) =====

    /// Where the entry was read from.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Entry uuid, when present.
    pub fn uuid(&self) -> Option<&EntryUuid> {
        self.uuid.as_ref()
    }

    /// Session the entry belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Entry timestamp; `None` when missing or unparseable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Record type.
    pub fn entry_type(&self) -> &EntryType {
        &self.entry_type
    }

    /// Message content blocks in order.
    pub fn content_blocks(&self) -> &[ContentBlock] {
        &self.content_blocks
    }

    /// Extra fields kept from the record.
    pub fn metadata(&self) -> &EntryMetadata {
        &self.metadata
    }

    /// Tool requests in block order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.content_blocks.iter().filter_map(|block| match block {
            ContentBlock::ToolUse(call) => Some(call),
            _ => None,
        })
    }

    /// Tool results in block order.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.content_blocks.iter().filter_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ToolName, ToolUseId};

    fn entry_with(blocks: Vec<ContentBlock>) -> LogEntry {
        LogEntry::new(
            Origin::new(None, 1),
            None,
            SessionId::unknown(),
            None,
            EntryType::Assistant,
            blocks,
            EntryMetadata::default(),
        )
    }

    #[test]
    fn origin_display_with_source() {
        let origin = Origin::new(Some(Arc::from("s.jsonl")), 12);
        assert_eq!(origin.to_string(), "s.jsonl:12");
    }

    #[test]
    fn origin_display_without_source() {
        assert_eq!(Origin::new(None, 3).to_string(), "line 3");
    }

    #[test]
    fn only_user_and_assistant_carry_tool_blocks() {
        assert!(EntryType::User.carries_tool_blocks());
        assert!(EntryType::Assistant.carries_tool_blocks());
        assert!(!EntryType::System.carries_tool_blocks());
        assert!(!EntryType::Other("progress".into()).carries_tool_blocks());
    }

    #[test]
    fn tool_accessors_filter_blocks_in_order() {
        let id = |s: &str| ToolUseId::new(s).unwrap();
        let entry = entry_with(vec![
            ContentBlock::Text { text: "hi".into() },
            ContentBlock::ToolUse(ToolCall::new(id("a"), ToolName::Read, serde_json::Value::Null)),
            ContentBlock::ToolResult(ToolResult::new(id("z"), "out", false)),
            ContentBlock::ToolUse(ToolCall::new(id("b"), ToolName::Bash, serde_json::Value::Null)),
        ]);

        let calls: Vec<_> = entry.tool_calls().map(|c| c.id().as_str()).collect();
        assert_eq!(calls, vec!["a", "b"]);
        assert_eq!(entry.tool_results().count(), 1);
    }

    #[test]
    fn entry_metadata_default_is_not_sidechain() {
        let meta = EntryMetadata::default();
        assert!(!meta.is_sidechain);
        assert!(meta.tool_use_result.is_none());
    }
}
