//! JSONL parser for Claude Code log entries.
//!
//! This module provides pure parsing functions for converting JSONL lines
//! into validated LogEntry structs, and [`EntryStream`], a lazy iterator that
//! applies them to a sequence of lines.

use crate::integration::Cancellation;
use crate::model::{
    ContentBlock, EntryMetadata, EntryType, EntryUuid, LogEntry, MalformedEntry, Origin,
    ParseError, SessionId, ToolCall, ToolName, ToolResult, ToolUseId,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

// Entry type string constants
const ENTRY_TYPE_USER: &str = "user";
const ENTRY_TYPE_ASSISTANT: &str = "assistant";
const ENTRY_TYPE_SYSTEM: &str = "system";
const ENTRY_TYPE_PROGRESS: &str = "progress";

// Block type string constants
const BLOCK_TEXT: &str = "text";
const BLOCK_TOOL_USE: &str = "tool_use";
const BLOCK_TOOL_RESULT: &str = "tool_result";
const BLOCK_THINKING: &str = "thinking";

// Session ID constants
pub(crate) const UNKNOWN_SESSION_ID: &str = "unknown-session";

/// Raw JSON structure for deserializing log entries.
///
/// Unknown fields are ignored; the upstream format adds fields regularly.
#[derive(Debug, Deserialize)]
struct RawLogEntry {
    #[serde(default, rename = "type")]
    entry_type: Option<String>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default, rename = "sessionId")]
    session_id: Option<String>,
    #[serde(default, rename = "session_id")]
    session_id_snake: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default, rename = "isSidechain")]
    is_sidechain: Option<bool>,
    #[serde(default, rename = "toolUseResult")]
    tool_use_result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    content: Option<RawMessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMessageContent {
    Text(String),
    Blocks(Vec<Value>),
}

#[derive(Debug, Deserialize)]
struct RawToolUse {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    input: Value,
}

#[derive(Debug, Deserialize)]
struct RawToolResult {
    tool_use_id: String,
    #[serde(default)]
    content: Option<RawToolResultContent>,
    #[serde(default)]
    is_error: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawToolResultContent {
    Text(String),
    Blocks(Vec<Value>),
}

/// Result of parsing a JSONL line with graceful error handling.
///
/// This allows the parser to continue processing subsequent lines
/// even when encountering malformed JSON.
#[derive(Debug, Clone)]
pub enum ParseResult {
    /// Successfully parsed a valid log entry.
    Valid(Box<LogEntry>),
    /// Encountered a malformed line that could not be parsed.
    Malformed(MalformedEntry),
}

impl ParseResult {
    /// The entry, if the line parsed.
    pub fn as_valid(&self) -> Option<&LogEntry> {
        match self {
            Self::Valid(entry) => Some(entry),
            Self::Malformed(_) => None,
        }
    }

    /// The malformed record, if the line did not parse.
    pub fn as_malformed(&self) -> Option<&MalformedEntry> {
        match self {
            Self::Valid(_) => None,
            Self::Malformed(malformed) => Some(malformed),
        }
    }
}

/// Parse a single JSONL line gracefully.
///
/// Unlike `parse_entry()`, this function never returns an error.
/// Instead, it returns either a valid LogEntry or a MalformedEntry
/// carrying the line's origin and the decode error.
pub fn parse_entry_graceful(raw: &str, origin: Origin) -> ParseResult {
    match parse_entry(raw, origin.clone()) {
        Ok(entry) => ParseResult::Valid(Box::new(entry)),
        Err(parse_error) => {
            warn!("Skipping malformed entry at {}: {}", origin, parse_error);
            let session_id = extract_session_id_best_effort(raw);

            ParseResult::Malformed(MalformedEntry::new(
                origin,
                raw,
                parse_error.to_string(),
                session_id,
            ))
        }
    }
}

/// Attempt to extract the session id from a line that failed validation.
fn extract_session_id_best_effort(raw: &str) -> Option<SessionId> {
    serde_json::from_str::<RawLogEntry>(raw)
        .ok()
        .and_then(|partial| partial.session_id.or(partial.session_id_snake))
        .and_then(|id| SessionId::new(id).ok())
}

/// Parse a single JSONL line into a LogEntry.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - JSON is malformed or not an object
/// - The `type` field is missing
/// - A tool block lacks its id
pub fn parse_entry(raw: &str, origin: Origin) -> Result<LogEntry, ParseError> {
    let line = origin.line();

    let raw_entry: RawLogEntry =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
            line,
            message: e.to_string(),
        })?;

    let entry_type = match raw_entry.entry_type.as_deref() {
        Some(type_str) => parse_entry_type(type_str),
        None => return Err(ParseError::MissingField { line, field: "type" }),
    };

    let uuid = raw_entry.uuid.and_then(|id| EntryUuid::new(id).ok());

    let session_id = raw_entry
        .session_id
        .or(raw_entry.session_id_snake)
        .and_then(|id| SessionId::new(id).ok())
        .unwrap_or_else(SessionId::unknown);

    let timestamp = raw_entry
        .timestamp
        .as_deref()
        .and_then(|ts| parse_timestamp(ts, &origin));

    // Progress records duplicate sub-agent traffic; their payload is never used.
    let is_progress = matches!(&entry_type, EntryType::Other(t) if t == ENTRY_TYPE_PROGRESS);
    let content_blocks = match raw_entry.message {
        Some(message) if !is_progress && !message.is_null() => parse_message(message, line)?,
        _ => Vec::new(),
    };

    let metadata = EntryMetadata {
        cwd: raw_entry.cwd.map(PathBuf::from),
        is_sidechain: raw_entry.is_sidechain.unwrap_or(false),
        tool_use_result: raw_entry.tool_use_result.filter(|v| !v.is_null()),
    };

    Ok(LogEntry::new(
        origin,
        uuid,
        session_id,
        timestamp,
        entry_type,
        content_blocks,
        metadata,
    ))
}

/// Parse the "type" field into EntryType enum. Unknown types are kept verbatim.
fn parse_entry_type(type_str: &str) -> EntryType {
    match type_str {
        ENTRY_TYPE_USER => EntryType::User,
        ENTRY_TYPE_ASSISTANT => EntryType::Assistant,
        ENTRY_TYPE_SYSTEM => EntryType::System,
        other => EntryType::Other(other.to_string()),
    }
}

fn parse_timestamp(raw: &str, origin: &Origin) -> Option<DateTime<Utc>> {
    match raw.parse::<DateTime<Utc>>() {
        Ok(ts) => Some(ts),
        Err(e) => {
            debug!("Ignoring unparseable timestamp {:?} at {}: {}", raw, origin, e);
            None
        }
    }
}

/// Parse the `message` object into content blocks.
fn parse_message(message: Value, line: usize) -> Result<Vec<ContentBlock>, ParseError> {
    let raw: RawMessage = serde_json::from_value(message).map_err(|e| ParseError::InvalidJson {
        line,
        message: format!("message: {}", e),
    })?;

    match raw.content {
        None => Ok(Vec::new()),
        Some(RawMessageContent::Text(text)) => Ok(vec![ContentBlock::Text { text }]),
        Some(RawMessageContent::Blocks(blocks)) => blocks
            .into_iter()
            .map(|block| parse_content_block(block, line))
            .collect(),
    }
}

/// Parse a raw content block into a ContentBlock.
fn parse_content_block(raw: Value, line: usize) -> Result<ContentBlock, ParseError> {
    let block_type = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match block_type.as_str() {
        BLOCK_TEXT => Ok(ContentBlock::Text {
            text: string_field(&raw, "text"),
        }),
        BLOCK_THINKING => Ok(ContentBlock::Thinking {
            thinking: string_field(&raw, "thinking"),
        }),
        BLOCK_TOOL_USE => {
            let block: RawToolUse =
                serde_json::from_value(raw).map_err(|_| ParseError::MissingField {
                    line,
                    field: "tool_use.id",
                })?;
            let id = ToolUseId::new(block.id).map_err(|_| ParseError::MissingField {
                line,
                field: "tool_use.id",
            })?;
            Ok(ContentBlock::ToolUse(ToolCall::new(
                id,
                ToolName::parse(&block.name),
                block.input,
            )))
        }
        BLOCK_TOOL_RESULT => {
            let block: RawToolResult =
                serde_json::from_value(raw).map_err(|_| ParseError::MissingField {
                    line,
                    field: "tool_result.tool_use_id",
                })?;
            let id = ToolUseId::new(block.tool_use_id).map_err(|_| ParseError::MissingField {
                line,
                field: "tool_result.tool_use_id",
            })?;
            let content = match block.content {
                None => String::new(),
                Some(RawToolResultContent::Text(text)) => text,
                Some(RawToolResultContent::Blocks(parts)) => join_text_parts(&parts),
            };
            Ok(ContentBlock::ToolResult(ToolResult::new(
                id,
                content,
                block.is_error.unwrap_or(false),
            )))
        }
        _ => Ok(ContentBlock::Other { block_type }),
    }
}

fn string_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Join the text parts of a list-shaped tool result with newlines.
fn join_text_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) if part.get("type").and_then(Value::as_str) == Some(BLOCK_TEXT) => {
                part.get("text").and_then(Value::as_str)
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== EntryStream =====

/// Lazy stream of parse results over a sequence of lines.
///
/// Line numbers are 1-based and count blank lines, which are skipped without
/// producing a result. When a [`Cancellation`] is attached it is checked before
/// every line and the stream ends as soon as it fires.
pub struct EntryStream<I> {
    lines: I,
    source: Option<Arc<str>>,
    line_number: usize,
    cancellation: Option<Cancellation>,
}

impl<I> EntryStream<I> {
    /// Stream over `lines` with no source label.
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            source: None,
            line_number: 0,
            cancellation: None,
        }
    }

    /// Label origins with a source name, usually the log file path.
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Stop before the next line once `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }
}

impl<I, S> Iterator for EntryStream<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = ParseResult;

    fn next(&mut self) -> Option<ParseResult> {
        loop {
            if self
                .cancellation
                .as_ref()
                .is_some_and(Cancellation::is_cancelled)
            {
                return None;
            }

            let line = self.lines.next()?;
            self.line_number += 1;
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }

            let origin = Origin::new(self.source.clone(), self.line_number);
            return Some(parse_entry_graceful(line, origin));
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
