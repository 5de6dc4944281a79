//! Malformed entry types for unparseable JSONL lines.
//!
//! When a JSONL line cannot be parsed into a valid LogEntry, the parser
//! produces a MalformedEntry and moves on to the next line.

use crate::model::{Origin, SessionId};
use serde::Serialize;

/// A malformed JSONL line that could not be parsed.
#[derive(Debug, Clone, Serialize)]
pub struct MalformedEntry {
    origin: Origin,
    #[serde(skip)]
    raw_line: String,
    error_message: String,
    session_id: Option<SessionId>,
}

impl MalformedEntry {
    /// Create a new malformed entry.
    ///
    /// # Arguments
    ///
    /// * `origin` - Source label and 1-based line number
    /// * `raw_line` - The raw line content that failed to parse
    /// * `error_message` - Human-readable error message
    /// * `session_id` - Optional session ID if extractable from partial parse
    pub fn new(
        origin: Origin,
        raw_line: impl Into<String>,
        error_message: impl Into<String>,
        session_id: Option<SessionId>,
    ) -> Self {
        Self {
            origin,
            raw_line: raw_line.into(),
            error_message: error_message.into(),
            session_id,
        }
    }

    /// Where the line was read from.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Get the line number where the error occurred.
    pub fn line_number(&self) -> usize {
        self.origin.line()
    }

    /// Get the raw line content.
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// Get the error message.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Get the session ID if available.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
}
