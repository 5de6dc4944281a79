//! Operation joiner.
//!
//! Pairs each `tool_use` block with the `tool_result` block that answers it and
//! emits one typed [`Operation`] per request. Operations are positioned by
//! the order in which requests were encountered, so a result that arrives
//! late never reorders history.

mod decode;
pub mod read_content;

use crate::model::{
    IncompleteOp, IncompleteReason, LogEntry, Operation, Origin, SequencedOperation, SessionId,
    ToolCall, ToolResult, ToolUseId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Joiner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOptions {
    /// Strip `cat -n` prefixes and trailing system reminders from Read output.
    pub normalize_read_output: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            normalize_read_output: true,
        }
    }
}

/// A result whose id matches no request seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedResult {
    /// Id the result claims to answer.
    pub tool_use_id: ToolUseId,
    /// Line holding the result.
    pub origin: Origin,
}

/// Everything the joiner produced.
#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    /// One operation per distinct request, ordered by position.
    pub operations: Vec<SequencedOperation>,
    /// Results with no request before them, in log order.
    pub unmatched_results: Vec<UnmatchedResult>,
    /// Requests whose id had already been seen; only the first is kept.
    pub duplicate_requests: usize,
    /// Results for requests that had already completed.
    pub duplicate_results: usize,
}

/// A request waiting for its result.
struct PendingRequest {
    position: usize,
    call: ToolCall,
    timestamp: Option<DateTime<Utc>>,
    session_id: SessionId,
    origin: Origin,
}

impl PendingRequest {
    fn complete(self, operation: Operation) -> SequencedOperation {
        SequencedOperation::new(
            self.position,
            self.call.id().clone(),
            self.timestamp,
            self.session_id,
            self.origin,
            operation,
        )
    }
}

/// Incremental correlation table from tool-use id to pending request.
///
/// Feed entries in log order with [`push`](Self::push), then call
/// [`finish`](Self::finish) to flush unanswered requests as incomplete
/// operations.
pub struct OperationJoiner {
    options: JoinOptions,
    pending: HashMap<ToolUseId, PendingRequest>,
    completed: HashSet<ToolUseId>,
    /// Indexed by position; filled as results arrive.
    slots: Vec<Option<SequencedOperation>>,
    unmatched_results: Vec<UnmatchedResult>,
    duplicate_requests: usize,
    duplicate_results: usize,
}

impl Default for OperationJoiner {
    fn default() -> Self {
        Self::new(JoinOptions::default())
    }
}

impl OperationJoiner {
    /// Empty joiner.
    pub fn new(options: JoinOptions) -> Self {
        Self {
            options,
            pending: HashMap::new(),
            completed: HashSet::new(),
            slots: Vec::new(),
            unmatched_results: Vec::new(),
            duplicate_requests: 0,
            duplicate_results: 0,
        }
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.slots.len()
    }

    /// Process one entry's tool blocks in block order.
    pub fn push(&mut self, entry: &LogEntry) {
        if !entry.entry_type().carries_tool_blocks() {
            return;
        }

        for call in entry.tool_calls() {
            self.register_request(entry, call);
        }
        for result in entry.tool_results() {
            self.resolve_result(entry, result);
        }
    }

    fn register_request(&mut self, entry: &LogEntry, call: &ToolCall) {
        let id = call.id();
        if self.pending.contains_key(id) || self.completed.contains(id) {
            debug!("Ignoring duplicate request {} at {}", id, entry.origin());
            self.duplicate_requests += 1;
            return;
        }

        let position = self.slots.len();
        self.slots.push(None);
        self.pending.insert(
            id.clone(),
            PendingRequest {
                position,
                call: call.clone(),
                timestamp: entry.timestamp(),
                session_id: entry.session_id().clone(),
                origin: entry.origin().clone(),
            },
        );
    }

    fn resolve_result(&mut self, entry: &LogEntry, result: &ToolResult) {
        let id = result.tool_use_id();
        let Some(pending) = self.pending.remove(id) else {
            if self.completed.contains(id) {
                debug!("Ignoring duplicate result {} at {}", id, entry.origin());
                self.duplicate_results += 1;
            } else {
                warn!("Result {} at {} has no matching request", id, entry.origin());
                self.unmatched_results.push(UnmatchedResult {
                    tool_use_id: id.clone(),
                    origin: entry.origin().clone(),
                });
            }
            return;
        };

        let operation = decode::decode(
            &pending.call,
            result,
            entry.metadata().tool_use_result.as_ref(),
            &self.options,
        );
        debug!(
            "Joined {} {} at position {}",
            pending.call.name().as_str(),
            id,
            pending.position
        );

        self.completed.insert(id.clone());
        let position = pending.position;
        self.slots[position] = Some(pending.complete(operation));
    }

    /// Flush pending requests as `Incomplete` and return the joined sequence.
    pub fn finish(mut self) -> JoinOutput {
        for (_, pending) in self.pending.drain() {
            let position = pending.position;
            let operation = Operation::Incomplete(IncompleteOp {
                request: pending.call.clone(),
                reason: IncompleteReason::NoResult,
            });
            self.slots[position] = Some(pending.complete(operation));
        }

        JoinOutput {
            operations: self.slots.into_iter().flatten().collect(),
            unmatched_results: self.unmatched_results,
            duplicate_requests: self.duplicate_requests,
            duplicate_results: self.duplicate_results,
        }
    }
}

/// Join a complete sequence of entries.
pub fn join_entries<'a>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    options: JoinOptions,
) -> JoinOutput {
    let mut joiner = OperationJoiner::new(options);
    for entry in entries {
        joiner.push(entry);
    }
    joiner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentBlock, EntryMetadata, EntryType, OperationKind, ToolName};
    use serde_json::json;

    fn id(s: &str) -> ToolUseId {
        ToolUseId::new(s).unwrap()
    }

    fn entry(line: usize, entry_type: EntryType, blocks: Vec<ContentBlock>) -> LogEntry {
        LogEntry::new(
            Origin::new(None, line),
            None,
            SessionId::unknown(),
            None,
            entry_type,
            blocks,
            EntryMetadata::default(),
        )
    }

    fn request(line: usize, tool_id: &str, name: ToolName, input: serde_json::Value) -> LogEntry {
        entry(
            line,
            EntryType::Assistant,
            vec![ContentBlock::ToolUse(ToolCall::new(id(tool_id), name, input))],
        )
    }

    fn result(line: usize, tool_id: &str, content: &str, is_error: bool) -> LogEntry {
        entry(
            line,
            EntryType::User,
            vec![ContentBlock::ToolResult(ToolResult::new(
                id(tool_id),
                content,
                is_error,
            ))],
        )
    }

    fn write(line: usize, tool_id: &str, path: &str) -> LogEntry {
        request(
            line,
            tool_id,
            ToolName::Write,
            json!({"file_path": path, "content": "x"}),
        )
    }

    #[test]
    fn pairs_request_with_result() {
        let entries = vec![write(1, "a", "/p/a.py"), result(2, "a", "ok", false)];
        let out = join_entries(&entries, JoinOptions::default());

        assert_eq!(out.operations.len(), 1);
        let op = &out.operations[0];
        assert_eq!(op.position(), 0);
        assert_eq!(op.kind(), OperationKind::Write);
        assert_eq!(op.origin().line(), 1);
        assert!(out.unmatched_results.is_empty());
    }

    #[test]
    fn orders_by_request_not_result() {
        let entries = vec![
            write(1, "a", "/p/a.py"),
            write(2, "b", "/p/b.py"),
            result(3, "b", "ok", false),
            result(4, "a", "ok", false),
        ];
        let out = join_entries(&entries, JoinOptions::default());

        let order: Vec<_> = out
            .operations
            .iter()
            .map(|op| op.tool_use_id().as_str())
            .collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn unanswered_request_is_incomplete() {
        let entries = vec![write(1, "a", "/p/a.py")];
        let out = join_entries(&entries, JoinOptions::default());

        match out.operations[0].operation() {
            Operation::Incomplete(op) => assert_eq!(op.reason, IncompleteReason::NoResult),
            other => panic!("expected Incomplete, got {:?}", other),
        }
        assert_eq!(out.operations[0].path(), Some("/p/a.py"));
    }

    #[test]
    fn unmatched_result_is_reported_not_fatal() {
        let entries = vec![
            result(1, "ghost", "ok", false),
            write(2, "a", "/p/a.py"),
            result(3, "a", "ok", false),
        ];
        let out = join_entries(&entries, JoinOptions::default());

        assert_eq!(out.operations.len(), 1);
        assert_eq!(out.unmatched_results.len(), 1);
        assert_eq!(out.unmatched_results[0].tool_use_id.as_str(), "ghost");
        assert_eq!(out.unmatched_results[0].origin.line(), 1);
    }

    #[test]
    fn duplicate_request_and_result_keep_first() {
        let entries = vec![
            write(1, "a", "/p/a.py"),
            result(2, "a", "ok", false),
            write(3, "a", "/p/a.py"),
            result(4, "a", "ok", false),
        ];
        let out = join_entries(&entries, JoinOptions::default());

        assert_eq!(out.operations.len(), 1);
        assert_eq!(out.duplicate_requests, 1);
        assert_eq!(out.duplicate_results, 1);
        assert!(out.unmatched_results.is_empty());
    }

    #[test]
    fn ignores_blocks_outside_user_and_assistant_entries() {
        let progress = entry(
            1,
            EntryType::Other("progress".into()),
            vec![ContentBlock::ToolUse(ToolCall::new(
                id("a"),
                ToolName::Write,
                json!({"file_path": "/p/a.py", "content": "x"}),
            ))],
        );
        let out = join_entries(&[progress], JoinOptions::default());
        assert!(out.operations.is_empty());
    }

    #[test]
    fn result_metadata_marks_read_partial() {
        let read = request(1, "r", ToolName::Read, json!({"file_path": "/p/a.py"}));
        let base = result(2, "r", "     1→x", false);
        let answer = LogEntry::new(
            base.origin().clone(),
            None,
            SessionId::unknown(),
            None,
            EntryType::User,
            base.content_blocks().to_vec(),
            EntryMetadata {
                tool_use_result: Some(json!({"file": {"numLines": 1, "totalLines": 5}})),
                ..EntryMetadata::default()
            },
        );

        let out = join_entries(&[read, answer], JoinOptions::default());
        assert_eq!(out.operations[0].kind(), OperationKind::PartialRead);
    }

    #[test]
    fn notebook_requests_never_name_a_file() {
        let notebook = |tool_id: &str| {
            request(
                1,
                tool_id,
                ToolName::NotebookEdit,
                json!({"notebook_path": "/p/n.ipynb", "new_source": "x"}),
            )
        };
        let entries = vec![
            notebook("ok"),
            result(2, "ok", "updated", false),
            notebook("failed"),
            result(3, "failed", "cell not found", true),
            notebook("pending"),
        ];
        let out = join_entries(&entries, JoinOptions::default());

        let kinds: Vec<_> = out.operations.iter().map(|op| op.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Other,
                OperationKind::Incomplete,
                OperationKind::Incomplete
            ]
        );
        assert!(out.operations.iter().all(|op| op.path().is_none()));
    }

    #[test]
    fn request_and_result_in_same_entry_join() {
        let both = entry(
            1,
            EntryType::Assistant,
            vec![
                ContentBlock::ToolUse(ToolCall::new(
                    id("a"),
                    ToolName::Bash,
                    json!({"command": "ls"}),
                )),
                ContentBlock::ToolResult(ToolResult::new(id("a"), "a.py", false)),
            ],
        );
        let out = join_entries(&[both], JoinOptions::default());
        assert_eq!(out.operations[0].kind(), OperationKind::BashCommand);
    }
}
