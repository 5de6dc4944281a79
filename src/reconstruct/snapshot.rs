//! Baseline selection.

use super::timeline::FileTimeline;
use crate::model::{BaselineKind, BaselineSource, Operation, SequencedOperation};

/// The operation a reconstruction starts from.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// Index within the file's timeline.
    pub timeline_index: usize,
    /// Write or full Read.
    pub kind: BaselineKind,
    /// Content replay starts from.
    pub content: &'a str,
    /// The operation that supplied the content.
    pub operation: &'a SequencedOperation,
}

impl Snapshot<'_> {
    /// Global operation position.
    pub fn position(&self) -> usize {
        self.operation.position()
    }

    /// Owned summary for the result.
    pub fn source(&self) -> BaselineSource {
        BaselineSource {
            kind: self.kind,
            position: self.operation.position(),
            tool_use_id: self.operation.tool_use_id().clone(),
            timestamp: self.operation.timestamp(),
        }
    }
}

/// Latest Write or full Read on the timeline.
///
/// Partial reads and incomplete requests never qualify.
pub fn select_snapshot<'a>(timeline: &FileTimeline<'a>) -> Option<Snapshot<'a>> {
    timeline
        .operations()
        .iter()
        .enumerate()
        .rev()
        .find_map(|(timeline_index, &op)| {
            let (kind, content) = match op.operation() {
                Operation::Write(write) => (BaselineKind::Write, write.content.as_str()),
                Operation::Read(read) if !read.is_partial => {
                    (BaselineKind::FullRead, read.content.as_str())
                }
                _ => return None,
            };
            Some(Snapshot {
                timeline_index,
                kind,
                content,
                operation: op,
            })
        })
}

/// Baseline for `path` within a full operation sequence.
pub fn select_snapshot_for_path<'a>(
    operations: &'a [SequencedOperation],
    path: &'a str,
) -> Option<Snapshot<'a>> {
    select_snapshot(&FileTimeline::for_path(operations, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        IncompleteOp, IncompleteReason, Origin, ReadOp, SessionId, ToolCall, ToolName, ToolUseId,
        WriteOp,
    };
    use serde_json::json;

    fn seq(position: usize, operation: Operation) -> SequencedOperation {
        SequencedOperation::new(
            position,
            ToolUseId::new(format!("t{}", position)).unwrap(),
            None,
            SessionId::unknown(),
            Origin::new(None, position + 1),
            operation,
        )
    }

    fn write(position: usize, content: &str) -> SequencedOperation {
        seq(
            position,
            Operation::Write(WriteOp {
                path: "/p/a.py".into(),
                content: content.into(),
            }),
        )
    }

    fn read(position: usize, content: &str, is_partial: bool) -> SequencedOperation {
        seq(
            position,
            Operation::Read(ReadOp {
                path: "/p/a.py".into(),
                content: content.into(),
                is_partial,
                offset: None,
                limit: None,
            }),
        )
    }

    #[test]
    fn no_operations_means_no_snapshot() {
        assert!(select_snapshot_for_path(&[], "/p/a.py").is_none());
    }

    #[test]
    fn picks_latest_write() {
        let ops = vec![write(3, "first"), write(9, "second")];
        let snapshot = select_snapshot_for_path(&ops, "/p/a.py").unwrap();
        assert_eq!(snapshot.position(), 9);
        assert_eq!(snapshot.content, "second");
        assert_eq!(snapshot.kind, BaselineKind::Write);
        assert_eq!(snapshot.timeline_index, 1);
    }

    #[test]
    fn later_full_read_beats_earlier_write() {
        let ops = vec![write(0, "w"), read(1, "r", false)];
        let snapshot = select_snapshot_for_path(&ops, "/p/a.py").unwrap();
        assert_eq!(snapshot.kind, BaselineKind::FullRead);
        assert_eq!(snapshot.source().position, 1);
    }

    #[test]
    fn partial_reads_are_skipped() {
        let ops = vec![write(0, "w"), read(1, "part", true)];
        let snapshot = select_snapshot_for_path(&ops, "/p/a.py").unwrap();
        assert_eq!(snapshot.position(), 0);

        let only_partial = vec![read(0, "part", true)];
        assert!(select_snapshot_for_path(&only_partial, "/p/a.py").is_none());
    }

    #[test]
    fn incomplete_write_is_not_a_baseline() {
        let request = ToolCall::new(
            ToolUseId::new("t0").unwrap(),
            ToolName::Write,
            json!({"file_path": "/p/a.py", "content": "x"}),
        );
        let ops = vec![seq(
            0,
            Operation::Incomplete(IncompleteOp {
                request,
                reason: IncompleteReason::NoResult,
            }),
        )];
        assert!(select_snapshot_for_path(&ops, "/p/a.py").is_none());
    }
}
