//! Edit replay.
//!
//! Applies string-replacement edits to a baseline in timeline order. Matching
//! is exact; an edit that does not match leaves the content untouched and is
//! recorded, and later edits are still attempted.

use crate::model::{
    EditFailureReason, EditSpec, FailedEdit, Operation, SequencedOperation, ToolName,
    ToolOutcome,
};

/// Final content plus what happened to each edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Content after every applicable edit.
    pub content: String,
    /// Edits left unapplied, in timeline order.
    pub failed_edits: Vec<FailedEdit>,
    /// Edits and multi-edits that applied cleanly.
    pub edits_applied: usize,
    /// Edit requests that never received a result and were skipped.
    pub unanswered_edits: usize,
}

/// Apply a single replacement to `content`.
///
/// An empty `old_string` only matches an empty document.
pub fn apply_edit(content: &str, edit: &EditSpec) -> Result<String, EditFailureReason> {
    if edit.old_string.is_empty() {
        return if content.is_empty() {
            Ok(edit.new_string.clone())
        } else {
            Err(EditFailureReason::Ambiguous {
                occurrences: content.chars().count() + 1,
            })
        };
    }

    match content.matches(edit.old_string.as_str()).count() {
        0 => Err(EditFailureReason::NotFound),
        _ if edit.replace_all => Ok(content.replace(&edit.old_string, &edit.new_string)),
        1 => Ok(content.replacen(&edit.old_string, &edit.new_string, 1)),
        occurrences => Err(EditFailureReason::Ambiguous { occurrences }),
    }
}

/// Apply every sub-edit against a scratch copy; commit only if all succeed.
///
/// On failure returns the index of the failing sub-edit.
pub fn apply_multi_edit(
    content: &str,
    edits: &[EditSpec],
) -> Result<String, (usize, EditFailureReason)> {
    edits
        .iter()
        .enumerate()
        .try_fold(content.to_string(), |scratch, (index, edit)| {
            apply_edit(&scratch, edit).map_err(|reason| (index, reason))
        })
}

/// Replay `edits` on top of `baseline`.
///
/// Each item pairs the edit's index in the file timeline with the operation.
/// Incomplete Edit and MultiEdit requests are counted but not applied; other
/// operations are ignored.
pub fn replay<'a>(
    baseline: &str,
    edits: impl IntoIterator<Item = (usize, &'a SequencedOperation)>,
) -> ReplayOutcome {
    let mut content = baseline.to_string();
    let mut failed_edits = Vec::new();
    let mut edits_applied = 0;
    let mut unanswered_edits = 0;

    for (timeline_index, op) in edits {
        let failure = |sub_edit: Option<usize>, reason, tool_reported_success| FailedEdit {
            timeline_index,
            position: op.position(),
            tool_use_id: op.tool_use_id().clone(),
            sub_edit,
            reason,
            tool_reported_success,
        };

        let tool_outcome = match op.operation() {
            Operation::Edit(edit) => &edit.tool_outcome,
            Operation::MultiEdit(multi) => &multi.tool_outcome,
            Operation::Incomplete(incomplete) => {
                if matches!(incomplete.request.name(), ToolName::Edit | ToolName::MultiEdit) {
                    unanswered_edits += 1;
                }
                continue;
            }
            _ => continue,
        };

        // A failed tool call changed nothing on disk; never re-attempt it.
        if let ToolOutcome::Failed { message } = tool_outcome {
            failed_edits.push(failure(
                None,
                EditFailureReason::ToolReportedFailure {
                    message: message.clone(),
                },
                false,
            ));
            continue;
        }

        let applied = match op.operation() {
            Operation::Edit(edit) => {
                apply_edit(&content, &edit.edit).map_err(|reason| (None, reason))
            }
            Operation::MultiEdit(multi) => apply_multi_edit(&content, &multi.edits)
                .map_err(|(index, reason)| (Some(index), reason)),
            _ => continue,
        };

        match applied {
            Ok(next) => {
                content = next;
                edits_applied += 1;
            }
            Err((sub_edit, reason)) => failed_edits.push(failure(sub_edit, reason, true)),
        }
    }

    ReplayOutcome {
        content,
        failed_edits,
        edits_applied,
        unanswered_edits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EditOp, IncompleteOp, IncompleteReason, MultiEditOp, Origin, SessionId, ToolCall,
        ToolUseId,
    };
    use serde_json::json;

    fn spec(old: &str, new: &str) -> EditSpec {
        EditSpec {
            old_string: old.into(),
            new_string: new.into(),
            replace_all: false,
        }
    }

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

    fn edit(position: usize, old: &str, new: &str, outcome: ToolOutcome) -> SequencedOperation {
        seq(
            position,
            Operation::Edit(EditOp {
                path: "/p/a.py".into(),
                edit: spec(old, new),
                tool_outcome: outcome,
            }),
        )
    }

    #[test]
    fn unique_match_is_replaced() {
        assert_eq!(apply_edit("x=1\n", &spec("x=1", "x=2")).unwrap(), "x=2\n");
    }

    #[test]
    fn missing_match_is_not_found() {
        assert_eq!(
            apply_edit("a\n", &spec("z", "q")),
            Err(EditFailureReason::NotFound)
        );
    }

    #[test]
    fn repeated_match_is_ambiguous_without_replace_all() {
        assert_eq!(
            apply_edit("a a a", &spec("a", "b")),
            Err(EditFailureReason::Ambiguous { occurrences: 3 })
        );
    }

    #[test]
    fn replace_all_replaces_every_occurrence() {
        let mut all = spec("a", "b");
        all.replace_all = true;
        assert_eq!(apply_edit("a a a", &all).unwrap(), "b b b");
    }

    #[test]
    fn replace_all_with_no_match_is_not_found() {
        let mut all = spec("z", "b");
        all.replace_all = true;
        assert_eq!(apply_edit("a", &all), Err(EditFailureReason::NotFound));
    }

    #[test]
    fn empty_old_string_only_fills_empty_content() {
        assert_eq!(apply_edit("", &spec("", "new")).unwrap(), "new");
        assert_eq!(
            apply_edit("ab", &spec("", "x")),
            Err(EditFailureReason::Ambiguous { occurrences: 3 })
        );
    }

    #[test]
    fn multi_edit_is_atomic() {
        let edits = vec![spec("a", "b"), spec("missing", "c")];
        assert_eq!(
            apply_multi_edit("a", &edits),
            Err((1, EditFailureReason::NotFound))
        );

        let edits = vec![spec("a", "b"), spec("b", "c")];
        assert_eq!(apply_multi_edit("a", &edits).unwrap(), "c");
    }

    #[test]
    fn failed_edit_leaves_content_for_later_edits() {
        let ops = vec![
            edit(1, "missing", "x", ToolOutcome::Succeeded),
            edit(2, "a", "b", ToolOutcome::Succeeded),
        ];
        let outcome = replay("a\n", ops.iter().enumerate());

        assert_eq!(outcome.content, "b\n");
        assert_eq!(outcome.edits_applied, 1);
        assert_eq!(outcome.failed_edits.len(), 1);
        let failed = &outcome.failed_edits[0];
        assert_eq!(failed.position, 1);
        assert_eq!(failed.reason, EditFailureReason::NotFound);
        assert!(failed.tool_reported_success);
    }

    #[test]
    fn tool_reported_failure_is_skipped_without_matching() {
        let ops = vec![edit(
            4,
            "a",
            "b",
            ToolOutcome::Failed {
                message: "String to replace not found".into(),
            },
        )];
        let outcome = replay("a", ops.iter().enumerate());

        assert_eq!(outcome.content, "a");
        assert_eq!(outcome.edits_applied, 0);
        assert!(matches!(
            outcome.failed_edits[0].reason,
            EditFailureReason::ToolReportedFailure { .. }
        ));
        assert!(!outcome.failed_edits[0].tool_reported_success);
    }

    #[test]
    fn multi_edit_failure_records_sub_edit() {
        let ops = vec![seq(
            0,
            Operation::MultiEdit(MultiEditOp {
                path: "/p/a.py".into(),
                edits: vec![spec("a", "b"), spec("zz", "c")],
                tool_outcome: ToolOutcome::Succeeded,
            }),
        )];
        let outcome = replay("a", ops.iter().enumerate());

        assert_eq!(outcome.content, "a");
        assert_eq!(outcome.failed_edits[0].sub_edit, Some(1));
    }

    #[test]
    fn unanswered_edit_is_counted_not_applied() {
        let request = ToolCall::new(
            ToolUseId::new("t1").unwrap(),
            ToolName::Edit,
            json!({"file_path": "/p/a.py", "old_string": "a", "new_string": "b"}),
        );
        let ops = vec![
            seq(
                1,
                Operation::Incomplete(IncompleteOp {
                    request,
                    reason: IncompleteReason::NoResult,
                }),
            ),
            edit(2, "a", "c", ToolOutcome::Succeeded),
        ];
        let outcome = replay("a", ops.iter().enumerate());

        assert_eq!(outcome.content, "c");
        assert_eq!(outcome.edits_applied, 1);
        assert_eq!(outcome.unanswered_edits, 1);
        assert!(outcome.failed_edits.is_empty());
    }

    #[test]
    fn replay_is_deterministic() {
        let ops = vec![
            edit(0, "x", "y", ToolOutcome::Succeeded),
            edit(1, "q", "r", ToolOutcome::Succeeded),
        ];
        let first = replay("x x", ops.iter().enumerate());
        let second = replay("x x", ops.iter().enumerate());
        assert_eq!(first, second);
    }
}
