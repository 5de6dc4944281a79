//! Property-based tests for reconstruction invariants.
//!
//! Tests validate:
//! 1. A Write is always the baseline when nothing later touches the file
//! 2. Clean edits compose as sequential string replacement, deterministically
//! 3. Partial reads alone never produce a baseline
//! 4. Edits whose old_string is absent never mutate content
//! 5. The parser never panics and never drops a non-blank line

use ccrec::model::{
    BashOp, EditFailureReason, EditOp, EditSpec, EntryUuid, Operation, Origin, ReadOp,
    ReconstructionStatus, SequencedOperation, SessionId, ToolOutcome, ToolUseId, WriteOp,
};
use ccrec::parser::{parse_entry_graceful, EntryStream, ParseResult};
use ccrec::reconstruct::{reconstruct_file, replay};
use proptest::prelude::*;

const PATH: &str = "/p/file.py";

fn seq(position: usize, operation: Operation) -> SequencedOperation {
    SequencedOperation::new(
        position,
        ToolUseId::new(format!("toolu_{}", position)).unwrap(),
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
            path: PATH.into(),
            content: content.into(),
        }),
    )
}

fn edit(position: usize, old: &str, new: &str) -> SequencedOperation {
    seq(
        position,
        Operation::Edit(EditOp {
            path: PATH.into(),
            edit: EditSpec {
                old_string: old.into(),
                new_string: new.into(),
                replace_all: false,
            },
            tool_outcome: ToolOutcome::Succeeded,
        }),
    )
}

fn partial_read(position: usize) -> SequencedOperation {
    seq(
        position,
        Operation::Read(ReadOp {
            path: PATH.into(),
            content: "partial...".into(),
            is_partial: true,
            offset: Some(10),
            limit: Some(20),
        }),
    )
}

fn unrelated(position: usize) -> SequencedOperation {
    seq(
        position,
        Operation::BashCommand(BashOp {
            command: "ls".into(),
            output: String::new(),
        }),
    )
}

// ===== Property 1: Writes establish the baseline =====

proptest! {
    #[test]
    fn write_is_baseline_when_last(
        content in any::<String>(),
        before in 0usize..5,
        after in 0usize..5,
    ) {
        let mut ops: Vec<_> = (0..before).map(unrelated).collect();
        ops.push(write(before, &content));
        ops.extend((before + 1..before + 1 + after).map(unrelated));

        let result = reconstruct_file(&ops, PATH);
        prop_assert_eq!(result.status, ReconstructionStatus::Exact);
        prop_assert_eq!(result.content.as_deref(), Some(content.as_str()));
        prop_assert_eq!(result.baseline.unwrap().position, before);
    }
}

// ===== Property 2: Clean edits compose =====

proptest! {
    #[test]
    fn clean_edits_compose_in_order(replacements in prop::collection::vec("[a-z ]{0,8}", 1..8)) {
        // One unique marker per edit, so every old_string matches exactly once.
        let baseline: String = (0..replacements.len())
            .map(|i| format!("<{}>\n", i))
            .collect();
        let mut ops = vec![write(0, &baseline)];
        let mut expected = baseline.clone();
        for (i, new) in replacements.iter().enumerate() {
            let marker = format!("<{}>", i);
            ops.push(edit(i + 1, &marker, new));
            expected = expected.replacen(&marker, new, 1);
        }

        let result = reconstruct_file(&ops, PATH);
        prop_assert_eq!(result.status, ReconstructionStatus::Exact);
        prop_assert_eq!(result.content.as_deref(), Some(expected.as_str()));
        prop_assert_eq!(result.edits_applied, replacements.len());

        let first = replay(&baseline, ops[1..].iter().enumerate());
        let second = replay(&baseline, ops[1..].iter().enumerate());
        prop_assert_eq!(first, second);
    }
}

// ===== Property 3: Partial reads never suffice =====

proptest! {
    #[test]
    fn partial_reads_only_is_unrecoverable(reads in 1usize..6, edits in 0usize..6) {
        let mut ops: Vec<_> = (0..reads).map(partial_read).collect();
        ops.extend((reads..reads + edits).map(|p| edit(p, "a", "b")));

        let result = reconstruct_file(&ops, PATH);
        prop_assert_eq!(result.status, ReconstructionStatus::Unrecoverable);
        prop_assert!(result.content.is_none());
        prop_assert_eq!(result.seen.len(), reads + edits);
    }
}

// ===== Property 4: Missing old_string never mutates =====

proptest! {
    #[test]
    fn absent_old_string_is_not_found(
        baseline in "[a-m\n]{0,40}",
        old in "[n-z]{1,6}",
        new in "[a-z]{0,6}",
    ) {
        let ops = vec![write(0, &baseline), edit(1, &old, &new)];

        let result = reconstruct_file(&ops, PATH);
        prop_assert_eq!(result.status, ReconstructionStatus::Partial);
        prop_assert_eq!(result.content.as_deref(), Some(baseline.as_str()));
        prop_assert_eq!(result.failed_edits.len(), 1);
        prop_assert_eq!(&result.failed_edits[0].reason, &EditFailureReason::NotFound);
    }
}

// ===== Property 5: Parser robustness =====

proptest! {
    #[test]
    fn parse_entry_graceful_never_panics(line in any::<String>()) {
        let _ = parse_entry_graceful(&line, Origin::new(None, 1));
    }

    #[test]
    fn stream_yields_one_result_per_non_blank_line(
        lines in prop::collection::vec(
            prop_oneof![
                Just(String::new()),
                Just(r#"{"type":"user","message":{"content":"hi"}}"#.to_string()),
                Just("{not json".to_string()),
                "[ -~]{0,20}",
            ],
            0..20,
        )
    ) {
        let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
        let results: Vec<ParseResult> = EntryStream::new(lines.iter()).collect();
        prop_assert_eq!(results.len(), non_blank);
    }
}

// ===== Identifier constructors =====

proptest! {
    #[test]
    fn identifiers_accept_exactly_non_empty(s in any::<String>()) {
        prop_assert_eq!(EntryUuid::new(&s).is_ok(), !s.is_empty());
        prop_assert_eq!(ToolUseId::new(&s).is_ok(), !s.is_empty());
        prop_assert_eq!(SessionId::new(&s).is_ok(), !s.is_empty());
    }
}
