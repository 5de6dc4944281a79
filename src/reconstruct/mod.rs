//! File reconstruction.
//!
//! For each path: pick the latest complete snapshot, replay the edits that
//! follow it, and classify the outcome. Everything here is a pure function of
//! the operation sequence.

pub mod replay;
pub mod snapshot;
pub mod timeline;

use crate::model::{
    Operation, ReconstructionResult, ReconstructionStatus, SeenOperation, SequencedOperation,
    ShellReference,
};
use snapshot::select_snapshot;
use std::collections::BTreeMap;
use timeline::FileTimeline;
use tracing::{debug, info};

pub use replay::{apply_edit, apply_multi_edit, replay, ReplayOutcome};
pub use snapshot::{select_snapshot_for_path, Snapshot};

/// Reconstruct a single path from the full operation sequence.
pub fn reconstruct_file(operations: &[SequencedOperation], path: &str) -> ReconstructionResult {
    classify(&FileTimeline::for_path(operations, path))
}

/// Reconstruct every path in the sequence, optionally restricted to paths
/// starting with `prefix`.
pub fn reconstruct_all(
    operations: &[SequencedOperation],
    prefix: Option<&str>,
) -> BTreeMap<String, ReconstructionResult> {
    let results: BTreeMap<String, ReconstructionResult> = FileTimeline::group(operations, prefix)
        .into_iter()
        .map(|(path, timeline)| (path.to_string(), classify(&timeline)))
        .collect();

    let count = |status: ReconstructionStatus| {
        results.values().filter(|r| r.status == status).count()
    };
    info!(
        "Reconstructed {} files: {} exact, {} partial, {} unrecoverable",
        results.len(),
        count(ReconstructionStatus::Exact),
        count(ReconstructionStatus::Partial),
        count(ReconstructionStatus::Unrecoverable)
    );
    results
}

/// Combine snapshot selection and replay into a result for one timeline.
pub fn classify(timeline: &FileTimeline<'_>) -> ReconstructionResult {
    let operations = timeline.operations();
    let seen = operations
        .iter()
        .map(|op| SeenOperation {
            position: op.position(),
            kind: op.kind(),
        })
        .collect();

    let Some(snapshot) = select_snapshot(timeline) else {
        debug!("{}: no snapshot", timeline.path());
        return ReconstructionResult {
            path: timeline.path().to_string(),
            status: ReconstructionStatus::Unrecoverable,
            content: None,
            baseline: None,
            failed_edits: Vec::new(),
            edits_applied: 0,
            superseded_edits: 0,
            unanswered_edits: 0,
            shell_references: shell_references(timeline, None),
            seen,
        };
    };

    let superseded_edits = operations[..snapshot.timeline_index]
        .iter()
        .filter(|op| is_edit(op.operation()))
        .count();

    let after = snapshot.timeline_index + 1;
    let outcome = replay(
        snapshot.content,
        operations[after..]
            .iter()
            .enumerate()
            .map(|(offset, &op)| (after + offset, op)),
    );

    let status = if outcome.failed_edits.is_empty() {
        ReconstructionStatus::Exact
    } else {
        ReconstructionStatus::Partial
    };
    debug!(
        "{}: {} from position {}, {} edits applied, {} failed, {} unanswered",
        timeline.path(),
        status.as_str(),
        snapshot.position(),
        outcome.edits_applied,
        outcome.failed_edits.len(),
        outcome.unanswered_edits
    );

    ReconstructionResult {
        path: timeline.path().to_string(),
        status,
        content: Some(outcome.content),
        baseline: Some(snapshot.source()),
        failed_edits: outcome.failed_edits,
        edits_applied: outcome.edits_applied,
        superseded_edits,
        unanswered_edits: outcome.unanswered_edits,
        shell_references: shell_references(timeline, Some(snapshot.position())),
        seen,
    }
}

fn is_edit(operation: &Operation) -> bool {
    matches!(operation, Operation::Edit(_) | Operation::MultiEdit(_))
}

/// Shell commands naming the path after the baseline, or all of them when
/// there is none.
fn shell_references(timeline: &FileTimeline<'_>, after: Option<usize>) -> Vec<ShellReference> {
    timeline
        .shell_commands()
        .iter()
        .filter(|op| after.map_or(true, |baseline| op.position() > baseline))
        .filter_map(|op| match op.operation() {
            Operation::BashCommand(bash) => Some(ShellReference {
                position: op.position(),
                command: bash.command.clone(),
            }),
            _ => None,
        })
        .collect()
}
