//! Plain-text rendering of an [`Analysis`].

use crate::integration::Analysis;
use crate::model::{
    BaselineKind, OperationKind, OperationStats, ReconstructionResult, ReconstructionStatus,
};
use std::fmt;

/// Width of the status column; fits `unrecoverable`.
const STATUS_WIDTH: usize = 13;

/// Human-readable summary of a run, one line per file plus diagnostics.
pub struct Report<'a> {
    analysis: &'a Analysis,
}

impl<'a> Report<'a> {
    /// Wrap an analysis for display.
    pub fn new(analysis: &'a Analysis) -> Self {
        Self { analysis }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.analysis;
        let count = |status: ReconstructionStatus| {
            analysis
                .files
                .values()
                .filter(|r| r.status == status)
                .count()
        };
        writeln!(
            f,
            "{} {}: {} exact, {} partial, {} unrecoverable",
            analysis.files.len(),
            if analysis.files.len() == 1 { "file" } else { "files" },
            count(ReconstructionStatus::Exact),
            count(ReconstructionStatus::Partial),
            count(ReconstructionStatus::Unrecoverable)
        )?;
        writeln!(f, "operations: {}", operation_summary(&analysis.stats))?;

        for result in analysis.files.values() {
            write_file(f, result)?;
        }

        if !analysis.malformed.is_empty() {
            writeln!(f, "malformed lines: {}", analysis.malformed.len())?;
            for malformed in &analysis.malformed {
                writeln!(f, "    {}: {}", malformed.origin(), malformed.error_message())?;
            }
        }
        if !analysis.unmatched_results.is_empty() {
            writeln!(f, "unmatched results: {}", analysis.unmatched_results.len())?;
            for unmatched in &analysis.unmatched_results {
                writeln!(f, "    {}: {}", unmatched.origin, unmatched.tool_use_id)?;
            }
        }
        if analysis.duplicate_requests > 0 {
            writeln!(f, "duplicate requests ignored: {}", analysis.duplicate_requests)?;
        }
        if analysis.duplicate_results > 0 {
            writeln!(f, "duplicate results ignored: {}", analysis.duplicate_results)?;
        }
        if analysis.cancelled {
            writeln!(f, "scan cancelled; results cover only the lines read")?;
        }
        Ok(())
    }
}

fn plural(count: usize, kind: OperationKind) -> String {
    let (one, many) = kind.labels();
    format!("{} {}", count, if count == 1 { one } else { many })
}

fn operation_summary(stats: &OperationStats) -> String {
    let parts: Vec<String> = [
        (stats.writes, OperationKind::Write),
        (stats.edits, OperationKind::Edit),
        (stats.multi_edits, OperationKind::MultiEdit),
        (stats.full_reads, OperationKind::FullRead),
        (stats.partial_reads, OperationKind::PartialRead),
        (stats.bash_commands, OperationKind::BashCommand),
        (stats.other, OperationKind::Other),
        (stats.incomplete, OperationKind::Incomplete),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, kind)| plural(count, kind))
    .collect();

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

fn write_file(f: &mut fmt::Formatter<'_>, result: &ReconstructionResult) -> fmt::Result {
    let status = result.status.as_str();
    match &result.baseline {
        None => writeln!(
            f,
            "{:<width$} {}  {}",
            status,
            result.path,
            result.no_baseline_diagnostic(),
            width = STATUS_WIDTH
        )?,
        Some(baseline) => {
            let kind = match baseline.kind {
                BaselineKind::Write => "write",
                BaselineKind::FullRead => "full read",
            };
            write!(
                f,
                "{:<width$} {}  {} at #{}, {} applied",
                status,
                result.path,
                kind,
                baseline.position,
                plural(result.edits_applied, OperationKind::Edit),
                width = STATUS_WIDTH
            )?;
            if !result.failed_edits.is_empty() {
                write!(f, ", {} failed", result.failed_edits.len())?;
            }
            if result.superseded_edits > 0 {
                write!(f, ", {} superseded", result.superseded_edits)?;
            }
            if result.unanswered_edits > 0 {
                write!(f, ", {} unanswered", result.unanswered_edits)?;
            }
            writeln!(f)?;
        }
    }

    for failed in &result.failed_edits {
        write!(f, "    ! #{} {}", failed.position, failed.tool_use_id)?;
        if let Some(sub_edit) = failed.sub_edit {
            write!(f, " edit {}", sub_edit)?;
        }
        write!(f, ": {}", failed.reason.describe())?;
        if failed.tool_reported_success {
            write!(f, " (tool reported success)")?;
        }
        writeln!(f)?;
    }
    for shell in &result.shell_references {
        let command = shell.command.lines().next().unwrap_or("");
        writeln!(f, "    ~ #{} $ {}", shell.position, command)?;
    }
    Ok(())
}
