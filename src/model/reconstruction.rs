//! Per-file reconstruction results.
//!
//! These are the engine's externally visible output. They are computed fresh
//! on every run from the operation sequence and never cached.

use crate::model::{OperationKind, ToolUseId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome classification for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionStatus {
    /// Baseline found and every later edit applied cleanly.
    Exact,
    /// Baseline found but at least one later edit failed.
    Partial,
    /// No Write and no full Read exists for the file.
    Unrecoverable,
}

impl ReconstructionStatus {
    /// Lowercase label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Unrecoverable => "unrecoverable",
        }
    }
}

/// Which kind of operation supplied a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineKind {
    /// A Write request's content.
    Write,
    /// A Read result covering the whole file.
    FullRead,
}

/// The operation a reconstruction started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaselineSource {
    /// Write or full Read.
    pub kind: BaselineKind,
    /// Global operation position.
    pub position: usize,
    /// Id of the baseline request.
    pub tool_use_id: ToolUseId,
    /// Timestamp of the baseline request, when logged.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Why an edit was not applied during replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EditFailureReason {
    /// `old_string` does not occur in the current content.
    NotFound,
    /// `old_string` occurs more than once and `replace_all` is not set.
    Ambiguous {
        /// Number of matches found.
        occurrences: usize,
    },
    /// The tool result itself reported failure; the edit changed nothing.
    ToolReportedFailure {
        /// Error text returned by the tool.
        message: String,
    },
}

impl EditFailureReason {
    /// One-line explanation for reports.
    pub fn describe(&self) -> String {
        match self {
            Self::NotFound => "old_string not found".to_string(),
            Self::Ambiguous { occurrences } => {
                format!("old_string ambiguous ({} occurrences)", occurrences)
            }
            Self::ToolReportedFailure { message } => {
                format!("tool reported failure: {}", first_line(message))
            }
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

/// An edit that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEdit {
    /// Index of the edit within the file's timeline.
    pub timeline_index: usize,
    /// Global operation position.
    pub position: usize,
    /// Id of the edit request.
    pub tool_use_id: ToolUseId,
    /// For multi-edits, which sub-edit failed.
    pub sub_edit: Option<usize>,
    /// Why it was not applied.
    pub reason: EditFailureReason,
    /// The tool said the edit succeeded although the text did not match here.
    pub tool_reported_success: bool,
}

/// A shell command referencing the file after its baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellReference {
    /// Global operation position.
    pub position: usize,
    /// Full command line.
    pub command: String,
}

/// One operation seen on a file's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeenOperation {
    /// Global operation position.
    pub position: usize,
    /// What kind of operation it was.
    pub kind: OperationKind,
}

/// Reconstruction outcome for a single file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructionResult {
    /// Path as logged.
    pub path: String,
    /// Exact, partial or unrecoverable.
    pub status: ReconstructionStatus,
    /// Present unless the status is `Unrecoverable`.
    pub content: Option<String>,
    /// The snapshot replay started from.
    pub baseline: Option<BaselineSource>,
    /// Edits after the baseline that were not applied, in timeline order.
    pub failed_edits: Vec<FailedEdit>,
    /// Edits and multi-edits after the baseline that applied cleanly.
    pub edits_applied: usize,
    /// Edits positioned before the baseline; never replayed.
    pub superseded_edits: usize,
    /// Edit requests after the baseline that never received a result.
    ///
    /// They are not replayed, so the content may lack their changes even
    /// when the status is `Exact`.
    pub unanswered_edits: usize,
    /// Shell commands naming the file after the baseline.
    pub shell_references: Vec<ShellReference>,
    /// Every timeline operation, in order.
    pub seen: Vec<SeenOperation>,
}

impl ReconstructionResult {
    /// True when content could be produced.
    pub fn is_recovered(&self) -> bool {
        self.content.is_some()
    }

    /// Count of seen operations per kind.
    pub fn seen_counts(&self) -> BTreeMap<OperationKind, usize> {
        let mut counts = BTreeMap::new();
        for seen in &self.seen {
            *counts.entry(seen.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable explanation for a missing baseline, e.g.
    /// `"3 edits, 1 partial read, no snapshot"`.
    pub fn no_baseline_diagnostic(&self) -> String {
        let mut parts: Vec<String> = self
            .seen_counts()
            .into_iter()
            .map(|(kind, count)| {
                let (one, many) = kind.labels();
                format!("{} {}", count, if count == 1 { one } else { many })
            })
            .collect();
        parts.push("no snapshot".to_string());
        parts.join(", ")
    }
}
