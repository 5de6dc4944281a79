//! Pure core integration functions.
//!
//! Wires the stages together: lines → [`EntryStream`] → [`OperationJoiner`] →
//! [`reconstruct_all`]. Loading the lines is the caller's job; nothing here
//! performs I/O.

use crate::join::{JoinOptions, OperationJoiner, UnmatchedResult};
use crate::model::{MalformedEntry, OperationStats, ReconstructionResult, SequencedOperation};
use crate::parser::{EntryStream, ParseResult};
use crate::reconstruct::reconstruct_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

// ===== Cancellation =====

/// Shared flag a caller can set to abandon a long scan between lines.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// A flag that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the flag for every clone.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether any clone has fired.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ===== Options =====

/// Settings for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Joiner settings.
    pub join: JoinOptions,
    /// Only reconstruct paths starting with this prefix.
    pub path_prefix: Option<String>,
    /// Flag checked before every line.
    pub cancellation: Option<Cancellation>,
}

// ===== Analysis =====

/// Everything a run produced: per-file results plus the diagnostics gathered
/// along the way.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// One result per path, ordered by path.
    pub files: BTreeMap<String, ReconstructionResult>,
    /// The joined operation sequence, for consumers that browse history.
    #[serde(skip)]
    pub operations: Vec<SequencedOperation>,
    /// Lines that failed to parse.
    pub malformed: Vec<MalformedEntry>,
    /// Results with no preceding request.
    pub unmatched_results: Vec<UnmatchedResult>,
    /// Repeated request ids that were ignored.
    pub duplicate_requests: usize,
    /// Results for requests that had already completed.
    pub duplicate_results: usize,
    /// Operation counts over the whole sequence.
    pub stats: OperationStats,
    /// Valid entries parsed.
    pub entries: usize,
    /// The scan stopped early; results cover only the lines read.
    pub cancelled: bool,
}

/// Incremental pipeline over one or more log sources.
///
/// Sources are fed in order; operation positions continue across them.
pub struct Analyzer {
    options: AnalysisOptions,
    joiner: OperationJoiner,
    malformed: Vec<MalformedEntry>,
    entries: usize,
}

impl Analyzer {
    /// Empty pipeline.
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            joiner: OperationJoiner::new(options.join),
            options,
            malformed: Vec::new(),
            entries: 0,
        }
    }

    /// Whether the attached cancellation has fired.
    pub fn is_cancelled(&self) -> bool {
        self.options
            .cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
    }

    /// Parse and join the lines of one source.
    pub fn feed<I, S>(&mut self, source: Option<&str>, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stream = EntryStream::new(lines.into_iter());
        if let Some(source) = source {
            stream = stream.with_source(source);
        }
        if let Some(cancellation) = &self.options.cancellation {
            stream = stream.with_cancellation(cancellation.clone());
        }

        for result in stream {
            match result {
                ParseResult::Valid(entry) => {
                    self.entries += 1;
                    self.joiner.push(&entry);
                }
                ParseResult::Malformed(malformed) => self.malformed.push(malformed),
            }
        }
    }

    /// Flush the joiner and reconstruct every file.
    pub fn finish(self) -> Analysis {
        let cancelled = self.is_cancelled();
        let joined = self.joiner.finish();
        let files = reconstruct_all(&joined.operations, self.options.path_prefix.as_deref());
        let stats = OperationStats::from_operations(&joined.operations);

        info!(
            "Analyzed {} entries ({} malformed): {} operations, {} unmatched results{}",
            self.entries,
            self.malformed.len(),
            joined.operations.len(),
            joined.unmatched_results.len(),
            if cancelled { ", cancelled" } else { "" }
        );

        Analysis {
            files,
            operations: joined.operations,
            malformed: self.malformed,
            unmatched_results: joined.unmatched_results,
            duplicate_requests: joined.duplicate_requests,
            duplicate_results: joined.duplicate_results,
            stats,
            entries: self.entries,
            cancelled,
        }
    }
}

/// Run the whole pipeline over a single unlabelled source.
pub fn analyze_lines<I, S>(lines: I, options: AnalysisOptions) -> Analysis
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut analyzer = Analyzer::new(options);
    analyzer.feed(None, lines);
    analyzer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncompleteReason, Operation, OperationKind, ReconstructionStatus};

    const WRITE: &str = r#"{"type":"assistant","sessionId":"s1","message":{"content":[{"type":"tool_use","id":"w1","name":"Write","input":{"file_path":"/p/a.py","content":"x=1\n"}}]}}"#;
    const WRITE_OK: &str = r#"{"type":"user","sessionId":"s1","message":{"content":[{"type":"tool_result","tool_use_id":"w1","content":"File created"}]}}"#;
    const EDIT: &str = r#"{"type":"assistant","sessionId":"s1","message":{"content":[{"type":"tool_use","id":"e1","name":"Edit","input":{"file_path":"/p/a.py","old_string":"x=1","new_string":"x=2"}}]}}"#;
    const EDIT_OK: &str = r#"{"type":"user","sessionId":"s1","message":{"content":[{"type":"tool_result","tool_use_id":"e1","content":"ok"}]}}"#;

    #[test]
    fn analyze_lines_runs_full_pipeline() {
        let analysis = analyze_lines([WRITE, WRITE_OK, EDIT, EDIT_OK], AnalysisOptions::default());

        assert_eq!(analysis.entries, 4);
        assert_eq!(analysis.operations.len(), 2);
        let result = &analysis.files["/p/a.py"];
        assert_eq!(result.status, ReconstructionStatus::Exact);
        assert_eq!(result.content.as_deref(), Some("x=2\n"));
        assert_eq!(analysis.stats.writes, 1);
        assert_eq!(analysis.stats.edits, 1);
        assert!(!analysis.cancelled);
    }

    #[test]
    fn malformed_lines_are_collected_not_fatal() {
        let analysis = analyze_lines(
            [WRITE, "{broken", WRITE_OK],
            AnalysisOptions::default(),
        );
        assert_eq!(analysis.malformed.len(), 1);
        assert_eq!(analysis.malformed[0].line_number(), 2);
        assert_eq!(analysis.files["/p/a.py"].status, ReconstructionStatus::Exact);
    }

    #[test]
    fn positions_continue_across_sources() {
        let mut analyzer = Analyzer::new(AnalysisOptions::default());
        analyzer.feed(Some("one.jsonl"), [WRITE, WRITE_OK]);
        analyzer.feed(Some("two.jsonl"), [EDIT, EDIT_OK]);
        let analysis = analyzer.finish();

        let positions: Vec<_> = analysis.operations.iter().map(|op| op.position()).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(analysis.operations[1].origin().to_string(), "two.jsonl:1");
        assert_eq!(
            analysis.files["/p/a.py"].content.as_deref(),
            Some("x=2\n")
        );
    }

    #[test]
    fn cancelled_scan_reports_cancellation() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let options = AnalysisOptions {
            cancellation: Some(cancellation),
            ..AnalysisOptions::default()
        };

        let analysis = analyze_lines([WRITE, WRITE_OK], options);
        assert!(analysis.cancelled);
        assert_eq!(analysis.entries, 0);
        assert!(analysis.files.is_empty());
    }

    #[test]
    fn cancellation_mid_scan_flushes_pending_requests() {
        let cancellation = Cancellation::new();
        let trigger = cancellation.clone();
        let options = AnalysisOptions {
            cancellation: Some(cancellation),
            ..AnalysisOptions::default()
        };
        // Fires while the third line is handed out; the fourth is never read.
        let lines = [WRITE, WRITE_OK, EDIT, EDIT_OK]
            .into_iter()
            .enumerate()
            .map(move |(index, line)| {
                if index == 2 {
                    trigger.cancel();
                }
                line
            });

        let analysis = analyze_lines(lines, options);

        assert!(analysis.cancelled);
        assert_eq!(analysis.entries, 3);
        let kinds: Vec<_> = analysis.operations.iter().map(|op| op.kind()).collect();
        assert_eq!(kinds, vec![OperationKind::Write, OperationKind::Incomplete]);
        match analysis.operations[1].operation() {
            Operation::Incomplete(op) => assert_eq!(op.reason, IncompleteReason::NoResult),
            other => panic!("expected Incomplete, got {:?}", other),
        }

        let result = &analysis.files["/p/a.py"];
        assert_eq!(result.status, ReconstructionStatus::Exact);
        assert_eq!(result.content.as_deref(), Some("x=1\n"));
        assert_eq!(result.unanswered_edits, 1);
    }

    #[test]
    fn path_prefix_limits_reconstructed_files() {
        let options = AnalysisOptions {
            path_prefix: Some("/elsewhere/".into()),
            ..AnalysisOptions::default()
        };
        let analysis = analyze_lines([WRITE, WRITE_OK], options);
        assert!(analysis.files.is_empty());
        assert_eq!(analysis.stats.writes, 1);
    }

    #[test]
    fn cancellation_clones_share_state() {
        let a = Cancellation::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
