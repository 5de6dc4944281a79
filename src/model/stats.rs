//! Operation statistics.
//!
//! Counts what a set of logs contains, independent of reconstruction outcome.

use crate::model::{Operation, SequencedOperation};
use serde::Serialize;
use std::collections::BTreeSet;

/// Aggregated counts over a joined operation sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    /// Write operations.
    pub writes: usize,
    /// Edit operations.
    pub edits: usize,
    /// MultiEdit operations.
    pub multi_edits: usize,
    /// Reads covering the whole file.
    pub full_reads: usize,
    /// Reads limited by offset, limit or truncation.
    pub partial_reads: usize,
    /// Bash commands.
    pub bash_commands: usize,
    /// Uninterpreted tools.
    pub other: usize,
    /// Requests without a usable result.
    pub incomplete: usize,
    /// Edits and multi-edits whose tool result reported failure.
    pub tool_failed_edits: usize,
    /// Distinct file paths touched by any operation.
    pub files: usize,
}

impl OperationStats {
    /// Count a joined sequence.
    pub fn from_operations(operations: &[SequencedOperation]) -> Self {
        let mut stats = Self::default();
        let mut paths = BTreeSet::new();

        for op in operations {
            stats.record(op.operation());
            if let Some(path) = op.path() {
                paths.insert(path);
            }
        }

        stats.files = paths.len();
        stats
    }

    fn record(&mut self, operation: &Operation) {
        match operation {
            Operation::Read(read) if read.is_partial => self.partial_reads += 1,
            Operation::Read(_) => self.full_reads += 1,
            Operation::Write(_) => self.writes += 1,
            Operation::Edit(edit) => {
                self.edits += 1;
                if edit.tool_outcome.is_failure() {
                    self.tool_failed_edits += 1;
                }
            }
            Operation::MultiEdit(multi) => {
                self.multi_edits += 1;
                if multi.tool_outcome.is_failure() {
                    self.tool_failed_edits += 1;
                }
            }
            Operation::BashCommand(_) => self.bash_commands += 1,
            Operation::Other(_) => self.other += 1,
            Operation::Incomplete(_) => self.incomplete += 1,
        }
    }

    /// Total number of operations counted.
    pub fn total(&self) -> usize {
        self.writes
            + self.edits
            + self.multi_edits
            + self.full_reads
            + self.partial_reads
            + self.bash_commands
            + self.other
            + self.incomplete
    }
}
