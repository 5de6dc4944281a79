//! Per-path view over the joined operation sequence.

use crate::model::{Operation, SequencedOperation};
use std::collections::BTreeMap;

/// The operations touching one file, in position order.
///
/// Borrowed from the global sequence; never materialized on its own.
#[derive(Debug, Clone)]
pub struct FileTimeline<'a> {
    path: &'a str,
    operations: Vec<&'a SequencedOperation>,
    shell_commands: Vec<&'a SequencedOperation>,
}

impl<'a> FileTimeline<'a> {
    /// Timeline of a single path.
    pub fn for_path(operations: &'a [SequencedOperation], path: &'a str) -> Self {
        let mut timeline = Self::empty(path);
        for op in operations {
            if op.path() == Some(path) {
                timeline.operations.push(op);
            } else if let Operation::BashCommand(bash) = op.operation() {
                if command_tokens(&bash.command).any(|token| token == path) {
                    timeline.shell_commands.push(op);
                }
            }
        }
        timeline
    }

    /// Timelines of every path in the sequence, keyed by path.
    ///
    /// With a prefix, only paths starting with it are included.
    pub fn group(
        operations: &'a [SequencedOperation],
        prefix: Option<&str>,
    ) -> BTreeMap<&'a str, FileTimeline<'a>> {
        let mut timelines: BTreeMap<&'a str, FileTimeline<'a>> = BTreeMap::new();

        for op in operations {
            let Some(path) = op.path() else { continue };
            if prefix.is_some_and(|prefix| !path.starts_with(prefix)) {
                continue;
            }
            timelines
                .entry(path)
                .or_insert_with(|| Self::empty(path))
                .operations
                .push(op);
        }

        for op in operations {
            let Operation::BashCommand(bash) = op.operation() else {
                continue;
            };
            let mut matched: Vec<&str> = command_tokens(&bash.command)
                .filter(|token| timelines.contains_key(token))
                .collect();
            matched.sort_unstable();
            matched.dedup();
            for token in matched {
                if let Some(timeline) = timelines.get_mut(token) {
                    timeline.shell_commands.push(op);
                }
            }
        }

        timelines
    }

    fn empty(path: &'a str) -> Self {
        Self {
            path,
            operations: Vec::new(),
            shell_commands: Vec::new(),
        }
    }

    /// The path this timeline covers.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Operations on the path in position order.
    pub fn operations(&self) -> &[&'a SequencedOperation] {
        &self.operations
    }

    /// Bash commands whose arguments name this path.
    pub fn shell_commands(&self) -> &[&'a SequencedOperation] {
        &self.shell_commands
    }

    /// True when no operation names the path.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Split a shell command into word-like tokens, dropping quotes and
/// redirection/pipeline punctuation.
fn command_tokens(command: &str) -> impl Iterator<Item = &str> {
    command
        .split(|c: char| {
            c.is_whitespace() || matches!(c, ';' | '|' | '&' | '<' | '>' | '(' | ')' | '`')
        })
        .map(|token| token.trim_matches(|c| c == '"' || c == '\''))
        .filter(|token| !token.is_empty())
}
