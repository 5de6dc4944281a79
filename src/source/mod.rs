//! Log input sources.
//!
//! - Files named on the command line (directories expand to their sessions)
//! - A project's session directory under `~/.claude/projects`
//! - Piped stdin when nothing else is given

use crate::integration::Analyzer;
use crate::model::error::InputError;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod discover;
pub mod file;
pub mod stdin;

pub use discover::{
    default_projects_dir, discover_session_files, find_project_log_dir, mangle_project_path,
    project_path_prefix,
};
pub use file::FileSource;
pub use stdin::StdinSource;

/// Where the log lines come from.
#[derive(Debug)]
pub enum InputSource {
    /// Session files, read in order.
    Files(Vec<FileSource>),
    /// Piped stdin, read to EOF.
    Stdin(StdinSource<io::Stdin>),
}

impl InputSource {
    /// Number of files, or 1 for stdin.
    pub fn len(&self) -> usize {
        match self {
            InputSource::Files(files) => files.len(),
            InputSource::Stdin(_) => 1,
        }
    }

    /// True for an empty file list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read every source into `analyzer`, stopping early if it was cancelled.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if a file disappears or cannot be read.
    pub fn load_into(self, analyzer: &mut Analyzer) -> Result<(), InputError> {
        match self {
            InputSource::Files(files) => {
                for file in files {
                    if analyzer.is_cancelled() {
                        break;
                    }
                    let label = file.label();
                    let lines = file.read_lines()?;
                    debug!("Read {} lines from {}", lines.len(), label);
                    analyzer.feed(Some(label.as_str()), lines);
                }
            }
            InputSource::Stdin(stdin) => {
                let lines = stdin.read_lines()?;
                debug!("Read {} lines from stdin", lines.len());
                analyzer.feed(None, lines);
            }
        }
        Ok(())
    }
}

/// Build the input source for the given paths.
///
/// Directories expand to the `*.jsonl` files inside them, oldest first. With
/// no paths at all, stdin is used if it is piped.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` for a path that does not exist and
/// `InputError::NoInput` when there are no paths and stdin is a terminal.
pub fn detect_input_source(paths: Vec<PathBuf>) -> Result<InputSource, InputError> {
    if paths.is_empty() {
        return Ok(InputSource::Stdin(StdinSource::new()?));
    }

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = discover_session_files(&path)?;
            if found.is_empty() {
                warn!("No session files in {}", path.display());
            }
            for session in found {
                files.push(FileSource::new(session)?);
            }
        } else {
            files.push(FileSource::new(path)?);
        }
    }
    Ok(InputSource::Files(files))
}

/// All session files recorded for `project`.
///
/// # Errors
///
/// Returns `InputError::ProjectNotFound` if no log directory matches.
pub fn detect_project_source(project: &Path, projects_root: &Path) -> Result<InputSource, InputError> {
    let dir = find_project_log_dir(project, projects_root)?;
    debug!("Using session logs in {}", dir.display());
    detect_input_source(vec![dir])
}

/// Split a reader into lines, decoding each one lossily.
///
/// A trailing `\r` is dropped from every line, and a final newline does not
/// produce an extra empty line.
pub fn read_lines_lossy<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(lines)
}
