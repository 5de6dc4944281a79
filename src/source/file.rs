//! File-based log source.

use super::read_lines_lossy;
use crate::model::error::InputError;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A JSONL log file on disk.
///
/// Existence is checked at construction; content is read on demand.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the path does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(InputError::FileNotFound { path });
        }
        Ok(Self { path })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Label used in entry origins.
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }

    /// Read every line of the file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected so one damaged line
    /// cannot hide the rest of the log.
    pub fn read_lines(&self) -> Result<Vec<String>, InputError> {
        let file = File::open(&self.path)?;
        Ok(read_lines_lossy(BufReader::new(file))?)
    }
}
