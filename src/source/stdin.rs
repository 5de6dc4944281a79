//! Stdin-based log source for piped input.

use super::read_lines_lossy;
use crate::model::error::InputError;
use std::io::{self, BufReader, IsTerminal, Read};

/// Stdin source for piped JSONL input (`cat session.jsonl | ccrec`).
pub struct StdinSource<R: Read> {
    reader: R,
}

impl StdinSource<io::Stdin> {
    /// Create a new StdinSource from stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is a TTY, so the binary does not
    /// block waiting for a user who forgot to pipe data.
    pub fn new() -> Result<Self, InputError> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self::from_reader(stdin))
    }
}

impl<R: Read> StdinSource<R> {
    /// Create StdinSource from any reader, bypassing the TTY check.
    pub fn from_reader(reader: R) -> Self {
        Self { reader }
    }

    /// Read until EOF.
    pub fn read_lines(self) -> Result<Vec<String>, InputError> {
        Ok(read_lines_lossy(BufReader::new(self.reader))?)
    }
}

impl<R: Read> std::fmt::Debug for StdinSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinSource").finish_non_exhaustive()
    }
}
