//! Error types for ccrec.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level binary error wrapping all fatal failures
//!   - [`InputError`] - Log file/stdin/project discovery failures
//!   - [`ConfigError`] - Config file read or TOML failures
//!   - [`LoggingError`] - Tracing subscriber setup failures
//!   - `std::io::Error` - Writing the report to stdout
//! - [`ParseError`] - JSONL line decoding failures
//!
//! # Recovery Strategy
//!
//! Nothing inside the engine is fatal. A `ParseError` is always converted into
//! a [`MalformedEntry`](crate::model::MalformedEntry) and the line is skipped;
//! unmatched results, failed edits and missing baselines are values in the
//! output. Only the binary's input loading and setup can fail with `AppError`.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error for the binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read input from file, directory or stdin.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Config file exists but could not be used.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialised.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// Result serialization failed.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing output failed (closed pipe, full disk).
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// `--show` named a path that no log mentions.
    #[error("No operations recorded for {0}")]
    UnknownPath(String),

    /// `--show` named a path with no usable snapshot.
    #[error("{path} cannot be reconstructed: {diagnostic}")]
    Unrecoverable {
        /// Path as given to `--show`.
        path: String,
        /// What the logs held for it instead.
        diagnostic: String,
    },
}

/// Errors encountered when locating or reading log input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified log file or directory does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use ccrec::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// No log source was given and stdin is an interactive terminal.
    #[error("No input source: provide log files, --project, or pipe data to stdin")]
    NoInput,

    /// No session log directory matches a project path.
    #[error("No session logs found for {path}\nExpected: {expected}{available}")]
    ProjectNotFound {
        /// Project path as given by the user (resolved).
        path: PathBuf,
        /// Directory the mangled path pointed at.
        expected: PathBuf,
        /// Pre-rendered listing of known projects, empty when none exist.
        available: String,
    },

    /// Session discovery was given a pattern `glob` could not compile.
    #[error("Invalid session file pattern {pattern}: {message}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// `glob` error text.
        message: String,
    },

    /// Generic I/O error reading from an input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when parsing a JSONL log line.
///
/// Always recovered: the line becomes a `MalformedEntry` and parsing continues.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A log line is not valid JSON, or not shaped like a log record.
    ///
    /// # Examples
    ///
    /// ```
    /// use ccrec::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     line: 42,
    ///     message: "unexpected character '}' at position 15".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// `serde_json` error text.
        message: String,
    },

    /// A record lacks a field the log format requires.
    #[error("Missing required field '{field}' at line {line}")]
    MissingField {
        /// 1-based line number.
        line: usize,
        /// Field name from the log schema.
        field: &'static str,
    },
}
