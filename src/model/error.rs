//! Error types for tracebar.
//!
//! This module defines the crate's error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level CLI error wrapping every failure below
//!   - [`InputError`] - Log file/stdin reading failures
//!   - [`ParseError`] - JSONL log line parsing failures
//!   - [`CollectError`] - Collector failures (formatter, renderer, aggregation)
//!   - [`ConfigError`](crate::config::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!
//! # Recovery Strategy
//!
//! Two failure modes never reach the caller and have no variant here:
//!
//! - An unreadable source file during exception capture is replaced with a single
//!   explanatory line in the record.
//! - A log context value that cannot be stringified leaves its `{placeholder}` untouched.
//!
//! Formatter and renderer failures are not recovered: formatting correctness belongs to
//! the injected collaborator, so the failure propagates out of `append`/`capture` and no
//! partial record is stored.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an injected `ValueFormatter` or `RichValueRenderer`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FormatError(pub String);

impl FormatError {
    /// Error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised while building or reading collector records.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The value formatter failed to produce display text.
    ///
    /// Propagated as-is; the collector stores nothing for the failed call.
    #[error("Value formatter failed: {source}")]
    Formatter {
        /// The formatter's error.
        #[source]
        source: FormatError,
    },

    /// The rich renderer failed on a value or a stack trace.
    #[error("Rich renderer failed: {source}")]
    Renderer {
        /// The renderer's error.
        #[source]
        source: FormatError,
    },

    /// Rich output was requested from a collector built without a renderer.
    #[error("Collector '{collector}' has no rich renderer configured")]
    RichRenderingUnavailable {
        /// Name of the collector the request was made on.
        collector: String,
    },

    /// A peer collector was mutably borrowed while an aggregated read ran.
    ///
    /// Peers are shared through `Rc<RefCell<_>>`; reading one while its owner
    /// holds a mutable borrow would otherwise panic.
    #[error("Peer collector #{index} is busy (mutably borrowed)")]
    PeerBusy {
        /// Position of the peer in aggregation order.
        index: usize,
    },

    /// Two collectors assembled into one payload map share a name.
    #[error("Two collectors are named '{name}'")]
    DuplicateName {
        /// The shared collector name.
        name: String,
    },

    /// The collected payload could not be serialized.
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors encountered when reading log input from files or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified log file does not exist at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use tracebar::model::error::InputError;
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

    /// No input source was provided and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Generic I/O error reading from the input source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when parsing JSONL log lines.
///
/// Non-fatal for the CLI: each failure is captured as an exception record pointing at the
/// offending line, and parsing continues with the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line contains syntactically invalid JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebar::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     line: 42,
    ///     message: "expected value".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Parser error message from `serde_json`.
        message: String,
    },

    /// A JSON object is missing a required field.
    #[error("Missing required field '{field}' at line {line}")]
    MissingField {
        /// 1-based line number.
        line: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The `context` field is present but is not a JSON object.
    #[error("Context at line {line} must be an object")]
    InvalidContext {
        /// 1-based line number.
        line: usize,
    },
}

impl ParseError {
    /// 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            ParseError::InvalidJson { line, .. }
            | ParseError::MissingField { line, .. }
            | ParseError::InvalidContext { line } => *line,
        }
    }
}

/// Top-level CLI error encompassing all failure modes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Log input could not be read.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// Config file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Diagnostics logging could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    /// A collector failed while logging or collecting.
    #[error("Collector error: {0}")]
    Collect(#[from] CollectError),

    /// Failure writing the payload to stdout.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn format_error_display_is_message() {
        let err = FormatError::new("cannot format cyclic value");
        assert_eq!(err.to_string(), "cannot format cyclic value");
    }

    #[test]
    fn collect_error_formatter_keeps_source() {
        let err = CollectError::Formatter {
            source: FormatError::new("boom"),
        };
        assert!(err.to_string().contains("Value formatter failed"));
        let source = std::error::Error::source(&err).expect("has source");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn rich_rendering_unavailable_names_collector() {
        let err = CollectError::RichRenderingUnavailable {
            collector: "exceptions".to_string(),
        };
        assert!(err.to_string().contains("'exceptions'"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn parse_error_reports_line() {
        let errors = [
            ParseError::InvalidJson {
                line: 1,
                message: "eof".to_string(),
            },
            ParseError::MissingField {
                line: 100,
                field: "message",
            },
            ParseError::InvalidContext { line: 9999 },
        ];

        for err in errors {
            let msg = err.to_string();
            assert!(msg.contains(&format!("line {}", err.line())), "{msg}");
        }
    }

    #[test]
    fn app_error_from_collect_error() {
        let app_err: AppError = CollectError::PeerBusy { index: 2 }.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Collector error"));
        assert!(msg.contains("#2"));
    }

    #[test]
    fn app_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let input_err: InputError = io_err.into();
        let app_err: AppError = input_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }
}
