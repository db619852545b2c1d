//! Capturable errors.
//!
//! [`Throwable`] is what the exceptions collector reads from a captured error.
//! [`ErrorReport`] is an owned implementation, buildable by hand or from any
//! `std::error::Error` at the call site.

use crate::model::Frame;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::path::{Path, PathBuf};

/// Kind recorded for `source()` causes, whose concrete type is erased.
pub const ERASED_KIND: &str = "dyn std::error::Error";

/// A captured error as seen by the exceptions collector.
pub trait Throwable {
    /// Runtime type name.
    fn kind(&self) -> &str;

    /// Human-readable message.
    fn message(&self) -> String;

    /// Numeric error code, 0 when the error has none.
    fn code(&self) -> i64 {
        0
    }

    /// File the error was raised in.
    fn file(&self) -> &Path;

    /// 1-based line the error was raised at.
    fn line(&self) -> u32;

    /// Native human-readable trace.
    fn trace_text(&self) -> String;

    /// Structured trace, outermost call last.
    fn frames(&self) -> Vec<Frame> {
        Vec::new()
    }

    /// Underlying cause, if any.
    fn cause(&self) -> Option<&dyn Throwable> {
        None
    }
}

// ===== ErrorReport =====

/// Owned, self-contained [`Throwable`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    kind: String,
    message: String,
    code: i64,
    file: PathBuf,
    line: u32,
    trace: String,
    frames: Vec<Frame>,
    cause: Option<Box<ErrorReport>>,
}

impl ErrorReport {
    /// Report raised at `file`:`line`, with every optional part empty.
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        file: impl Into<PathBuf>,
        line: u32,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            code: 0,
            file: file.into(),
            line,
            trace: String::new(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Report for `err`, located at the caller.
    ///
    /// The kind is `E`'s type name and the trace is a `std::backtrace::Backtrace`
    /// (only resolved when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` enable it).
    /// Each `source()` in the chain becomes a nested cause with kind
    /// [`ERASED_KIND`] at the same location.
    #[track_caller]
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        let location = Location::caller();
        let trace = Backtrace::capture().to_string();

        let mut causes = Vec::new();
        let mut next = err.source();
        while let Some(source) = next {
            causes.push(Self::new(
                ERASED_KIND,
                source.to_string(),
                location.file(),
                location.line(),
            ));
            next = source.source();
        }

        let chained = causes
            .into_iter()
            .rev()
            .reduce(|inner, outer| outer.with_cause(inner));

        let mut report = Self::new(
            std::any::type_name::<E>(),
            err.to_string(),
            location.file(),
            location.line(),
        )
        .with_trace(trace);
        report.cause = chained.map(Box::new);
        report
    }

    /// Set the numeric error code.
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Set the human-readable trace.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    /// Set the structured trace.
    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = frames;
        self
    }

    /// Set the underlying cause.
    pub fn with_cause(mut self, cause: ErrorReport) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl Throwable for ErrorReport {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn code(&self) -> i64 {
        self.code
    }

    fn file(&self) -> &Path {
        &self.file
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn trace_text(&self) -> String {
        self.trace.clone()
    }

    fn frames(&self) -> Vec<Frame> {
        self.frames.clone()
    }

    fn cause(&self) -> Option<&dyn Throwable> {
        self.cause.as_deref().map(|c| c as &dyn Throwable)
    }
}
