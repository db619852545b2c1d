//! Captured exception records and stack frames.

use crate::model::Value;
use serde::Serialize;
use std::path::PathBuf;

// ===== Frame =====

/// One frame of a structured stack trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Function or method name.
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Source file, when known.
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// 1-based line, when known.
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    /// Call arguments, when captured.
    pub args: Vec<Value>,
}

impl Frame {
    /// Frame for `function` with no location or arguments.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: None,
            line: None,
            args: Vec::new(),
        }
    }

    /// Set the source location.
    pub fn at(mut self, file: impl Into<PathBuf>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Set the call arguments.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Frame as a `Value` map, the shape handed to rich renderers.
    pub fn to_value(&self) -> Value {
        let mut entries = vec![("function".to_string(), Value::from(self.function.as_str()))];
        if let Some(file) = &self.file {
            entries.push(("file".to_string(), Value::from(file.display().to_string())));
        }
        if let Some(line) = self.line {
            entries.push(("line".to_string(), Value::from(line)));
        }
        entries.push(("args".to_string(), Value::List(self.args.clone())));
        Value::Map(entries)
    }
}

// ===== ExceptionRecord =====

/// A normalized captured error.
///
/// Built eagerly at capture time: the source excerpt and the formatted
/// traces reflect the moment of capture, not the moment of reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionRecord {
    pub(crate) kind: String,
    pub(crate) message: String,
    pub(crate) code: i64,
    pub(crate) file: String,
    pub(crate) line: u32,
    pub(crate) stack_trace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stack_trace_html: Option<String>,
    pub(crate) surrounding_lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) surrounding_start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) debug_link: Option<String>,
}

impl ExceptionRecord {
    /// Runtime type name of the captured error.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Numeric error code, 0 when the error has none.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// File the error was raised in.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// 1-based line the error was raised at.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Human-readable trace, verbatim from the error.
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    /// Rich rendering of the structured trace, when requested at capture.
    pub fn stack_trace_html(&self) -> Option<&str> {
        self.stack_trace_html.as_deref()
    }

    /// Source lines around the failing line, or one explanatory line when
    /// the file could not be read.
    pub fn surrounding_lines(&self) -> &[String] {
        &self.surrounding_lines
    }

    /// 1-based line number of the first entry of `surrounding_lines`.
    ///
    /// `None` when the source file was unreadable.
    pub fn surrounding_start_line(&self) -> Option<usize> {
        self.surrounding_start_line
    }

    /// External debug link, when a link builder is configured.
    pub fn debug_link(&self) -> Option<&str> {
        self.debug_link.as_deref()
    }
}
