//! JSONL log line parser.
//!
//! Each line is one structured log call:
//!
//! ```json
//! {"level": "warning", "message": "disk {pct} full", "context": {"pct": 97}}
//! ```
//!
//! `level` defaults to `"info"`, `context` to empty. A string `message` is
//! interpolated on ingestion; any other JSON value is formatted as structured data.

use crate::model::{Context, LogPayload, ParseError, Value, DEFAULT_LABEL};
use serde::Deserialize;

/// A parsed log call, ready for `MessagesCollector::log`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Label for the message, `"info"` when absent.
    pub level: String,
    /// The message, text or structured.
    pub message: LogPayload,
    /// Placeholder values, empty when absent.
    pub context: Context,
}

#[derive(Debug, Deserialize)]
struct RawLogLine {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    context: Option<serde_json::Value>,
}

/// Parse one JSONL line. `line_number` is 1-based and only used for errors.
pub fn parse_line(line_number: usize, line: &str) -> Result<LogLine, ParseError> {
    let raw: RawLogLine =
        serde_json::from_str(line).map_err(|e| ParseError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;

    let message = raw.message.ok_or(ParseError::MissingField {
        line: line_number,
        field: "message",
    })?;

    let context = match raw.context {
        None | Some(serde_json::Value::Null) => Context::new(),
        Some(serde_json::Value::Object(entries)) => entries
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect(),
        Some(_) => return Err(ParseError::InvalidContext { line: line_number }),
    };

    Ok(LogLine {
        level: raw.level.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
        message: LogPayload::from(Value::from(message)),
        context,
    })
}

/// Parse every non-blank line, keeping failures alongside successes in line order.
pub fn parse_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Vec<Result<LogLine, ParseError>> {
    lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}
