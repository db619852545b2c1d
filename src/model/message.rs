//! Captured message records.
//!
//! A `MessageRecord` is built once by a collector and never mutated
//! afterwards, except for the collector-name stamp applied to copies
//! handed out by an aggregating read.

use crate::model::Value;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Default label for messages logged without one.
pub const DEFAULT_LABEL: &str = "info";

// ===== LogPayload =====

/// What a caller hands to a message collector.
///
/// Resolved once at append time: text is stored verbatim, anything else goes
/// through the collector's formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum LogPayload {
    /// A string message, stored verbatim.
    Text(String),
    /// Any other value, stored through the formatter.
    Structured(Value),
}

impl From<&str> for LogPayload {
    fn from(s: &str) -> Self {
        LogPayload::Text(s.to_string())
    }
}

impl From<String> for LogPayload {
    fn from(s: String) -> Self {
        LogPayload::Text(s)
    }
}

impl From<Value> for LogPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Str(s) => LogPayload::Text(s),
            other => LogPayload::Structured(other),
        }
    }
}

// ===== MessageRecord =====

/// A normalized captured message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rich_html: Option<String>,
    is_plain_string: bool,
    label: String,
    #[serde(serialize_with = "serialize_seconds")]
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_collector: Option<String>,
}

impl MessageRecord {
    /// Record for a plain string message.
    pub fn plain(text: impl Into<String>, label: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            rich_html: None,
            is_plain_string: true,
            label: label.into(),
            timestamp,
            source_collector: None,
        }
    }

    /// Record for a formatted non-string value.
    pub fn formatted(
        text: impl Into<String>,
        rich_html: Option<String>,
        label: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            text: text.into(),
            rich_html,
            is_plain_string: false,
            label: label.into(),
            timestamp,
            source_collector: None,
        }
    }

    /// Copy of this record attributed to the named peer collector.
    pub(crate) fn from_peer(mut self, collector: &str) -> Self {
        self.source_collector = Some(collector.to_string());
        self
    }

    // ===== Accessors (read-only) =====

    /// Display text: the string itself, or the formatter's output.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Rich rendering, only for non-string values on rich collectors.
    pub fn rich_html(&self) -> Option<&str> {
        self.rich_html.as_deref()
    }

    /// True when the message was logged as a string.
    pub fn is_plain_string(&self) -> bool {
        self.is_plain_string
    }

    /// Severity or category tag.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// When the record was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Name of the peer collector this record came from, for aggregated reads.
    pub fn source_collector(&self) -> Option<&str> {
        self.source_collector.as_deref()
    }
}

/// Serializes a timestamp as float seconds since the epoch (microsecond precision).
pub(crate) fn serialize_seconds<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(ts.timestamp_micros() as f64 / 1_000_000.0)
}

// ===== Tests =====
