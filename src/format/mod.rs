//! Value formatting contracts.
//!
//! Collectors never format non-string values themselves. They call an injected
//! [`ValueFormatter`] for plain text and, when configured, a [`RichValueRenderer`]
//! for an HTML-like representation. Both are supplied at construction; there is no
//! process-wide default. [`PlainFormatter`] is provided as an explicit opt-in.

use crate::model::{FormatError, Value};
use serde::Serialize;
use std::path::PathBuf;

/// Converts any value into display text.
pub trait ValueFormatter {
    /// Display text for `value`.
    fn format(&self, value: &Value) -> Result<String, FormatError>;
}

/// Renders values into a richer representation and declares the assets it needs.
pub trait RichValueRenderer {
    /// Rich representation of `value`, usually HTML.
    fn render(&self, value: &Value) -> Result<String, FormatError>;

    /// Static assets the rendered output depends on, in load order.
    fn required_assets(&self) -> Vec<Asset> {
        Vec::new()
    }
}

// ===== Assets =====

/// Kind of static asset a renderer depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Stylesheet loaded by path.
    Css,
    /// Script loaded by path.
    Js,
    /// Stylesheet inlined into the page.
    InlineCss,
    /// Script inlined into the page.
    InlineJs,
}

/// A static asset required to display rich output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Identifier, unique per renderer.
    pub name: String,
    /// How the asset is loaded.
    pub kind: AssetKind,
    /// Location relative to the renderer's asset root.
    pub path: PathBuf,
}

impl Asset {
    /// Asset named `name` of `kind` at `path`.
    pub fn new(name: impl Into<String>, kind: AssetKind, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            path: path.into(),
        }
    }
}

// ===== PlainFormatter =====

/// Nesting depth past which [`PlainFormatter::new`] collapses values.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Plain-text formatter.
///
/// Strings are quoted, lists and maps are rendered inline, and objects are
/// rendered as `Class { field: value }`. Values nested deeper than
/// `max_depth` collapse to `…`.
#[derive(Debug, Clone)]
pub struct PlainFormatter {
    max_depth: usize,
}

impl PlainFormatter {
    /// Formatter collapsing values nested deeper than [`DEFAULT_MAX_DEPTH`].
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Formatter collapsing values nested deeper than `max_depth`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Plain text for `value`. Never fails.
    pub fn to_text(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write(value, 0, &mut out);
        out
    }

    fn write(&self, value: &Value, depth: usize, out: &mut String) {
        if depth > self.max_depth {
            out.push('…');
            return;
        }
        match value {
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write(item, depth + 1, out);
                }
                out.push(']');
            }
            Value::Map(entries) => {
                out.push('{');
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&format!("{k:?}: "));
                    self.write(v, depth + 1, out);
                }
                out.push('}');
            }
            Value::Object(obj) => {
                out.push_str(obj.class());
                out.push_str(" {");
                for (i, (k, v)) in obj.fields().iter().enumerate() {
                    out.push_str(if i > 0 { ", " } else { " " });
                    out.push_str(k);
                    out.push_str(": ");
                    self.write(v, depth + 1, out);
                }
                out.push_str(if obj.fields().is_empty() { "}" } else { " }" });
            }
            // Scalars only: composites are handled above.
            scalar => out.push_str(&scalar.to_string()),
        }
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueFormatter for PlainFormatter {
    fn format(&self, value: &Value) -> Result<String, FormatError> {
        Ok(self.to_text(value))
    }
}
