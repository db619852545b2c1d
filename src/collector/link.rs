//! Deep links from captured errors into an editor or debugger.

use std::path::Path;

/// Builds an external link for a file/line pair.
pub trait DebugLinkBuilder {
    /// Link for `file` at 1-based `line`, or `None` when no link applies.
    fn link(&self, file: &Path, line: u32) -> Option<String>;
}

/// Template-based link, e.g. `vscode://file/%f:%l`.
///
/// `%f` is replaced by the (mapped) file path and `%l` by the line number.
/// Path mappings rewrite a leading prefix, e.g. a container path to the
/// developer's checkout; the first matching mapping wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorLink {
    template: String,
    mappings: Vec<(String, String)>,
}

impl EditorLink {
    /// Link from `template`, without path mappings.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            mappings: Vec::new(),
        }
    }

    /// Rewrite paths starting with `from` to start with `to` instead.
    pub fn with_path_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.mappings.push((from.into(), to.into()));
        self
    }

    /// The raw template.
    pub fn template(&self) -> &str {
        &self.template
    }

    fn map_path(&self, file: &str) -> String {
        self.mappings
            .iter()
            .find_map(|(from, to)| file.strip_prefix(from.as_str()).map(|rest| format!("{to}{rest}")))
            .unwrap_or_else(|| file.to_string())
    }
}

impl DebugLinkBuilder for EditorLink {
    fn link(&self, file: &Path, line: u32) -> Option<String> {
        if self.template.is_empty() {
            return None;
        }
        let file = self.map_path(&file.to_string_lossy());
        let line = line.to_string();
        // Substitute %l per segment so a `%l` inside the path survives.
        let parts: Vec<String> = self
            .template
            .split("%f")
            .map(|part| part.replace("%l", &line))
            .collect();
        Some(parts.join(&file))
    }
}
