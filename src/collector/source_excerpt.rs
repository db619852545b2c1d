//! Source context around a failing line.

use std::io;
use std::path::Path;

/// Lines shown before the failing line.
pub const LEADING_LINES: usize = 3;

/// Lines shown after the failing line.
pub const TRAILING_LINES: usize = 3;

/// A window of source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExcerpt {
    /// 1-based number of the first line in `lines`.
    pub start_line: usize,
    /// The lines, without terminators.
    pub lines: Vec<String>,
}

/// Read `path` and cut the window around 1-based `line`.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_excerpt(path: &Path, line: u32) -> io::Result<SourceExcerpt> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(excerpt(&text, line))
}

/// Window of at most seven lines: three before `line`, the line itself, three after.
///
/// Leading context is clipped at the start of the file and trailing context at the end;
/// the window never slides to make up for clipped lines.
///
/// Line terminators (`\n` or `\r\n`) are dropped; the rest of each line is kept
/// exactly as written, since the lines are only displayed.
pub fn excerpt(text: &str, line: u32) -> SourceExcerpt {
    let line = line as usize;
    let start_line = line.saturating_sub(LEADING_LINES).max(1);
    let end_line = line + TRAILING_LINES;

    let lines = text
        .lines()
        .skip(start_line - 1)
        .take(end_line + 1 - start_line)
        .map(str::to_string)
        .collect();

    SourceExcerpt { start_line, lines }
}

/// Placeholder shown when the source file cannot be opened.
pub fn unreadable_placeholder(path: &Path) -> String {
    format!(
        "Cannot open the file ({}) in which the exception occurred",
        path.display()
    )
}
