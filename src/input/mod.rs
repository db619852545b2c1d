//! Log input sources for the command-line front end.
//!
//! - File input: the whole file is read once.
//! - Stdin: read to EOF when data is piped in.

use crate::model::error::InputError;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Label used as the "file" of records that come from stdin.
pub const STDIN_LABEL: &str = "<stdin>";

/// Where log lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A log file on disk.
    File(PathBuf),
    /// Piped standard input.
    Stdin,
}

impl InputSource {
    /// Path to report in records derived from this input.
    pub fn origin(&self) -> &Path {
        match self {
            InputSource::File(path) => path,
            InputSource::Stdin => Path::new(STDIN_LABEL),
        }
    }

    /// Read the whole input.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file vanished since detection,
    /// `InputError::Io` for other I/O errors.
    pub fn read_all(&self) -> Result<String, InputError> {
        match self {
            InputSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    InputError::FileNotFound { path: path.clone() }
                } else {
                    InputError::Io(e)
                }
            }),
            InputSource::Stdin => read_from(std::io::stdin().lock()),
        }
    }
}

fn read_from(mut reader: impl Read) -> Result<String, InputError> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Detect the input source.
///
/// 1. A file path, if given and present on disk.
/// 2. Stdin, if it is piped.
/// 3. Otherwise `InputError::NoInput`.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` for a missing file and `InputError::NoInput`
/// when nothing is provided and stdin is a terminal.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) if path.exists() => Ok(InputSource::File(path)),
        Some(path) => Err(InputError::FileNotFound { path }),
        None if std::io::stdin().is_terminal() => Err(InputError::NoInput),
        None => Ok(InputSource::Stdin),
    }
}
