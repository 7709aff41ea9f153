//! Choosing and persisting the base directory.
//!
//! The picker is a blocking prompt that yields either a directory or nothing
//! (the operator cancelled). [`select_base_directory`] validates the answer
//! and writes it to the base directory file; on cancellation nothing is written.

use crate::config::{BaseDirectoryConfig, ConfigError};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Source of the operator's base directory choice.
pub trait DirectoryPicker {
    /// Blocks until the operator answers. `None` means cancelled.
    fn pick(&mut self) -> Option<PathBuf>;
}

/// Asks for a directory on a line-oriented terminal.
///
/// An empty answer or end of input counts as cancellation.
pub struct PromptPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptPicker<io::StdinLock<'static>, io::Stdout> {
    /// A picker reading from stdin and prompting on stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> DirectoryPicker for PromptPicker<R, W> {
    fn pick(&mut self) -> Option<PathBuf> {
        write!(self.output, "Select Base Directory: ").ok()?;
        self.output.flush().ok()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer).ok()?;
        let answer = answer.trim();
        if answer.is_empty() {
            None
        } else {
            Some(PathBuf::from(answer))
        }
    }
}

/// A choice made up front, e.g. passed on the command line.
pub struct Preselected(pub PathBuf);

impl DirectoryPicker for Preselected {
    fn pick(&mut self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Errors that end a directory selection.
#[derive(Debug)]
pub enum SelectionError {
    /// The operator did not choose a directory.
    Cancelled,
    /// The chosen path is not an existing directory.
    NotADirectory { path: PathBuf },
    /// The choice could not be saved.
    Config(ConfigError),
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "No directory selected. Exiting."),
            Self::NotADirectory { path } => {
                write!(f, "{} is not an existing directory", path.display())
            }
            Self::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SelectionError {}

impl From<ConfigError> for SelectionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Asks `picker` for a base directory and saves it to `path_file`.
///
/// The stored path is absolute. Returns the saved configuration.
///
/// # Errors
///
/// `SelectionError::Cancelled` if the picker returned nothing, in which case
/// `path_file` is left untouched.
pub fn select_base_directory(
    picker: &mut dyn DirectoryPicker,
    path_file: &Path,
) -> Result<BaseDirectoryConfig, SelectionError> {
    let chosen = picker.pick().ok_or(SelectionError::Cancelled)?;

    let absolute = fs::canonicalize(&chosen)
        .ok()
        .filter(|path| path.is_dir())
        .ok_or(SelectionError::NotADirectory { path: chosen })?;

    let config = BaseDirectoryConfig::new(absolute);
    config.save(path_file)?;
    Ok(config)
}
