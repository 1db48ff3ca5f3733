//! Collaborator ports consumed by the transaction engine.

use std::io;
use std::path::{Path, PathBuf};

use super::edit::{Range, TextEdit};

#[derive(Debug)]
pub enum EditErrorKind {
    LineOutOfBounds { line: u32, lines: usize },
    ColumnOutOfBounds { line: u32, character: u32 },
    InvertedRange { range: Range },
    NotOpen,
    Io(io::Error),
    Gateway(String),
}

impl std::fmt::Display for EditErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditErrorKind::LineOutOfBounds { line, lines } => {
                write!(f, "line {} out of bounds (document has {} lines)", line, lines)
            }
            EditErrorKind::ColumnOutOfBounds { line, character } => {
                write!(f, "column {} out of bounds on line {}", character, line)
            }
            EditErrorKind::InvertedRange { range } => {
                write!(f, "range {} ends before it starts", range)
            }
            EditErrorKind::NotOpen => write!(f, "document is not open"),
            EditErrorKind::Io(e) => write!(f, "IO error: {}", e),
            EditErrorKind::Gateway(msg) => write!(f, "persistence gateway error: {}", msg),
        }
    }
}

impl From<io::Error> for EditErrorKind {
    fn from(e: io::Error) -> Self {
        EditErrorKind::Io(e)
    }
}

/// A single edit failed against a document, live or on disk. `edit_index`
/// points into the plan's apply-ordered edit list when the failure belongs to
/// one particular edit.
#[derive(Debug)]
pub struct ApplyError {
    pub path: PathBuf,
    pub edit_index: Option<usize>,
    pub kind: EditErrorKind,
}

impl ApplyError {
    pub fn new(path: impl Into<PathBuf>, kind: EditErrorKind) -> Self {
        Self {
            path: path.into(),
            edit_index: None,
            kind,
        }
    }

    pub fn at(path: impl Into<PathBuf>, edit_index: usize, kind: EditErrorKind) -> Self {
        Self {
            path: path.into(),
            edit_index: Some(edit_index),
            kind,
        }
    }
}

impl std::fmt::Display for ApplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.edit_index {
            Some(index) => write!(f, "edit {} of {}: {}", index, self.path.display(), self.kind),
            None => write!(f, "{}: {}", self.path.display(), self.kind),
        }
    }
}

impl std::error::Error for ApplyError {}

/// Live editing surface. `apply_in_place` mutates the in-memory buffer and
/// returns the inverse edit list computed from a pre-apply snapshot.
pub trait EditorAccess {
    fn is_open(&self, path: &Path) -> bool;

    fn apply_in_place(&mut self, path: &Path, edits: &[TextEdit])
        -> Result<Vec<TextEdit>, ApplyError>;

    fn save_all(&mut self) -> Result<(), String>;

    /// Closes every open editor at or beneath `prefix` and returns the paths
    /// that were closed, in no particular order.
    fn close_editors_under(&mut self, prefix: &Path) -> Vec<PathBuf>;

    fn reopen_editor(&mut self, path: &Path);
}

/// Applies edits to a document that is not open anywhere, using the same
/// reverse-order application and inverse rule as the editor path.
pub trait PersistenceGateway {
    fn apply_on_disk(&mut self, path: &Path, edits: &[TextEdit])
        -> Result<Vec<TextEdit>, ApplyError>;
}

pub trait ResourceStore {
    fn create_file(&mut self, path: &Path) -> Result<(), String>;
    fn create_folder(&mut self, path: &Path) -> Result<(), String>;
    fn rename(&mut self, old_path: &Path, new_path: &Path) -> Result<(), String>;
}

/// Human-readable status reporting; never used for control flow.
pub trait NotificationSink {
    fn progress(&mut self, message: &str);
    fn succeeded(&mut self);
    fn failed(&mut self, message: &str);

    /// The one state where the workspace is left inconsistent; surfaced with
    /// higher severity than an ordinary failure.
    fn restore_failed(&mut self, message: &str);
}
