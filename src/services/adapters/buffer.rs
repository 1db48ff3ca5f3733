//! In-memory open-document store backing the live editor port.

use ropey::Rope;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::engine::edits::apply_edits;
use crate::services::ports::{
    ApplyError, EditErrorKind, EditorAccess, PositionEncoding, TextEdit,
};

use super::disk::write_rope_to_path;

pub struct OpenBuffers {
    buffers: FxHashMap<PathBuf, Rope>,
    encoding: PositionEncoding,
}

impl OpenBuffers {
    pub fn new(encoding: PositionEncoding) -> Self {
        Self {
            buffers: FxHashMap::default(),
            encoding,
        }
    }

    pub fn open(&mut self, path: impl Into<PathBuf>, text: &str) {
        self.buffers.insert(path.into(), Rope::from_str(text));
    }

    pub fn close(&mut self, path: &Path) -> bool {
        self.buffers.remove(path).is_some()
    }

    pub fn text(&self, path: &Path) -> Option<String> {
        self.buffers.get(path).map(Rope::to_string)
    }

    pub fn open_count(&self) -> usize {
        self.buffers.len()
    }
}

impl Default for OpenBuffers {
    fn default() -> Self {
        Self::new(PositionEncoding::Utf16)
    }
}

impl EditorAccess for OpenBuffers {
    fn is_open(&self, path: &Path) -> bool {
        self.buffers.contains_key(path)
    }

    fn apply_in_place(
        &mut self,
        path: &Path,
        edits: &[TextEdit],
    ) -> Result<Vec<TextEdit>, ApplyError> {
        let Some(rope) = self.buffers.get_mut(path) else {
            return Err(ApplyError::new(path, EditErrorKind::NotOpen));
        };
        apply_edits(rope, edits, self.encoding)
            .map_err(|(edit_index, kind)| ApplyError::at(path, edit_index, kind))
    }

    fn save_all(&mut self) -> Result<(), String> {
        for (path, rope) in &self.buffers {
            write_rope_to_path(path, rope).map_err(|e| format!("{}: {e}", path.display()))?;
        }
        Ok(())
    }

    fn close_editors_under(&mut self, prefix: &Path) -> Vec<PathBuf> {
        let closed: Vec<PathBuf> = self
            .buffers
            .keys()
            .filter(|p| p.starts_with(prefix))
            .cloned()
            .collect();
        for path in &closed {
            self.buffers.remove(path);
        }
        closed
    }

    fn reopen_editor(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                self.buffers.insert(path.to_path_buf(), Rope::from_str(&text));
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "could not reopen editor");
            }
        }
    }
}
