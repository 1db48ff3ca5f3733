//! Applies edit plans to documents that live only on disk.

use ropey::Rope;
use std::io::Write;
use std::path::Path;

use crate::engine::edits::apply_edits;
use crate::services::ports::{
    ApplyError, EditErrorKind, PersistenceGateway, PositionEncoding, TextEdit,
};

pub struct LocalDisk {
    encoding: PositionEncoding,
}

impl LocalDisk {
    pub fn new(encoding: PositionEncoding) -> Self {
        Self { encoding }
    }
}

impl Default for LocalDisk {
    fn default() -> Self {
        Self::new(PositionEncoding::Utf16)
    }
}

impl PersistenceGateway for LocalDisk {
    fn apply_on_disk(
        &mut self,
        path: &Path,
        edits: &[TextEdit],
    ) -> Result<Vec<TextEdit>, ApplyError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApplyError::new(path, EditErrorKind::Io(e)))?;
        let mut rope = Rope::from_str(&content);

        let inverse = apply_edits(&mut rope, edits, self.encoding)
            .map_err(|(edit_index, kind)| ApplyError::at(path, edit_index, kind))?;

        write_rope_to_path(path, &rope)
            .map_err(|e| ApplyError::new(path, EditErrorKind::Io(e)))?;
        Ok(inverse)
    }
}

pub(crate) fn write_rope_to_path(path: &Path, rope: &Rope) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    for chunk in rope.chunks() {
        writer.write_all(chunk.as_bytes())?;
    }
    writer.flush()
}
