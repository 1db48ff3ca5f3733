//! Local filesystem resource store.

use std::path::Path;

use crate::services::ports::ResourceStore;

#[derive(Default)]
pub struct LocalResourceStore;

impl ResourceStore for LocalResourceStore {
    fn create_file(&mut self, path: &Path) -> Result<(), String> {
        match std::fs::metadata(path) {
            Ok(_) => Err("path exists".to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => std::fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(path)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn create_folder(&mut self, path: &Path) -> Result<(), String> {
        std::fs::create_dir(path).map_err(|e| e.to_string())
    }

    fn rename(&mut self, old_path: &Path, new_path: &Path) -> Result<(), String> {
        std::fs::rename(old_path, new_path).map_err(|e| e.to_string())
    }
}
