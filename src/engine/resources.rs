//! Post-commit resource operations (create, rename/move).

use std::path::{Path, PathBuf};

use crate::services::ports::{EditorAccess, NotificationSink, ResourceChange, ResourceStore};

#[derive(Debug, Clone)]
pub struct ResourceOperationError {
    pub change: ResourceChange,
    pub message: String,
}

impl std::fmt::Display for ResourceOperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.change {
            ResourceChange::CreateFile { path } => {
                write!(f, "create {} failed: {}", path.display(), self.message)
            }
            ResourceChange::Rename { old_path, new_path } => write!(
                f,
                "rename {} -> {} failed: {}",
                old_path.display(),
                new_path.display(),
                self.message
            ),
        }
    }
}

impl std::error::Error for ResourceOperationError {}

/// Runs only after the entire edit phase has committed; there is nothing to
/// compensate, so failures are reported per change and siblings still run.
pub struct ResourceChangeApplier<'a> {
    store: &'a mut dyn ResourceStore,
    editor: &'a mut dyn EditorAccess,
    sink: &'a mut dyn NotificationSink,
}

impl<'a> ResourceChangeApplier<'a> {
    pub fn new(
        store: &'a mut dyn ResourceStore,
        editor: &'a mut dyn EditorAccess,
        sink: &'a mut dyn NotificationSink,
    ) -> Self {
        Self {
            store,
            editor,
            sink,
        }
    }

    pub fn apply(&mut self, changes: &[ResourceChange]) -> Vec<ResourceOperationError> {
        let mut failures = Vec::new();
        for change in changes {
            let result = match change {
                ResourceChange::CreateFile { path } => self.create(path),
                ResourceChange::Rename { old_path, new_path } => self.rename(old_path, new_path),
            };
            if let Err(message) = result {
                tracing::warn!(%message, "resource change failed");
                failures.push(ResourceOperationError {
                    change: change.clone(),
                    message,
                });
            }
        }
        failures
    }

    fn create(&mut self, path: &Path) -> Result<(), String> {
        self.sink
            .progress(&format!("creating {}", path.display()));
        // A path without an extension names a folder, the workspace-service
        // convention for create operations.
        if path.extension().is_none() {
            self.store.create_folder(path)
        } else {
            self.store.create_file(path)
        }
    }

    fn rename(&mut self, old_path: &Path, new_path: &Path) -> Result<(), String> {
        self.sink.progress(&format!(
            "renaming {} to {}",
            old_path.display(),
            new_path.display()
        ));

        // Pending user edits must survive the move.
        self.editor
            .save_all()
            .map_err(|e| format!("cannot save open editors: {e}"))?;

        // Renaming a container closes every descendant editor; each closed
        // editor reopens at its prefix-remapped path once the move lands.
        let closed = self.editor.close_editors_under(old_path);
        self.store.rename(old_path, new_path)?;
        for path in closed {
            self.editor.reopen_editor(&remap_path(&path, old_path, new_path));
        }
        Ok(())
    }
}

fn remap_path(path: &Path, old_prefix: &Path, new_prefix: &Path) -> PathBuf {
    match path.strip_prefix(old_prefix) {
        Ok(rest) if rest.as_os_str().is_empty() => new_prefix.to_path_buf(),
        Ok(rest) => new_prefix.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
