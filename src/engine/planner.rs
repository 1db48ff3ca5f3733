//! Builds per-document edit plans from a flat transaction.

use rustc_hash::FxHashMap;
use std::path::PathBuf;

use crate::services::ports::{EditorAccess, FileEdit, Range, TextEdit};

/// The per-document, apply-ordered edit list. Immutable once built.
#[derive(Debug, Clone)]
pub struct DocumentEditPlan {
    pub path: PathBuf,
    pub edits: Vec<TextEdit>,
    pub owner_is_open: bool,
}

#[derive(Debug, Clone)]
pub enum ConflictError {
    Overlap {
        path: PathBuf,
        first: Range,
        second: Range,
    },
    InvertedRange {
        path: PathBuf,
        range: Range,
    },
}

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictError::Overlap {
                path,
                first,
                second,
            } => write!(
                f,
                "overlapping edits in {}: {} and {}",
                path.display(),
                first,
                second
            ),
            ConflictError::InvertedRange { path, range } => {
                write!(f, "inverted range {} in {}", range, path.display())
            }
        }
    }
}

impl std::error::Error for ConflictError {}

/// Groups the submitted edit set by document, merges duplicate entries,
/// sorts each list into apply order and records whether the document is
/// currently open. Overlapping or inverted ranges fail the whole set before
/// anything is applied.
///
/// Plan order follows the first appearance of each document in the
/// submission, so processing is deterministic.
pub fn build_plans(
    changes: &[FileEdit],
    editor: &dyn EditorAccess,
) -> Result<Vec<DocumentEditPlan>, ConflictError> {
    let mut order: Vec<PathBuf> = Vec::new();
    let mut by_path: FxHashMap<PathBuf, Vec<TextEdit>> = FxHashMap::default();
    for file_edit in changes {
        if file_edit.edits.is_empty() {
            continue;
        }
        if !by_path.contains_key(&file_edit.path) {
            order.push(file_edit.path.clone());
        }
        by_path
            .entry(file_edit.path.clone())
            .or_default()
            .extend(file_edit.edits.iter().cloned());
    }

    let mut plans = Vec::with_capacity(order.len());
    for path in order {
        let Some(mut edits) = by_path.remove(&path) else {
            continue;
        };

        for edit in &edits {
            if edit.range.end < edit.range.start {
                return Err(ConflictError::InvertedRange {
                    path,
                    range: edit.range,
                });
            }
        }

        edits.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then_with(|| a.range.end.cmp(&b.range.end))
        });

        for pair in edits.windows(2) {
            if pair[0].range.end > pair[1].range.start {
                return Err(ConflictError::Overlap {
                    path,
                    first: pair[0].range,
                    second: pair[1].range,
                });
            }
        }

        plans.push(DocumentEditPlan {
            owner_is_open: editor.is_open(&path),
            path,
            edits,
        });
    }

    Ok(plans)
}
