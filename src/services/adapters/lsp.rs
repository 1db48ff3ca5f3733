//! Conversion from `lsp_types` workspace edits to engine transactions.

use rustc_hash::FxHashMap;
use std::path::PathBuf;

use crate::services::ports::{
    FileEdit, Position, Range, ResourceChange, TextEdit, WorkspaceTransaction,
};

/// Flattens an LSP workspace edit (both the `changes` map and
/// `documentChanges`) into a transaction descriptor. URIs that do not name
/// file paths are skipped; delete operations are outside the transaction
/// model and ignored. Document order is sorted by path so repeated
/// conversions plan deterministically.
pub fn transaction_from_lsp(edit: lsp_types::WorkspaceEdit) -> WorkspaceTransaction {
    let mut by_path: FxHashMap<PathBuf, Vec<TextEdit>> = FxHashMap::default();
    let mut resource_changes: Vec<ResourceChange> = Vec::new();

    if let Some(changes) = edit.changes {
        for (uri, edits) in changes {
            let Ok(path) = uri.to_file_path() else {
                continue;
            };
            let out = by_path.entry(path).or_default();
            for edit in edits {
                out.push(text_edit_from_lsp(edit));
            }
        }
    }

    if let Some(doc_changes) = edit.document_changes {
        match doc_changes {
            lsp_types::DocumentChanges::Edits(edits) => {
                for doc in edits {
                    merge_text_document_edits(&mut by_path, doc);
                }
            }
            lsp_types::DocumentChanges::Operations(ops) => {
                for op in ops {
                    match op {
                        lsp_types::DocumentChangeOperation::Edit(doc) => {
                            merge_text_document_edits(&mut by_path, doc);
                        }
                        lsp_types::DocumentChangeOperation::Op(op) => match op {
                            lsp_types::ResourceOp::Create(create) => {
                                if let Ok(path) = create.uri.to_file_path() {
                                    resource_changes.push(ResourceChange::CreateFile { path });
                                }
                            }
                            lsp_types::ResourceOp::Rename(rename) => {
                                let Ok(old_path) = rename.old_uri.to_file_path() else {
                                    continue;
                                };
                                let Ok(new_path) = rename.new_uri.to_file_path() else {
                                    continue;
                                };
                                resource_changes.push(ResourceChange::Rename {
                                    old_path,
                                    new_path,
                                });
                            }
                            lsp_types::ResourceOp::Delete(delete) => {
                                tracing::debug!(uri = %delete.uri, "ignoring delete resource op");
                            }
                        },
                    }
                }
            }
        }
    }

    let mut changes: Vec<FileEdit> = by_path
        .into_iter()
        .filter_map(|(path, edits)| {
            if edits.is_empty() {
                None
            } else {
                Some(FileEdit { path, edits })
            }
        })
        .collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));

    WorkspaceTransaction {
        changes,
        resource_changes,
    }
}

fn merge_text_document_edits(
    by_path: &mut FxHashMap<PathBuf, Vec<TextEdit>>,
    doc: lsp_types::TextDocumentEdit,
) {
    let Ok(path) = doc.text_document.uri.to_file_path() else {
        return;
    };

    let out = by_path.entry(path).or_default();
    for edit in doc.edits {
        let edit = match edit {
            lsp_types::OneOf::Left(edit) => edit,
            lsp_types::OneOf::Right(edit) => edit.text_edit,
        };
        out.push(text_edit_from_lsp(edit));
    }
}

fn text_edit_from_lsp(edit: lsp_types::TextEdit) -> TextEdit {
    TextEdit {
        range: range_from_lsp(edit.range),
        new_text: edit.new_text,
    }
}

fn range_from_lsp(range: lsp_types::Range) -> Range {
    Range {
        start: Position {
            line: range.start.line,
            character: range.start.character,
        },
        end: Position {
            line: range.end.line,
            character: range.end.character,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lsp_edit(line: u32, start: u32, end: u32, text: &str) -> lsp_types::TextEdit {
        lsp_types::TextEdit {
            range: lsp_types::Range {
                start: lsp_types::Position {
                    line,
                    character: start,
                },
                end: lsp_types::Position {
                    line,
                    character: end,
                },
            },
            new_text: text.to_string(),
        }
    }

    #[test]
    fn test_changes_map_conversion() {
        let uri = lsp_types::Url::from_file_path("/ws/a.rs").unwrap();
        let mut changes = HashMap::new();
        changes.insert(uri, vec![lsp_edit(0, 0, 3, "new")]);

        let txn = transaction_from_lsp(lsp_types::WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        });

        assert_eq!(txn.changes.len(), 1);
        assert_eq!(txn.changes[0].path, PathBuf::from("/ws/a.rs"));
        assert_eq!(txn.changes[0].edits[0].new_text, "new");
        assert!(txn.resource_changes.is_empty());
    }

    #[test]
    fn test_document_change_operations() {
        let ops = vec![
            lsp_types::DocumentChangeOperation::Edit(lsp_types::TextDocumentEdit {
                text_document: lsp_types::OptionalVersionedTextDocumentIdentifier {
                    uri: lsp_types::Url::from_file_path("/ws/a.rs").unwrap(),
                    version: None,
                },
                edits: vec![lsp_types::OneOf::Left(lsp_edit(1, 0, 2, "x"))],
            }),
            lsp_types::DocumentChangeOperation::Op(lsp_types::ResourceOp::Create(
                lsp_types::CreateFile {
                    uri: lsp_types::Url::from_file_path("/ws/fresh.rs").unwrap(),
                    options: None,
                    annotation_id: None,
                },
            )),
            lsp_types::DocumentChangeOperation::Op(lsp_types::ResourceOp::Rename(
                lsp_types::RenameFile {
                    old_uri: lsp_types::Url::from_file_path("/ws/old.rs").unwrap(),
                    new_uri: lsp_types::Url::from_file_path("/ws/new.rs").unwrap(),
                    options: None,
                    annotation_id: None,
                },
            )),
            lsp_types::DocumentChangeOperation::Op(lsp_types::ResourceOp::Delete(
                lsp_types::DeleteFile {
                    uri: lsp_types::Url::from_file_path("/ws/drop.rs").unwrap(),
                    options: None,
                },
            )),
        ];

        let txn = transaction_from_lsp(lsp_types::WorkspaceEdit {
            changes: None,
            document_changes: Some(lsp_types::DocumentChanges::Operations(ops)),
            change_annotations: None,
        });

        assert_eq!(txn.changes.len(), 1);
        assert_eq!(
            txn.resource_changes,
            vec![
                ResourceChange::CreateFile {
                    path: PathBuf::from("/ws/fresh.rs")
                },
                ResourceChange::Rename {
                    old_path: PathBuf::from("/ws/old.rs"),
                    new_path: PathBuf::from("/ws/new.rs")
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_uris_merge_into_one_entry() {
        let docs = vec![
            lsp_types::TextDocumentEdit {
                text_document: lsp_types::OptionalVersionedTextDocumentIdentifier {
                    uri: lsp_types::Url::from_file_path("/ws/a.rs").unwrap(),
                    version: None,
                },
                edits: vec![lsp_types::OneOf::Left(lsp_edit(0, 0, 1, "x"))],
            },
            lsp_types::TextDocumentEdit {
                text_document: lsp_types::OptionalVersionedTextDocumentIdentifier {
                    uri: lsp_types::Url::from_file_path("/ws/a.rs").unwrap(),
                    version: None,
                },
                edits: vec![lsp_types::OneOf::Left(lsp_edit(1, 0, 1, "y"))],
            },
        ];

        let txn = transaction_from_lsp(lsp_types::WorkspaceEdit {
            changes: None,
            document_changes: Some(lsp_types::DocumentChanges::Edits(docs)),
            change_annotations: None,
        });

        assert_eq!(txn.changes.len(), 1);
        assert_eq!(txn.changes[0].edits.len(), 2);
    }
}
