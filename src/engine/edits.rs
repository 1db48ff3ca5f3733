//! Rope-level edit application shared by the editor and disk paths.
//!
//! Applies a sorted, non-overlapping edit list in reverse range order and
//! returns the inverse list, expressed in the post-apply document, that
//! restores the original content exactly.

use ropey::Rope;

use crate::services::ports::{EditErrorKind, Position, PositionEncoding, Range, TextEdit};

fn encoded_width(ch: char, encoding: PositionEncoding) -> u32 {
    match encoding {
        PositionEncoding::Utf8 => ch.len_utf8() as u32,
        PositionEncoding::Utf16 => ch.len_utf16() as u32,
        PositionEncoding::Utf32 => 1,
    }
}

/// Resolves a position to a char offset, rejecting positions outside the
/// document. A column landing inside a multi-unit character resolves to that
/// character's start.
pub fn position_to_char(
    rope: &Rope,
    pos: Position,
    encoding: PositionEncoding,
) -> Result<usize, EditErrorKind> {
    let line = pos.line as usize;
    let lines = rope.len_lines();
    if line >= lines {
        return Err(EditErrorKind::LineOutOfBounds {
            line: pos.line,
            lines,
        });
    }

    let slice = rope.line(line);
    let mut units = 0u32;
    let mut chars = 0usize;
    let mut it = slice.chars().peekable();
    while units < pos.character {
        let Some(ch) = it.next() else {
            return Err(EditErrorKind::ColumnOutOfBounds {
                line: pos.line,
                character: pos.character,
            });
        };
        if ch == '\n' || (ch == '\r' && matches!(it.peek(), Some('\n'))) {
            return Err(EditErrorKind::ColumnOutOfBounds {
                line: pos.line,
                character: pos.character,
            });
        }
        let step = encoded_width(ch, encoding);
        if units + step > pos.character {
            break;
        }
        units += step;
        chars += 1;
    }

    Ok(rope.line_to_char(line) + chars)
}

pub fn char_to_position(rope: &Rope, char_offset: usize, encoding: PositionEncoding) -> Position {
    let char_offset = char_offset.min(rope.len_chars());
    let line = rope.char_to_line(char_offset);
    let line_start = rope.line_to_char(line);
    let col_chars = char_offset - line_start;
    let character = rope
        .line(line)
        .chars()
        .take(col_chars)
        .map(|ch| encoded_width(ch, encoding))
        .sum();

    Position {
        line: line as u32,
        character,
    }
}

/// Applies `edits` (sorted ascending by range, pairwise non-overlapping) to
/// `rope` and returns the inverse edits, ascending, in the post-apply
/// coordinate space. Feeding the result back through this routine restores
/// the original content byte-for-byte.
///
/// Every range is resolved against the pre-apply snapshot before anything
/// mutates, so a range error leaves the document untouched. The error carries
/// the index of the offending edit.
pub fn apply_edits(
    rope: &mut Rope,
    edits: &[TextEdit],
    encoding: PositionEncoding,
) -> Result<Vec<TextEdit>, (usize, EditErrorKind)> {
    if edits.is_empty() {
        return Ok(Vec::new());
    }

    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(edits.len());
    for (index, edit) in edits.iter().enumerate() {
        let start =
            position_to_char(rope, edit.range.start, encoding).map_err(|kind| (index, kind))?;
        let end = position_to_char(rope, edit.range.end, encoding).map_err(|kind| (index, kind))?;
        if end < start {
            return Err((index, EditErrorKind::InvertedRange { range: edit.range }));
        }
        spans.push((start, end));
    }

    // Reverse walk: edits near the end of the document apply first, so the
    // spans still pending keep their offsets.
    let mut replaced: Vec<String> = vec![String::new(); edits.len()];
    for index in (0..edits.len()).rev() {
        let (start, end) = spans[index];
        replaced[index] = rope.slice(start..end).to_string();
        if start < end {
            rope.remove(start..end);
        }
        if !edits[index].new_text.is_empty() {
            rope.insert(start, &edits[index].new_text);
        }
    }

    // Inverse edits live in the post-apply coordinate space, ascending, so
    // they form a valid plan for this same routine.
    let mut inverse = Vec::with_capacity(edits.len());
    let mut delta: isize = 0;
    for (index, (start, end)) in spans.iter().copied().enumerate() {
        let inserted_chars = edits[index].new_text.chars().count();
        let shifted = (start as isize + delta) as usize;
        inverse.push(TextEdit {
            range: Range {
                start: char_to_position(rope, shifted, encoding),
                end: char_to_position(rope, shifted + inserted_chars, encoding),
            },
            new_text: std::mem::take(&mut replaced[index]),
        });
        delta += inserted_chars as isize - (end - start) as isize;
    }

    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(sl: u32, sc: u32, el: u32, ec: u32, text: &str) -> TextEdit {
        TextEdit {
            range: Range {
                start: Position {
                    line: sl,
                    character: sc,
                },
                end: Position {
                    line: el,
                    character: ec,
                },
            },
            new_text: text.to_string(),
        }
    }

    #[test]
    fn test_applies_in_reverse_range_order() {
        let mut rope = Rope::from_str("fn main() {}\nfn helper() {}\n");
        let edits = vec![edit(0, 3, 0, 7, "start"), edit(1, 3, 1, 9, "assist")];
        apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "fn start() {}\nfn assist() {}\n");
    }

    #[test]
    fn test_inverse_restores_original() {
        let original = "alpha beta gamma\ndelta epsilon\n";
        let mut rope = Rope::from_str(original);
        let edits = vec![
            edit(0, 0, 0, 5, "A"),
            edit(0, 6, 0, 10, "B-very-long"),
            edit(1, 0, 1, 5, ""),
        ];

        let inverse = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "A B-very-long gamma\n epsilon\n");

        apply_edits(&mut rope, &inverse, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), original);
    }

    #[test]
    fn test_insert_only_round_trip() {
        let original = "one\ntwo\n";
        let mut rope = Rope::from_str(original);
        let edits = vec![edit(0, 3, 0, 3, " and a half"), edit(1, 0, 1, 0, ">> ")];

        let inverse = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "one and a half\n>> two\n");

        apply_edits(&mut rope, &inverse, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), original);
    }

    #[test]
    fn test_touching_inserts_keep_list_order() {
        let mut rope = Rope::from_str("ab");
        let edits = vec![edit(0, 1, 0, 1, "X"), edit(0, 1, 0, 1, "Y")];
        apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "aXYb");
    }

    #[test]
    fn test_utf16_column_arithmetic() {
        let original = "let 🦀 = crab;\n";
        let mut rope = Rope::from_str(original);
        // "let " is 4 UTF-16 units, the crab is 2, " = " is 3.
        let edits = vec![edit(0, 9, 0, 13, "ferris")];

        let inverse = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "let 🦀 = ferris;\n");
        assert_eq!(inverse[0].range.start.character, 9);
        assert_eq!(inverse[0].range.end.character, 15);
        assert_eq!(inverse[0].new_text, "crab");

        apply_edits(&mut rope, &inverse, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), original);
    }

    #[test]
    fn test_line_out_of_bounds() {
        let mut rope = Rope::from_str("short");
        let edits = vec![edit(1, 0, 1, 3, "X")];
        let (index, kind) = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap_err();
        assert_eq!(index, 0);
        assert!(matches!(kind, EditErrorKind::LineOutOfBounds { line: 1, .. }));
    }

    #[test]
    fn test_column_out_of_bounds() {
        let mut rope = Rope::from_str("ab\ncd\n");
        let edits = vec![edit(0, 0, 0, 5, "X")];
        let (index, kind) = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap_err();
        assert_eq!(index, 0);
        assert!(matches!(
            kind,
            EditErrorKind::ColumnOutOfBounds { character: 5, .. }
        ));
    }

    #[test]
    fn test_no_mutation_when_any_range_invalid() {
        let original = "ab\ncd\n";
        let mut rope = Rope::from_str(original);
        let edits = vec![edit(0, 0, 0, 1, "X"), edit(9, 0, 9, 1, "Y")];
        let (index, _) = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap_err();
        assert_eq!(index, 1);
        assert_eq!(rope.to_string(), original);
    }

    #[test]
    fn test_end_of_line_position_is_addressable() {
        let mut rope = Rope::from_str("ab\n");
        let edits = vec![edit(0, 2, 0, 2, "!")];
        apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "ab!\n");
    }

    #[test]
    fn test_empty_document() {
        let mut rope = Rope::from_str("");
        let edits = vec![edit(0, 0, 0, 0, "hello")];
        let inverse = apply_edits(&mut rope, &edits, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "hello");

        apply_edits(&mut rope, &inverse, PositionEncoding::Utf16).unwrap();
        assert_eq!(rope.to_string(), "");
    }
}
