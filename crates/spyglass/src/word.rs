//
// word.rs
//
// Identifier extraction at a cursor position
//

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Convert a UTF-16 column offset to a char offset within one line
fn utf16_offset_to_char_offset(line_text: &str, utf16_offset: usize) -> usize {
    let mut utf16_count = 0;
    let mut char_count = 0;

    for ch in line_text.chars() {
        if utf16_count >= utf16_offset {
            return char_count;
        }
        utf16_count += ch.len_utf16();
        char_count += 1;
    }
    char_count
}

/// Convert a char offset back to a UTF-16 column offset within one line
fn char_offset_to_utf16_offset(line_text: &str, char_offset: usize) -> usize {
    line_text
        .chars()
        .take(char_offset)
        .map(|c| c.len_utf16())
        .sum()
}

/// Range of the identifier under the cursor, in UTF-16 columns.
/// Returns None when the position is out of bounds or not on a word.
pub fn word_range_at(contents: &Rope, position: Position) -> Option<Range> {
    let line_idx = position.line as usize;
    if line_idx >= contents.len_lines() {
        return None;
    }
    let line_text = contents.line(line_idx).to_string();
    let line_text = line_text.trim_end_matches(['\n', '\r']);

    let chars: Vec<char> = line_text.chars().collect();
    let cursor = utf16_offset_to_char_offset(line_text, position.character as usize);

    // The cursor counts as "on" a word when it sits inside one or
    // immediately after its last character.
    let anchor = if cursor < chars.len() && is_word_char(chars[cursor]) {
        cursor
    } else if cursor > 0 && cursor <= chars.len() && is_word_char(chars[cursor - 1]) {
        cursor - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    Some(Range {
        start: Position {
            line: position.line,
            character: char_offset_to_utf16_offset(line_text, start) as u32,
        },
        end: Position {
            line: position.line,
            character: char_offset_to_utf16_offset(line_text, end) as u32,
        },
    })
}

/// Text of the identifier under the cursor
pub fn word_at(contents: &Rope, position: Position) -> Option<String> {
    let range = word_range_at(contents, position)?;
    let line_text = contents.line(position.line as usize).to_string();
    let start = utf16_offset_to_char_offset(&line_text, range.start.character as usize);
    let end = utf16_offset_to_char_offset(&line_text, range.end.character as usize);
    Some(line_text.chars().skip(start).take(end - start).collect())
}

/// Text at an arbitrary single-line range, used for candidate titles
pub fn text_at_range(contents: &Rope, range: Range) -> Option<String> {
    let line_idx = range.start.line as usize;
    if line_idx >= contents.len_lines() || range.start.line != range.end.line {
        return None;
    }
    let line_text = contents.line(line_idx).to_string();
    let start = utf16_offset_to_char_offset(&line_text, range.start.character as usize);
    let end = utf16_offset_to_char_offset(&line_text, range.end.character as usize);
    if start >= end {
        return None;
    }
    let text: String = line_text.chars().skip(start).take(end - start).collect();
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
