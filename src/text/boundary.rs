use std::ops::Range;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Newline,
    Other,
}

fn classify(c: char) -> CharClass {
    if c == '\n' {
        CharClass::Newline
    } else if c.is_whitespace() {
        CharClass::Space
    } else if c.is_alphanumeric() || c == '_' || c == '\'' {
        CharClass::Word
    } else {
        CharClass::Other
    }
}

/// Char range of the word, whitespace run or punctuation mark containing `index`.
///
/// An index at or past the end yields an empty range at the end of the text.
pub fn word_boundary(text: &str, index: usize) -> Range<usize> {
    let chars: Vec<char> = text.chars().collect();
    if index >= chars.len() {
        return chars.len()..chars.len();
    }
    let class = classify(chars[index]);
    if matches!(class, CharClass::Other | CharClass::Newline) {
        return index..index + 1;
    }

    let mut start = index;
    while start > 0 && classify(chars[start - 1]) == class {
        start -= 1;
    }
    let mut end = index + 1;
    while end < chars.len() && classify(chars[end]) == class {
        end += 1;
    }
    start..end
}

/// Byte offset of the char at `index`, or the text length past the end.
pub fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Char index of the char starting at byte `offset`.
pub fn char_index(text: &str, offset: usize) -> usize {
    text.char_indices().take_while(|(b, _)| *b < offset).count()
}

#[cfg(test)]
#[path = "../../tests/unit/text/boundary.rs"]
mod tests;
