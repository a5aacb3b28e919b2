use super::*;

#[test]
fn finds_word_around_index() {
    let text = "hello brave world";
    assert_eq!(word_boundary(text, 0), 0..5);
    assert_eq!(word_boundary(text, 3), 0..5);
    assert_eq!(word_boundary(text, 8), 6..11);
}

#[test]
fn whitespace_runs_form_their_own_segment() {
    assert_eq!(word_boundary("ab   cd", 3), 2..5);
}

#[test]
fn punctuation_and_newlines_are_single_char_segments() {
    assert_eq!(word_boundary("a,,b", 1), 1..2);
    assert_eq!(word_boundary("a\nb", 1), 1..2);
}

#[test]
fn end_of_text_is_empty() {
    assert_eq!(word_boundary("abc", 3), 3..3);
    assert_eq!(word_boundary("", 0), 0..0);
}

#[test]
fn multibyte_chars_use_char_indices() {
    let text = "héllo wörld";
    assert_eq!(word_boundary(text, 7), 6..11);
    assert_eq!(byte_offset(text, 2), 3);
    assert_eq!(char_index(text, 3), 2);
    assert_eq!(byte_offset(text, 99), text.len());
}
