//! Property tests for the line index.

use mailcompat_common::LineIndex;
use quickcheck_macros::quickcheck;

fn newlines_before(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
}

#[quickcheck]
fn line_of_counts_preceding_newlines(text: String, offset: usize) -> bool {
    let index = LineIndex::new(&text);
    let offset = offset % (text.len() + 4);
    index.line_of(offset) == newlines_before(&text, offset) + 1
}

#[quickcheck]
fn cursor_agrees_with_binary_search(text: String, offsets: Vec<usize>) -> bool {
    let index = LineIndex::new(&text);
    let mut offsets: Vec<usize> = offsets
        .into_iter()
        .map(|o| o % (text.len() + 4))
        .collect();
    offsets.sort_unstable();

    let mut cursor = index.cursor();
    offsets
        .iter()
        .all(|&offset| cursor.line_at(offset) == index.line_of(offset))
}

#[test]
fn test_crlf_counts_line_feeds_only() {
    let index = LineIndex::new("a\r\nb\r\nc");
    assert_eq!(index.line_count(), 3);
    assert_eq!(index.line_of(0), 1);
    assert_eq!(index.line_of(3), 2);
    assert_eq!(index.line_of(6), 3);
}
