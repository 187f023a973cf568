//! Input scanning helpers for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! The tokenizer works on the UTF-8 bytes of its input. Every delimiter it
//! looks for is ASCII, so any position it stops at is also a character
//! boundary and slicing the input there is always valid.

use super::core::HTMLTokenizer;

impl HTMLTokenizer<'_> {
    /// The unconsumed part of the input.
    pub(super) fn rest(&self) -> &str {
        &self.input[self.current_pos..]
    }

    /// Peek at the byte `offset` bytes past the current position.
    pub(super) fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.current_pos + offset).copied()
    }

    /// "If the next few characters are..."
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        self.rest().as_bytes().starts_with(target.as_bytes())
    }

    /// "If the next few characters are an ASCII case-insensitive match for..."
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.rest()
            .as_bytes()
            .get(..target.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(target.as_bytes()))
    }

    /// Byte offset of the next occurrence of `needle` at or after `from`.
    pub(super) fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.input
            .get(from..)
            .and_then(|haystack| haystack.find(needle))
            .map(|i| from + i)
    }

    /// Advance past one character, whatever its encoded width.
    pub(super) fn advance_char(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.current_pos += c.len_utf8();
        }
    }

    /// Advance while `pred` holds for the next byte; returns the consumed slice.
    pub(super) fn consume_while(&mut self, pred: impl Fn(u8) -> bool) -> &str {
        let start = self.current_pos;
        let bytes = self.input.as_bytes();
        while self.current_pos < bytes.len() && pred(bytes[self.current_pos]) {
            self.current_pos += 1;
        }
        &self.input[start..self.current_pos]
    }

    /// Skip "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
    /// U+0020 SPACE" (and carriage returns, which preprocessing would have
    /// normalized away).
    pub(super) fn skip_whitespace(&mut self) {
        let _ = self.consume_while(is_whitespace_byte);
    }

    /// Jump to the end of input.
    pub(super) fn consume_rest(&mut self) -> &str {
        let start = self.current_pos;
        self.current_pos = self.input.len();
        &self.input[start..]
    }
}

/// ASCII whitespace as the tokenizer sees it.
pub(super) const fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// Bytes that end a tag or attribute name.
pub(super) const fn is_name_terminator(b: u8) -> bool {
    is_whitespace_byte(b) || b == b'/' || b == b'>'
}
