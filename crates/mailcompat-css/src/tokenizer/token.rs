//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: `<ident-token>`, `<function-token>`, `<at-keyword-token>`,
//! `<hash-token>`, `<string-token>`, `<bad-string-token>`, `<url-token>`,
//! `<bad-url-token>`, `<delim-token>`, `<number-token>`, `<percentage-token>`,
//! `<dimension-token>`, `<whitespace-token>`, `<CDO-token>`, `<CDC-token>`,
//! `<colon-token>`, `<semicolon-token>`, `<comma-token>`, `<[-token>`,
//! `<]-token>`, `<(-token>`, `<)-token>`, `<{-token>`, and `<}-token>`."
//!
//! Tokens here do not carry decoded values. Each one keeps the exact source
//! text it was read from, so a `<function-token>` reads `rgb(`, a
//! `<dimension-token>` reads `10px` and a `<url-token>` reads `url(a.png)`.

use std::fmt;

use strum_macros::Display;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// The token types of CSS Syntax Level 3, plus `CustomPropertyName` for
/// identifiers starting with `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenKind {
    /// "`<ident-token>`"
    Ident,
    /// An `<ident-token>` whose value starts with two hyphens, e.g. `--brand`.
    CustomPropertyName,
    /// "`<function-token>`", text includes the trailing `(`.
    Function,
    /// "`<at-keyword-token>`", text includes the leading `@`.
    AtKeyword,
    /// "`<hash-token>`", text includes the leading `#`.
    Hash,
    /// "`<string-token>`", text includes the quotes.
    String,
    /// "`<bad-string-token>`"
    BadString,
    /// "`<url-token>`", text is the whole `url(...)` including the parentheses.
    /// A quoted argument (`url('a.png')`) also produces a single url token.
    Url,
    /// "`<bad-url-token>`"
    BadUrl,
    /// "`<delim-token>`"
    Delim,
    /// "`<number-token>`"
    Number,
    /// "`<percentage-token>`"
    Percentage,
    /// "`<dimension-token>`"
    Dimension,
    /// "`<whitespace-token>`"
    Whitespace,
    /// "`<CDO-token>`" (`<!--`)
    CDO,
    /// "`<CDC-token>`" (`-->`)
    CDC,
    /// "`<colon-token>`"
    Colon,
    /// "`<semicolon-token>`"
    Semicolon,
    /// "`<comma-token>`"
    Comma,
    /// "`<[-token>`"
    LeftBracket,
    /// "`<]-token>`"
    RightBracket,
    /// "`<(-token>`"
    LeftParen,
    /// "`<)-token>`"
    RightParen,
    /// "`<{-token>`"
    LeftBrace,
    /// "`<}-token>`"
    RightBrace,
}

/// A token and the slice of source it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CSSToken<'a> {
    /// Token type.
    pub kind: TokenKind,
    /// Source text of the token.
    pub text: &'a str,
    /// Byte offset of the token in the tokenizer input.
    pub offset: usize,
}

impl<'a> CSSToken<'a> {
    /// Create a token.
    #[must_use]
    pub const fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    /// Byte offset just past the token.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// True for a `<delim-token>` with value `c`.
    #[must_use]
    pub fn is_delim(&self, c: char) -> bool {
        self.kind == TokenKind::Delim && self.text.starts_with(c)
    }

    /// True for a `<whitespace-token>`.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Whether this token opens a nested `(` or `[` group.
    #[must_use]
    pub const fn opens_group(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Function | TokenKind::LeftParen | TokenKind::LeftBracket
        )
    }

    /// Whether this token closes a `(` or `[` group.
    #[must_use]
    pub const fn closes_group(&self) -> bool {
        matches!(self.kind, TokenKind::RightParen | TokenKind::RightBracket)
    }
}

impl fmt::Display for CSSToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}
