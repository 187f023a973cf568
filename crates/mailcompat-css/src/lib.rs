//! CSS tokenizer and grammar event parser for the mailcompat analyzer.
//!
//! # Scope
//!
//! - Tokenization per [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization),
//!   keeping each token's source text and byte offset
//! - A pull parser reporting rulesets, at-rules and declarations as
//!   [`GrammarEvent`]s, for stylesheets and for `style` attribute values
//!
//! # Not Implemented
//!
//! - Value parsing, cascade and selector matching
//! - Error reporting: malformed constructs are skipped, only logged

/// Grammar event parser.
pub mod parser;
/// CSS tokenizer.
pub mod tokenizer;

pub use parser::{GrammarError, GrammarEvent, GrammarParser};
pub use tokenizer::{CSSToken, CSSTokenizer, TokenKind};
