//! HTML tokenizer for the mailcompat analyzer.
//!
//! # Scope
//!
//! This crate implements a streaming tokenizer loosely following
//! [WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
//! - Data, RAWTEXT and PLAINTEXT content
//! - Start, end and self-closing tags with attributes
//! - Comments, bogus comments and DOCTYPE tokens
//! - Character references inside attribute values
//!
//! Every token carries the byte offset of its first byte so callers can map
//! tokens back to source lines.
//!
//! # Not Implemented
//!
//! - Tree construction
//! - CDATA sections (tokenized as bogus comments)
//! - Character references in text content

/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use tokenizer::{Attribute, HTMLTokenizer, Spanned, Token, TokenizeError, TokenizerState};
