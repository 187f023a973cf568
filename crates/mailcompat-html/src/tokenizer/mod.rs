//! HTML tokenizer module.
//!
//! Implements a byte-offset-preserving subset of
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization).

/// Character reference decoding per § 13.2.5.72.
pub mod character_reference;
/// HTML tokenizer state machine implementation.
pub mod core;
/// Tokenizer errors.
pub mod error;
/// Input scanning helpers used by the state machine.
pub mod helpers;
/// Named character reference table per § 13.2.5.73.
pub mod named_character_references;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HTMLTokenizer, TokenizerState};
pub use error::TokenizeError;
pub use token::{Attribute, Spanned, Token};
