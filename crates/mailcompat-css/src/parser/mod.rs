//! CSS grammar parser module.

/// Parser errors.
pub mod error;
/// Grammar event parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod grammar;

pub use error::GrammarError;
pub use grammar::{GrammarEvent, GrammarParser};
