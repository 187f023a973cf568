use thiserror::Error;

use crate::tokenizer::TokenKind;

/// A grammar error.
///
/// Only [`GrammarError::EndOfInput`] reaches the event stream. The others
/// describe a malformed construct that the parser logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The input was fully consumed.
    #[error("end of input")]
    EndOfInput,

    /// A token that cannot start or continue the current construct.
    #[error("unexpected {found} at byte {offset}")]
    UnexpectedToken {
        /// Byte offset of the offending token.
        offset: usize,
        /// Its type.
        found: TokenKind,
    },

    /// A declaration name not followed by a colon.
    #[error("expected ':' after property name at byte {offset}")]
    MissingColon {
        /// Byte offset of the property name.
        offset: usize,
    },
}

impl GrammarError {
    /// True when parsing stopped because the input ran out rather than
    /// because it was malformed.
    #[must_use]
    pub const fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }
}
