use thiserror::Error;

/// Errors that stop tokenization.
///
/// Malformed markup is never an error; the tokenizer recovers the way
/// browsers do. Only resource limits abort the token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// A single token needed more buffer than the configured maximum.
    #[error("token at byte {offset} exceeds the {limit}-byte buffer limit")]
    BufferExceeded {
        /// Byte offset where the oversized token starts.
        offset: usize,
        /// The configured limit.
        limit: usize,
    },
}
