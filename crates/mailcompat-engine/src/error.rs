//! Error types.

use std::io;

use mailcompat_html::TokenizeError;
use thiserror::Error;

/// Failure to load a rules database.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("malformed rules database: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The database file could not be read.
    #[error("failed to read rules database: {0}")]
    Io(#[from] io::Error),

    /// The database compiled into the crate failed to load.
    #[error("bundled rules database is unusable: {0}")]
    Bundled(String),
}

/// Failure to produce a compatibility report.
///
/// Malformed CSS is never an error: the malformed rule or declaration is
/// skipped and the rest of the document is still analyzed.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The HTML tokenizer gave up on the document.
    #[error("tokenizer error: {0}")]
    Tokenize(#[from] TokenizeError),

    /// Reading the document failed.
    #[error("failed to read document: {0}")]
    Io(#[from] io::Error),

    /// The rules database could not be loaded.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// One or more style block classification tasks panicked.
    #[error("{count} style block task(s) panicked")]
    TaskPanicked {
        /// Number of tasks that did not complete.
        count: usize,
    },
}
