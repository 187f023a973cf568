//! Analyzer notices with colored terminal output.
//!
//! Provides deduplication so a document with hundreds of identical problems
//! produces one line per distinct notice. Used by the CLI to surface
//! recoverable conditions (skipped stylesheets, lossy input decoding).

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Notices already printed in this process.
static WARNED: Mutex<BTreeSet<String>> = Mutex::new(BTreeSet::new());

/// Print a notice for `component` once per unique message.
///
/// Returns `true` when the notice was printed, `false` when it was a repeat.
///
/// # Example
/// ```ignore
/// warn_once("CSS", "style block 2 ended with an unterminated rule");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    if !remember(component, message) {
        return false;
    }
    eprintln!(
        "{}",
        format!("[mailcompat {component}] ⚠ {message}").yellow()
    );
    true
}

fn remember(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(format!("[{component}] {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_notice_is_suppressed() {
        assert!(remember("test-dedup", "first"));
        assert!(!remember("test-dedup", "first"));
        assert!(remember("test-dedup", "second"));
    }
}
