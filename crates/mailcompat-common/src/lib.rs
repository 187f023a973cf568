//! Common utilities for the mailcompat analyzer.
//!
//! This crate provides shared infrastructure used by all analyzer components:
//! - **Position Index** - byte offset to line number mapping
//! - **Warning System** - colored, deduplicated terminal notices

pub mod lines;
pub mod warning;

pub use lines::{LineCursor, LineIndex};
