//! Email client compatibility analysis.
//!
//! Given the bytes of an HTML email, produce a [`ParseReport`] listing every
//! HTML and CSS feature that a [`RulesDb`] tracks, each with the lines where
//! it occurs. The report is what a front end needs to tell which email
//! clients will not render the message as written.
//!
//! # Example
//!
//! ```
//! let report = mailcompat_engine::report(b"<!DOCTYPE html>\n<video src=\"a.webm\"></video>")?;
//! assert!(report.html5_doctype.is_some());
//! # Ok::<(), mailcompat_engine::ReportError>(())
//! ```

pub mod css;
pub mod engine;
pub mod error;
mod html;
mod image;
mod matcher;
pub mod report;
pub mod rules;

pub use css::SelectorKind;
pub use engine::{Engine, EngineConfig, report};
pub use error::{ReportError, RulesError};
pub use report::{
    Bucket, Category, Collector, LIMIT_REPORT_LINES, ParseReport, ReportContainer, ReportEntry,
};
pub use rules::{RuleInfo, RulesDb};
