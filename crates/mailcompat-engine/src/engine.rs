//! Report orchestration.
//!
//! The HTML token stream is consumed on the calling thread. Every `<style>`
//! block it yields is classified on its own scoped thread while tokenization
//! continues; all of them feed one [`Collector`]. [`Engine::report`] returns
//! only after every block task has finished.

use std::io::Read;
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

use mailcompat_common::LineIndex;
use mailcompat_html::HTMLTokenizer;

use crate::css;
use crate::error::ReportError;
use crate::html::HtmlDriver;
use crate::matcher::Matcher;
use crate::report::{Collector, LIMIT_REPORT_LINES, ParseReport};
use crate::rules::RulesDb;

/// Tunables for one [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest single HTML token, in bytes, before the tokenizer gives up.
    /// `None` for no limit.
    pub max_token_bytes: Option<usize>,
    /// Distinct lines kept per report entry.
    pub limit_report_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_token_bytes: None,
            limit_report_lines: LIMIT_REPORT_LINES,
        }
    }
}

/// Produces compatibility reports against one rules database.
///
/// An engine holds no per-document state; one instance can serve any number
/// of documents, from any number of threads.
#[derive(Debug, Clone)]
pub struct Engine {
    rules: Arc<RulesDb>,
    config: EngineConfig,
}

impl Engine {
    /// An engine with the default configuration.
    #[must_use]
    pub fn new(rules: Arc<RulesDb>) -> Self {
        Self::with_config(rules, EngineConfig::default())
    }

    /// An engine with an explicit configuration.
    #[must_use]
    pub const fn with_config(rules: Arc<RulesDb>, config: EngineConfig) -> Self {
        Self { rules, config }
    }

    /// The configuration this engine runs with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The rules database matched against.
    #[must_use]
    pub fn rules(&self) -> &RulesDb {
        &self.rules
    }

    /// Analyze one HTML document.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD before analysis.
    ///
    /// # Errors
    ///
    /// [`ReportError::Tokenize`] when a token exceeds the configured size
    /// limit, [`ReportError::TaskPanicked`] when a style block task panicked.
    /// Malformed CSS is not an error.
    pub fn report(&self, document: &[u8]) -> Result<ParseReport, ReportError> {
        let text = String::from_utf8_lossy(document);
        let index = LineIndex::new(text.as_bytes());
        let collector = Collector::new(self.config.limit_report_lines);
        let matcher = Matcher::new(&self.rules, &collector);

        let style_blocks = thread::scope(|scope| {
            let mut driver = HtmlDriver::new(matcher, index.cursor());
            let mut tasks: Vec<ScopedJoinHandle<'_, ()>> = Vec::new();

            let mut tokenizer = HTMLTokenizer::new(&text);
            if let Some(limit) = self.config.max_token_bytes {
                tokenizer = tokenizer.with_max_buffer(limit);
            }

            let tokenized = tokenizer.try_for_each(|token| {
                if let Some(block) = driver.process(token?) {
                    log::debug!(
                        "classifying style block at line {} ({} bytes)",
                        block.start_line,
                        block.css.len()
                    );
                    tasks.push(scope.spawn(move || {
                        css::classify_stylesheet(matcher, &block.css, block.start_line);
                    }));
                }
                Ok::<_, ReportError>(())
            });

            let spawned = tasks.len();
            let panicked = tasks
                .into_iter()
                .map(ScopedJoinHandle::join)
                .filter(Result::is_err)
                .count();

            tokenized?;
            if panicked > 0 {
                return Err(ReportError::TaskPanicked { count: panicked });
            }
            Ok(spawned)
        })?;

        let report = collector.into_report();
        log::debug!(
            "report finished: {} bytes, {style_blocks} style block(s), {} entries",
            document.len(),
            report.entries().count()
        );
        Ok(report)
    }

    /// Read a whole document from `reader` and analyze it.
    ///
    /// # Errors
    ///
    /// [`ReportError::Io`] when reading fails, otherwise as [`Engine::report`].
    pub fn report_from_reader(&self, mut reader: impl Read) -> Result<ParseReport, ReportError> {
        let mut document = Vec::new();
        let _ = reader.read_to_end(&mut document)?;
        self.report(&document)
    }
}

/// Analyze `document` against the bundled rules database.
///
/// # Errors
///
/// [`ReportError::Rules`] if the bundled database fails to load, otherwise
/// as [`Engine::report`].
pub fn report(document: &[u8]) -> Result<ParseReport, ReportError> {
    Engine::new(RulesDb::shared_bundled()?).report(document)
}
