use crate::image;
use crate::report::{Bucket, Collector};
use crate::rules::RulesDb;

/// Looks candidate features up in the rules database and records the hits.
///
/// Shared by reference between the HTML driver and the style block tasks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Matcher<'a> {
    rules: &'a RulesDb,
    collector: &'a Collector,
}

impl<'a> Matcher<'a> {
    pub(crate) const fn new(rules: &'a RulesDb, collector: &'a Collector) -> Self {
        Self { rules, collector }
    }

    /// Record `line` for `bucket` when the database tracks it.
    pub(crate) fn check(&self, bucket: Bucket<'_>, line: usize) -> bool {
        let Some(rules) = self.rules.lookup(&bucket) else {
            return false;
        };
        log::trace!("{} match {bucket:?} at line {line}", bucket.category());
        self.collector.record(&bucket, line, rules);
        true
    }

    /// Classify an image reference (a CSS `url(...)` token or an attribute
    /// value) by its format.
    pub(crate) fn check_image(&self, url: &str, line: usize) {
        if let Some(format) = image::image_format(url) {
            let _ = self.check(Bucket::ImgFormat(&format), line);
        }
    }
}
