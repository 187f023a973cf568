//! Report data model and the shared collector.
//!
//! A [`ParseReport`] groups every feature found in a document by category.
//! Each entry is a [`ReportContainer`]: the rule info copied from the rules
//! database plus the set of lines where the feature occurs, capped at a
//! configurable number of lines.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::css::SelectorKind;
use crate::rules::RuleInfo;

/// Default cap on the number of distinct lines kept per report entry.
pub const LIMIT_REPORT_LINES: usize = 50;

/// Report categories, named as they appear in the serialized report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// `html_tags`: tag name, then attribute or `name||value`.
    HtmlTags,
    /// `html_attributes`: attribute name, then value.
    HtmlAttributes,
    /// `css_properties`: property, then value.
    CssProperties,
    /// `at_rule_css_statements`: at-keyword, then prelude token.
    AtRuleCssStatements,
    /// `css_selector_types`, keyed by [`SelectorKind`] ordinal.
    CssSelectorTypes,
    /// `css_dimensions`: units.
    CssDimensions,
    /// `css_functions`.
    CssFunctions,
    /// `css_pseudo_selectors`.
    CssPseudoSelectors,
    /// `img_formats`: file extensions and `base64`.
    ImgFormats,
    /// `link_types`: `anchor` and `mailto`.
    LinkTypes,
    /// `css_variables`.
    CssVariables,
    /// `css_important`.
    CssImportant,
    /// `html5_doctype`.
    #[strum(serialize = "html5_doctype")]
    Html5Doctype,
}

/// Address of one report entry: a category plus its key (and subkey for the
/// two-level categories). Keys are expected to be already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket<'k> {
    /// `html_tags[tag][subkey]`. The subkey is empty, an attribute name, or
    /// `name||value`.
    HtmlTag {
        /// Tag name.
        tag: &'k str,
        /// Empty, an attribute name, or `name||value`.
        subkey: &'k str,
    },
    /// `html_attributes[attribute][value]`.
    HtmlAttribute {
        /// Attribute name.
        attribute: &'k str,
        /// Empty or the attribute value.
        value: &'k str,
    },
    /// `css_properties[property][value]`.
    CssProperty {
        /// Property name.
        property: &'k str,
        /// Empty or the declaration value.
        value: &'k str,
    },
    /// `at_rule_css_statements[name][value]`. The name includes `@`.
    AtRule {
        /// At-keyword including `@`.
        name: &'k str,
        /// Empty or one prelude token.
        value: &'k str,
    },
    /// `css_selector_types[kind]`.
    SelectorType(SelectorKind),
    /// `css_dimensions[unit]`.
    Dimension(&'k str),
    /// `css_functions[name]`.
    Function(&'k str),
    /// `css_pseudo_selectors[name]`.
    PseudoSelector(&'k str),
    /// `img_formats[format]`.
    ImgFormat(&'k str),
    /// `link_types[kind]`.
    LinkType(&'k str),
    /// `css_variables`.
    Variables,
    /// `css_important`.
    Important,
    /// `html5_doctype`.
    Html5Doctype,
}

impl Bucket<'_> {
    /// The category this entry belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::HtmlTag { .. } => Category::HtmlTags,
            Self::HtmlAttribute { .. } => Category::HtmlAttributes,
            Self::CssProperty { .. } => Category::CssProperties,
            Self::AtRule { .. } => Category::AtRuleCssStatements,
            Self::SelectorType(_) => Category::CssSelectorTypes,
            Self::Dimension(_) => Category::CssDimensions,
            Self::Function(_) => Category::CssFunctions,
            Self::PseudoSelector(_) => Category::CssPseudoSelectors,
            Self::ImgFormat(_) => Category::ImgFormats,
            Self::LinkType(_) => Category::LinkTypes,
            Self::Variables => Category::CssVariables,
            Self::Important => Category::CssImportant,
            Self::Html5Doctype => Category::Html5Doctype,
        }
    }
}

/// One matched feature: its rule info and where it was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportContainer {
    /// Rule info copied from the rules database.
    pub rules: RuleInfo,
    /// Distinct 1-based lines, ascending.
    pub lines: BTreeSet<usize>,
    /// Set once a new line was seen after `lines` reached the cap.
    #[serde(default)]
    pub more_lines: bool,
}

impl ReportContainer {
    fn new(rules: RuleInfo, line: usize) -> Self {
        Self {
            rules,
            lines: BTreeSet::from([line]),
            more_lines: false,
        }
    }

    fn add_line(&mut self, line: usize, limit: usize) {
        if self.lines.contains(&line) {
            return;
        }
        if self.lines.len() < limit {
            let _ = self.lines.insert(line);
        } else {
            self.more_lines = true;
        }
    }
}

type Nested = BTreeMap<String, BTreeMap<String, ReportContainer>>;
type Flat = BTreeMap<String, ReportContainer>;

/// Compatibility report for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseReport {
    /// Tag name → "" / attribute name / `name||value`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub html_tags: Nested,
    /// Attribute name → "" / attribute value.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub html_attributes: Nested,
    /// Property name → "" / property value.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub css_properties: Nested,
    /// At-keyword including `@` → "" / prelude token.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub at_rule_css_statements: Nested,
    /// Selector kind ordinal ("0" to "10").
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub css_selector_types: Flat,
    /// Units, e.g. `px`, `%`, `initial`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", alias = "css_dimentions")]
    pub css_dimensions: Flat,
    /// Function names without the parenthesis.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub css_functions: Flat,
    /// Pseudo-class and pseudo-element names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub css_pseudo_selectors: Flat,
    /// Image file extensions and `base64`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub img_formats: Flat,
    /// `anchor` and `mailto`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub link_types: Flat,
    /// Custom properties and their references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_variables: Option<ReportContainer>,
    /// `!important` declarations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_important: Option<ReportContainer>,
    /// The HTML5 doctype.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html5_doctype: Option<ReportContainer>,
}

/// A report entry with its address spelled out, as yielded by
/// [`ParseReport::entries`].
#[derive(Debug, Clone, Copy)]
pub struct ReportEntry<'r> {
    /// Category the entry belongs to.
    pub category: Category,
    /// Empty for singleton categories.
    pub key: &'r str,
    /// Empty for one-level and singleton categories.
    pub subkey: &'r str,
    /// The recorded entry.
    pub container: &'r ReportContainer,
}

impl ParseReport {
    /// True when nothing was matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// The entry at `bucket`, if it was recorded.
    #[must_use]
    pub fn get(&self, bucket: &Bucket<'_>) -> Option<&ReportContainer> {
        fn nested<'m>(map: &'m Nested, key: &str, subkey: &str) -> Option<&'m ReportContainer> {
            map.get(key).and_then(|inner| inner.get(subkey))
        }

        match *bucket {
            Bucket::HtmlTag { tag, subkey } => nested(&self.html_tags, tag, subkey),
            Bucket::HtmlAttribute { attribute, value } => {
                nested(&self.html_attributes, attribute, value)
            }
            Bucket::CssProperty { property, value } => {
                nested(&self.css_properties, property, value)
            }
            Bucket::AtRule { name, value } => nested(&self.at_rule_css_statements, name, value),
            Bucket::SelectorType(kind) => self.css_selector_types.get(kind.as_key()),
            Bucket::Dimension(key) => self.css_dimensions.get(key),
            Bucket::Function(key) => self.css_functions.get(key),
            Bucket::PseudoSelector(key) => self.css_pseudo_selectors.get(key),
            Bucket::ImgFormat(key) => self.img_formats.get(key),
            Bucket::LinkType(key) => self.link_types.get(key),
            Bucket::Variables => self.css_variables.as_ref(),
            Bucket::Important => self.css_important.as_ref(),
            Bucket::Html5Doctype => self.html5_doctype.as_ref(),
        }
    }

    /// Every recorded entry, category by category in serialization order.
    pub fn entries(&self) -> impl Iterator<Item = ReportEntry<'_>> + '_ {
        nested_entries(Category::HtmlTags, &self.html_tags)
            .chain(nested_entries(Category::HtmlAttributes, &self.html_attributes))
            .chain(nested_entries(Category::CssProperties, &self.css_properties))
            .chain(nested_entries(
                Category::AtRuleCssStatements,
                &self.at_rule_css_statements,
            ))
            .chain(flat_entries(Category::CssSelectorTypes, &self.css_selector_types))
            .chain(flat_entries(Category::CssDimensions, &self.css_dimensions))
            .chain(flat_entries(Category::CssFunctions, &self.css_functions))
            .chain(flat_entries(Category::CssPseudoSelectors, &self.css_pseudo_selectors))
            .chain(flat_entries(Category::ImgFormats, &self.img_formats))
            .chain(flat_entries(Category::LinkTypes, &self.link_types))
            .chain(singleton_entry(Category::CssVariables, &self.css_variables))
            .chain(singleton_entry(Category::CssImportant, &self.css_important))
            .chain(singleton_entry(Category::Html5Doctype, &self.html5_doctype))
    }

    /// Record `line` for `bucket`, creating the entry with `rules` on first
    /// sight.
    pub fn record(&mut self, bucket: &Bucket<'_>, line: usize, rules: &RuleInfo, limit: usize) {
        fn nested<'m>(
            map: &'m mut Nested,
            key: &str,
            subkey: &str,
        ) -> Entry<'m, String, ReportContainer> {
            map.entry(key.to_owned())
                .or_default()
                .entry(subkey.to_owned())
        }

        let entry = match *bucket {
            Bucket::HtmlTag { tag, subkey } => nested(&mut self.html_tags, tag, subkey),
            Bucket::HtmlAttribute { attribute, value } => {
                nested(&mut self.html_attributes, attribute, value)
            }
            Bucket::CssProperty { property, value } => {
                nested(&mut self.css_properties, property, value)
            }
            Bucket::AtRule { name, value } => nested(&mut self.at_rule_css_statements, name, value),
            Bucket::SelectorType(kind) => self.css_selector_types.entry(kind.to_string()),
            Bucket::Dimension(key) => self.css_dimensions.entry(key.to_owned()),
            Bucket::Function(key) => self.css_functions.entry(key.to_owned()),
            Bucket::PseudoSelector(key) => self.css_pseudo_selectors.entry(key.to_owned()),
            Bucket::ImgFormat(key) => self.img_formats.entry(key.to_owned()),
            Bucket::LinkType(key) => self.link_types.entry(key.to_owned()),
            Bucket::Variables => return upsert_singleton(&mut self.css_variables, line, rules, limit),
            Bucket::Important => return upsert_singleton(&mut self.css_important, line, rules, limit),
            Bucket::Html5Doctype => {
                return upsert_singleton(&mut self.html5_doctype, line, rules, limit);
            }
        };

        match entry {
            Entry::Occupied(mut occupied) => occupied.get_mut().add_line(line, limit),
            Entry::Vacant(vacant) => {
                let _ = vacant.insert(ReportContainer::new(rules.clone(), line));
            }
        }
    }
}

fn nested_entries(category: Category, map: &Nested) -> impl Iterator<Item = ReportEntry<'_>> {
    map.iter().flat_map(move |(key, inner)| {
        inner.iter().map(move |(subkey, container)| ReportEntry {
            category,
            key,
            subkey,
            container,
        })
    })
}

fn flat_entries(category: Category, map: &Flat) -> impl Iterator<Item = ReportEntry<'_>> {
    map.iter().map(move |(key, container)| ReportEntry {
        category,
        key,
        subkey: "",
        container,
    })
}

fn singleton_entry(
    category: Category,
    slot: &Option<ReportContainer>,
) -> impl Iterator<Item = ReportEntry<'_>> {
    slot.iter().map(move |container| ReportEntry {
        category,
        key: "",
        subkey: "",
        container,
    })
}

fn upsert_singleton(
    slot: &mut Option<ReportContainer>,
    line: usize,
    rules: &RuleInfo,
    limit: usize,
) {
    match slot {
        Some(container) => container.add_line(line, limit),
        None => *slot = Some(ReportContainer::new(rules.clone(), line)),
    }
}

/// The report under construction, shared by the HTML driver and every style
/// block task.
#[derive(Debug)]
pub struct Collector {
    report: Mutex<ParseReport>,
    limit: usize,
}

impl Collector {
    /// An empty collector keeping at most `limit` lines per entry.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            report: Mutex::new(ParseReport::default()),
            limit,
        }
    }

    /// Record `line` for `bucket`.
    ///
    /// A lock poisoned by a panicking task is recovered: `record` never
    /// leaves an entry half-written.
    pub fn record(&self, bucket: &Bucket<'_>, line: usize, rules: &RuleInfo) {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(bucket, line, rules, self.limit);
    }

    /// Consume the collector and return the finished report.
    #[must_use]
    pub fn into_report(self) -> ParseReport {
        self.report
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_first_sight_creates_entry() {
        let mut report = ParseReport::default();
        let bucket = Bucket::CssProperty {
            property: "display",
            value: "flex",
        };
        report.record(&bucket, 7, &json!({"title": "flex"}), 3);
        let container = report.get(&bucket).unwrap();
        assert_eq!(container.lines, BTreeSet::from([7]));
        assert_eq!(container.rules, json!({"title": "flex"}));
        assert!(!container.more_lines);
    }

    #[test]
    fn test_line_cap_sets_more_lines() {
        let mut report = ParseReport::default();
        for line in 1..=5 {
            report.record(&Bucket::Important, line, &json!(null), 3);
        }
        let container = report.css_important.as_ref().unwrap();
        assert_eq!(container.lines, BTreeSet::from([1, 2, 3]));
        assert!(container.more_lines);
    }

    #[test]
    fn test_repeated_line_at_cap_is_not_more_lines() {
        let mut report = ParseReport::default();
        report.record(&Bucket::Variables, 1, &json!(null), 1);
        report.record(&Bucket::Variables, 1, &json!(null), 1);
        assert!(!report.css_variables.as_ref().unwrap().more_lines);
    }

    #[test]
    fn test_empty_categories_are_not_serialized() {
        let mut report = ParseReport::default();
        report.record(&Bucket::Dimension("px"), 2, &json!({"t": 1}), 50);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "css_dimensions": {
                    "px": { "rules": {"t": 1}, "lines": [2], "more_lines": false }
                }
            })
        );
    }

    #[test]
    fn test_entries_walk_every_category() {
        let mut report = ParseReport::default();
        report.record(
            &Bucket::HtmlTag {
                tag: "video",
                subkey: "",
            },
            1,
            &json!(1),
            50,
        );
        report.record(&Bucket::LinkType("anchor"), 2, &json!(2), 50);
        report.record(&Bucket::Html5Doctype, 1, &json!(3), 50);
        let categories: Vec<Category> = report.entries().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![Category::HtmlTags, Category::LinkTypes, Category::Html5Doctype]
        );
        assert!(!report.is_empty());
        assert!(ParseReport::default().is_empty());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(Category::AtRuleCssStatements.to_string(), "at_rule_css_statements");
        assert_eq!(Category::Html5Doctype.to_string(), "html5_doctype");
        assert_eq!(Category::CssDimensions.to_string(), "css_dimensions");
    }
}
