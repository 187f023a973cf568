//! The rules database: which HTML and CSS features are tracked, and the
//! support information reported for each.
//!
//! The database is a JSON document with one object per category. Two-level
//! categories map a key to subkeys (the empty subkey stands for "any use of
//! the key"); one-level categories map a key straight to its rule info; the
//! three singleton categories hold rule info directly. Rule info is opaque to
//! the analyzer and copied into the report as-is.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::{Arc, LazyLock};

use serde::Deserialize;

use crate::error::RulesError;
use crate::report::Bucket;

/// Support information attached to a feature, passed through untouched.
pub type RuleInfo = serde_json::Value;

type Nested = BTreeMap<String, BTreeMap<String, RuleInfo>>;
type Flat = BTreeMap<String, RuleInfo>;

static BUNDLED_JSON: &str = include_str!("../rules/caniuse.json");

static BUNDLED: LazyLock<Result<Arc<RulesDb>, String>> = LazyLock::new(|| {
    RulesDb::from_json(BUNDLED_JSON)
        .map(Arc::new)
        .map_err(|e| e.to_string())
});

/// Features to look for, keyed the way the analyzer normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RulesDb {
    /// Tag name → "" / attribute name / `name||value`.
    pub html_tags: Nested,
    /// Attribute name → "" / attribute value.
    pub html_attributes: Nested,
    /// Property name → "" / property value.
    pub css_properties: Nested,
    /// At-keyword including `@` → "" / prelude token.
    pub at_rule_css_statements: Nested,
    /// Selector kind ordinal ("0" to "10").
    pub css_selector_types: Flat,
    /// Unit, e.g. `px`, `%`, `initial`.
    #[serde(alias = "css_dimentions")]
    pub css_dimensions: Flat,
    /// Function name without the parenthesis.
    pub css_functions: Flat,
    /// Pseudo-class or pseudo-element name.
    pub css_pseudo_selectors: Flat,
    /// Image file extension or `base64`.
    pub img_formats: Flat,
    /// `anchor` or `mailto`.
    pub link_types: Flat,
    /// Custom properties (`--name: value`) and `var()` references.
    pub css_variables: Option<RuleInfo>,
    /// `!important` in a declaration value.
    pub css_important: Option<RuleInfo>,
    /// `<!DOCTYPE html>`.
    pub html5_doctype: Option<RuleInfo>,
}

impl RulesDb {
    /// Parse a database from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Malformed`] when the text is not a JSON object
    /// of the expected shape.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a database from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Io`] when reading fails and
    /// [`RulesError::Malformed`] when the content does not parse.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, RulesError> {
        let mut json = String::new();
        let _ = reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    /// Build a database from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Malformed`] when the value has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RulesError> {
        Ok(serde_json::from_value(value)?)
    }

    /// A fresh copy of the database compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Malformed`] if the bundled document is broken.
    pub fn bundled() -> Result<Self, RulesError> {
        Self::from_json(BUNDLED_JSON)
    }

    /// The bundled database, parsed once per process and shared.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Bundled`] if the bundled document is broken.
    pub fn shared_bundled() -> Result<Arc<Self>, RulesError> {
        BUNDLED
            .as_ref()
            .map(Arc::clone)
            .map_err(|message| RulesError::Bundled(message.clone()))
    }

    /// Rule info for `bucket`, if the database tracks it.
    #[must_use]
    pub fn lookup(&self, bucket: &Bucket<'_>) -> Option<&RuleInfo> {
        fn nested<'m>(map: &'m Nested, key: &str, subkey: &str) -> Option<&'m RuleInfo> {
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
}

/// Trim CSS/HTML whitespace and lowercase, the normalization every lookup key
/// goes through.
pub(crate) fn normalize_key(text: &str) -> String {
    trim_whitespace(text).to_lowercase()
}

/// Trim space, tab, CR, LF and form feed from both ends.
pub(crate) fn trim_whitespace(text: &str) -> &str {
    text.trim_matches(is_whitespace)
}

pub(crate) const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::css::SelectorKind;

    #[test]
    fn test_bundled_database_loads() {
        let db = RulesDb::bundled().unwrap();
        assert!(db.html_tags.contains_key("video"));
        assert!(db.css_variables.is_some());
        assert!(RulesDb::shared_bundled().is_ok());
    }

    #[test]
    fn test_misspelled_dimensions_key_is_accepted() {
        let db = RulesDb::from_value(json!({
            "css_dimentions": { "rem": { "title": "rem unit" } }
        }))
        .unwrap();
        assert!(db.lookup(&Bucket::Dimension("rem")).is_some());
    }

    #[test]
    fn test_lookup_distinguishes_subkeys() {
        let db = RulesDb::from_value(json!({
            "css_properties": { "display": { "": 1, "flex": 2 } },
            "css_selector_types": { "8": 3 }
        }))
        .unwrap();
        let any = Bucket::CssProperty {
            property: "display",
            value: "",
        };
        let flex = Bucket::CssProperty {
            property: "display",
            value: "flex",
        };
        let grid = Bucket::CssProperty {
            property: "display",
            value: "grid",
        };
        assert_eq!(db.lookup(&any), Some(&json!(1)));
        assert_eq!(db.lookup(&flex), Some(&json!(2)));
        assert_eq!(db.lookup(&grid), None);
        assert_eq!(
            db.lookup(&Bucket::SelectorType(SelectorKind::Id)),
            Some(&json!(3))
        );
    }

    #[test]
    fn test_malformed_database() {
        assert!(matches!(
            RulesDb::from_json("{\"html_tags\": []}"),
            Err(RulesError::Malformed(_))
        ));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("\t Display\n"), "display");
        assert_eq!(trim_whitespace("\x0C a \r"), "a");
    }
}
