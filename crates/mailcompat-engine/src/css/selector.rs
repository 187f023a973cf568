//! Selector feature detection.
//!
//! A selector arrives as the token list of one
//! [`GrammarEvent::BeginRuleset`](mailcompat_css::GrammarEvent::BeginRuleset)
//! or `QualifiedRule`. The scan below is a single pass over those tokens
//! that reports which kinds of selector appear in it, without building a
//! selector tree.

use mailcompat_css::{CSSToken, TokenKind};
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::rules::normalize_key;

/// [§ 16 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax) constructs
/// tracked in the report.
///
/// The string form is the ordinal, which is how the rules database and the
/// report key selector kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr)]
pub enum SelectorKind {
    /// `a + b`
    #[strum(serialize = "0")]
    AdjacentSibling,
    /// `[attr]`
    #[strum(serialize = "1")]
    Attribute,
    /// `.a.b`
    #[strum(serialize = "2")]
    Chaining,
    /// `a > b`
    #[strum(serialize = "3")]
    Child,
    /// `.a`
    #[strum(serialize = "4")]
    Class,
    /// `a b`
    #[strum(serialize = "5")]
    Descendant,
    /// `a ~ b`
    #[strum(serialize = "6")]
    GeneralSibling,
    /// `a, b`
    #[strum(serialize = "7")]
    Grouping,
    /// `#a`
    #[strum(serialize = "8")]
    Id,
    /// `a`
    #[strum(serialize = "9")]
    Type,
    /// `*`
    #[strum(serialize = "10")]
    UniversalStar,
}

impl SelectorKind {
    /// Key of this kind in the rules database and the report.
    #[must_use]
    pub fn as_key(self) -> &'static str {
        self.into()
    }
}

/// One finding of [`scan_selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorFeature {
    Kind(SelectorKind),
    /// Pseudo-class or pseudo-element name, normalized and without `(`.
    Pseudo(String),
}

/// Keyframe selectors, which tokenize like type selectors.
const KEYFRAME_SELECTORS: [&str; 2] = ["from", "to"];

/// Findings for one selector, in the order they were detected. Kinds may
/// repeat.
///
/// Consecutive `.` delimiters count toward a chaining run that is reported
/// when it reaches two and the run is broken by whitespace, another
/// delimiter, or the end of the selector. A type selector is reported at the
/// same points, so a delimiter directly after a type name cancels it.
pub(crate) fn scan_selector(tokens: &[CSSToken<'_>]) -> Vec<SelectorFeature> {
    let mut found = Vec::new();
    let mut chaining = 0_usize;
    let mut type_selector = false;
    let mut previous: Option<&CSSToken<'_>> = None;

    for token in tokens {
        match token.kind {
            TokenKind::LeftBracket => found.push(SelectorFeature::Kind(SelectorKind::Attribute)),
            TokenKind::Whitespace => {
                flush(&mut found, chaining, type_selector);
                chaining = 0;
                type_selector = false;
                found.push(SelectorFeature::Kind(SelectorKind::Descendant));
            }
            TokenKind::Hash => found.push(SelectorFeature::Kind(SelectorKind::Id)),
            TokenKind::Delim => {
                type_selector = false;
                if token.is_delim('.') {
                    chaining += 1;
                } else {
                    flush(&mut found, chaining, false);
                    chaining = 0;
                }
                let combinator = match token.text {
                    "*" => Some(SelectorKind::UniversalStar),
                    "~" => Some(SelectorKind::GeneralSibling),
                    "+" => Some(SelectorKind::AdjacentSibling),
                    ">" => Some(SelectorKind::Child),
                    _ => None,
                };
                if let Some(kind) = combinator {
                    found.push(SelectorFeature::Kind(kind));
                }
            }
            _ => {}
        }

        let after_colon = previous.is_some_and(|p| p.kind == TokenKind::Colon);
        let after_dot = previous.is_some_and(|p| p.is_delim('.'));
        let after_delim = previous.is_some_and(|p| p.kind == TokenKind::Delim);

        match token.kind {
            TokenKind::Ident | TokenKind::Function if after_colon => {
                found.push(SelectorFeature::Pseudo(normalize_key(&token.text.replace('(', ""))));
            }
            TokenKind::Ident if after_dot => {
                found.push(SelectorFeature::Kind(SelectorKind::Class));
            }
            TokenKind::Ident if !after_delim => {
                if !KEYFRAME_SELECTORS.contains(&normalize_key(token.text).as_str()) {
                    type_selector = true;
                }
            }
            _ => {}
        }

        previous = Some(token);
    }

    flush(&mut found, chaining, type_selector);
    found
}

fn flush(found: &mut Vec<SelectorFeature>, chaining: usize, type_selector: bool) {
    if chaining > 1 {
        found.push(SelectorFeature::Kind(SelectorKind::Chaining));
    }
    if type_selector {
        found.push(SelectorFeature::Kind(SelectorKind::Type));
    }
}

#[cfg(test)]
mod tests {
    use mailcompat_css::CSSTokenizer;
    use strum::IntoEnumIterator;

    use super::*;

    fn kinds(selector: &str) -> Vec<SelectorKind> {
        let tokens = CSSTokenizer::tokenize(selector);
        scan_selector(&tokens)
            .into_iter()
            .filter_map(|f| match f {
                SelectorFeature::Kind(kind) => Some(kind),
                SelectorFeature::Pseudo(_) => None,
            })
            .collect()
    }

    fn pseudos(selector: &str) -> Vec<String> {
        let tokens = CSSTokenizer::tokenize(selector);
        scan_selector(&tokens)
            .into_iter()
            .filter_map(|f| match f {
                SelectorFeature::Pseudo(name) => Some(name),
                SelectorFeature::Kind(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_ordinal_keys() {
        for (ordinal, kind) in SelectorKind::iter().enumerate() {
            assert_eq!(kind.as_key(), ordinal.to_string());
            assert_eq!(kind.to_string(), ordinal.to_string());
        }
        assert_eq!(SelectorKind::iter().count(), 11);
        assert_eq!(SelectorKind::Grouping.as_key(), "7");
    }

    #[test]
    fn test_type_and_class() {
        assert_eq!(kinds("p"), vec![SelectorKind::Type]);
        assert_eq!(kinds(".a"), vec![SelectorKind::Class]);
        assert_eq!(kinds("#main"), vec![SelectorKind::Id]);
    }

    #[test]
    fn test_chaining_needs_two_classes() {
        assert_eq!(
            kinds(".a.b"),
            vec![SelectorKind::Class, SelectorKind::Class, SelectorKind::Chaining]
        );
    }

    #[test]
    fn test_descendant_and_combinators() {
        assert_eq!(
            kinds("div p"),
            vec![SelectorKind::Type, SelectorKind::Descendant, SelectorKind::Type]
        );
        assert_eq!(kinds("ul>li"), vec![SelectorKind::Child]);
        assert_eq!(kinds("*"), vec![SelectorKind::UniversalStar]);
        assert_eq!(kinds("~"), vec![SelectorKind::GeneralSibling]);
    }

    #[test]
    fn test_delimiter_cancels_pending_type() {
        assert_eq!(kinds("h1+p"), vec![SelectorKind::AdjacentSibling]);
    }

    #[test]
    fn test_attribute() {
        assert_eq!(
            kinds("input[disabled]"),
            vec![SelectorKind::Attribute, SelectorKind::Type]
        );
    }

    #[test]
    fn test_keyframe_selectors_are_not_types() {
        assert!(kinds("from").is_empty());
        assert!(kinds("TO").is_empty());
    }

    #[test]
    fn test_pseudo_names() {
        assert_eq!(pseudos("a:hover"), vec!["hover"]);
        assert_eq!(pseudos("li:nth-child(2)"), vec!["nth-child"]);
        assert_eq!(pseudos("p::first-line"), vec!["first-line"]);
    }
}
