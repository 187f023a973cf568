//! CSS feature classification.
//!
//! Drives a [`GrammarParser`] over one stylesheet (the content of a `<style>`
//! element) or one inline `style` attribute and records every tracked
//! feature it meets: at-rules, selector kinds, pseudo selectors, properties
//! and their values, units, functions, image formats, custom properties and
//! `!important`.
//!
//! Stylesheet lines are computed from byte offsets inside the block and then
//! shifted to document lines; an inline style records everything at the line
//! of its tag.

mod selector;
mod values;

use std::ops::ControlFlow;

use mailcompat_common::{LineCursor, LineIndex};
use mailcompat_css::{CSSToken, GrammarEvent, GrammarParser, TokenKind};

pub use self::selector::SelectorKind;
use self::selector::{SelectorFeature, scan_selector};
use self::values::{dimension_unit, function_name, property_key};
use crate::matcher::Matcher;
use crate::report::Bucket;
use crate::rules::{normalize_key, trim_whitespace};

/// Classify the stylesheet `css` whose first line is document line
/// `start_line`.
pub(crate) fn classify_stylesheet(matcher: Matcher<'_>, css: &str, start_line: usize) {
    let index = LineIndex::new(css);
    let mut classifier = Classifier {
        matcher,
        lines: Lines::Block {
            css: css.as_bytes(),
            cursor: index.cursor(),
            start_line,
        },
    };
    let _ = classifier.classify_block(&mut GrammarParser::stylesheet(css));
}

/// Classify the declaration list of a `style` attribute found on `line`.
pub(crate) fn classify_inline(matcher: Matcher<'_>, css: &str, line: usize) {
    let mut classifier = Classifier {
        matcher,
        lines: Lines::Fixed(line),
    };
    let _ = classifier.classify_block(&mut GrammarParser::inline(css));
}

/// How events are mapped to document lines.
enum Lines<'c> {
    /// Everything is on one line.
    Fixed(usize),
    /// A stylesheet starting at `start_line`.
    Block {
        css: &'c [u8],
        cursor: LineCursor<'c>,
        start_line: usize,
    },
}

impl Lines<'_> {
    /// Document line of an event ending at `offset`.
    fn line_for(&mut self, offset: usize, declaration: bool) -> usize {
        match self {
            Self::Fixed(line) => *line,
            Self::Block {
                css,
                cursor,
                start_line,
            } => {
                let mut local = cursor.line_at(offset);
                if declaration {
                    local = declaration_line(css, cursor.index(), offset, local);
                }
                *start_line + local - 1
            }
        }
    }
}

/// A declaration ends after its `;` or `}`, which may sit on a later line
/// than the declaration text. Walk back from `line` to the nearest line that
/// holds something other than whitespace and closing braces before `offset`.
///
/// Returns `line` unchanged for the first line, for offsets at the end of
/// the block, and when every earlier line is blank.
fn declaration_line(css: &[u8], index: &LineIndex, offset: usize, line: usize) -> usize {
    if offset >= css.len() || line <= 1 {
        return line;
    }

    let mut candidate = line;
    let mut end = offset;
    while let Some(start) = index.line_start(candidate) {
        let has_text = css[start..end]
            .iter()
            .any(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' | b'}'));
        if has_text {
            return candidate;
        }
        candidate -= 1;
        if candidate < 1 {
            break;
        }
        end = start;
    }
    line
}

struct Classifier<'m, 'c> {
    matcher: Matcher<'m>,
    lines: Lines<'c>,
}

impl Classifier<'_, '_> {
    /// Classify events up to the end of the current block.
    ///
    /// Breaks when the input runs out, which ends classification at every
    /// nesting level. Malformed rules never reach here; the parser skips them.
    fn classify_block(&mut self, parser: &mut GrammarParser<'_>) -> ControlFlow<()> {
        loop {
            let event = parser.next_event();
            if matches!(event, GrammarEvent::Error(_)) {
                return ControlFlow::Break(());
            }

            let declaration = matches!(event, GrammarEvent::Declaration { .. });
            let line = self.lines.line_for(parser.offset(), declaration);

            match event {
                GrammarEvent::AtRule { name, prelude } => self.at_rule(name, &prelude, line),
                GrammarEvent::BeginAtRule { name, prelude } => {
                    self.at_rule(name, &prelude, line);
                    self.classify_block(parser)?;
                }
                GrammarEvent::EndAtRule => return ControlFlow::Continue(()),
                GrammarEvent::QualifiedRule { selector } => {
                    self.check(Bucket::SelectorType(SelectorKind::Grouping), line);
                    self.selector(&selector, line);
                }
                GrammarEvent::BeginRuleset { selector } => self.selector(&selector, line),
                GrammarEvent::EndRuleset | GrammarEvent::Error(_) => {}
                GrammarEvent::Declaration { property, value } => {
                    self.declaration(property, &value, line);
                }
                GrammarEvent::CustomProperty { .. } => self.check(Bucket::Variables, line),
            }
        }
    }

    fn check(&self, bucket: Bucket<'_>, line: usize) {
        let _ = self.matcher.check(bucket, line);
    }

    fn at_rule(&self, name: &str, prelude: &[CSSToken<'_>], line: usize) {
        let name = normalize_key(name);
        self.check(
            Bucket::AtRule {
                name: &name,
                value: "",
            },
            line,
        );
        for token in prelude {
            let value = normalize_key(token.text);
            self.check(
                Bucket::AtRule {
                    name: &name,
                    value: &value,
                },
                line,
            );
            if matches!(token.kind, TokenKind::Dimension | TokenKind::Percentage) {
                self.dimension(token.text, line);
            }
        }
    }

    fn selector(&self, selector: &[CSSToken<'_>], line: usize) {
        for feature in scan_selector(selector) {
            match feature {
                SelectorFeature::Kind(kind) => self.check(Bucket::SelectorType(kind), line),
                SelectorFeature::Pseudo(name) => self.check(Bucket::PseudoSelector(&name), line),
            }
        }
    }

    /// Scan the value tokens for units, functions, images, custom property
    /// references and `!important`, then look the property up.
    fn declaration(&self, property: &str, value: &[CSSToken<'_>], line: usize) {
        let mut joined = String::new();
        let mut after_bang = false;

        for token in value {
            let text = normalize_key(token.text);
            match token.kind {
                TokenKind::Dimension | TokenKind::Percentage => self.dimension(token.text, line),
                TokenKind::Ident if text == "initial" => self.dimension(&text, line),
                TokenKind::Function => {
                    self.check(Bucket::Function(&function_name(token.text)), line);
                }
                TokenKind::Url => self.matcher.check_image(token.text, line),
                TokenKind::CustomPropertyName => self.check(Bucket::Variables, line),
                _ => {}
            }
            if after_bang && token.kind == TokenKind::Ident && text == "important" {
                self.check(Bucket::Important, line);
            }
            after_bang = token.kind == TokenKind::Delim && text == "!";
            joined.push_str(&text);
        }

        let property = property_key(property);
        let value = trim_whitespace(&joined.replace("!important", "")).to_owned();
        self.check(
            Bucket::CssProperty {
                property: &property,
                value: "",
            },
            line,
        );
        self.check(
            Bucket::CssProperty {
                property: &property,
                value: &value,
            },
            line,
        );
    }

    fn dimension(&self, text: &str, line: usize) {
        self.check(Bucket::Dimension(&dimension_unit(text)), line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_line_walks_back_over_closing_braces() {
        let css = b"a {\n  color: red\n}\n";
        let index = LineIndex::new(css);
        // The declaration consumed the `}` on line 3.
        assert_eq!(declaration_line(css, &index, 18, 3), 2);
    }

    #[test]
    fn test_declaration_line_keeps_lines_with_text() {
        let css = b"a {\n  color: red;\n}\n";
        let index = LineIndex::new(css);
        assert_eq!(declaration_line(css, &index, 17, 2), 2);
    }

    #[test]
    fn test_declaration_line_at_end_of_block_is_unchanged() {
        let css = b"a {\n  color: red\n}";
        let index = LineIndex::new(css);
        assert_eq!(declaration_line(css, &index, css.len(), 3), 3);
    }

    #[test]
    fn test_declaration_line_first_line_is_unchanged() {
        let css = b"a { b: c }";
        let index = LineIndex::new(css);
        assert_eq!(declaration_line(css, &index, 10, 1), 1);
    }
}
