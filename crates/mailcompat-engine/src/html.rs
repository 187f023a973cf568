//! HTML token classification.
//!
//! The [`HtmlDriver`] consumes the token stream of one document in order. It
//! records tags, attributes, link types and the doctype directly, classifies
//! inline `style` attributes on the spot, and hands back the content of each
//! `<style>` element as a [`StyleBlock`] for the caller to classify.

use std::sync::LazyLock;

use mailcompat_common::LineCursor;
use mailcompat_html::{Attribute, Spanned, Token};
use regex::Regex;

use crate::css;
use crate::image;
use crate::matcher::Matcher;
use crate::report::Bucket;
use crate::rules::{normalize_key, trim_whitespace};

static HTML5_DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!DOCTYPE[\t\n\x0C\r ]+html>").expect("doctype pattern is valid")
});
static ANCHOR_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#(.+)").expect("anchor link pattern is valid"));
static MAILTO_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^mailto:(.+)").expect("mailto link pattern is valid"));

/// Content of one `<style>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StyleBlock {
    pub(crate) css: String,
    /// Document line of the `<style>` start tag.
    pub(crate) start_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DriverState {
    Scanning,
    InStyleTag { start_line: usize, css: String },
}

pub(crate) struct HtmlDriver<'m, 'i> {
    matcher: Matcher<'m>,
    lines: LineCursor<'i>,
    state: DriverState,
}

impl<'m, 'i> HtmlDriver<'m, 'i> {
    pub(crate) const fn new(matcher: Matcher<'m>, lines: LineCursor<'i>) -> Self {
        Self {
            matcher,
            lines,
            state: DriverState::Scanning,
        }
    }

    /// Classify one token. Returns the finished style block when `token`
    /// closes a non-empty `<style>` element.
    pub(crate) fn process(&mut self, token: Spanned<Token>) -> Option<StyleBlock> {
        let line = self.lines.line_at(token.offset);
        match token.token {
            Token::Text { data } => {
                if let DriverState::InStyleTag { css, .. } = &mut self.state {
                    css.push_str(&data.replace('\0', "\u{FFFD}"));
                }
            }
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                if name == "style" && !self_closing {
                    self.state = DriverState::InStyleTag {
                        start_line: line,
                        css: String::new(),
                    };
                }
                if name == "a" {
                    self.link(&attributes, line);
                }
                log::trace!(
                    "<{name}{}> with {} attribute(s) at line {line}",
                    if self_closing { "/" } else { "" },
                    attributes.len()
                );
                self.tag(&name, &attributes, line);
            }
            Token::EndTag { name } if name == "style" => {
                let state = std::mem::replace(&mut self.state, DriverState::Scanning);
                if let DriverState::InStyleTag { start_line, css } = state
                    && !css.is_empty()
                {
                    return Some(StyleBlock { css, start_line });
                }
            }
            doctype @ Token::Doctype { .. } => {
                if doctype
                    .doctype_literal()
                    .is_some_and(|literal| HTML5_DOCTYPE.is_match(&literal))
                {
                    let _ = self.matcher.check(Bucket::Html5Doctype, line);
                }
            }
            Token::EndTag { .. } | Token::Comment { .. } => {}
        }
        None
    }

    /// Tag lookups: the bare tag, then per attribute the attribute name and
    /// `name||value`; the attribute itself; inline style; image sources.
    fn tag(&self, tag: &str, attributes: &[Attribute], line: usize) {
        let _ = self.matcher.check(Bucket::HtmlTag { tag, subkey: "" }, line);

        for attribute in attributes {
            let key = attribute.name.to_lowercase();
            let value = attribute.value.to_lowercase();

            let _ = self.matcher.check(Bucket::HtmlTag { tag, subkey: &key }, line);
            let pair = format!("{key}||{value}");
            let _ = self.matcher.check(Bucket::HtmlTag { tag, subkey: &pair }, line);

            let attribute_key = normalize_key(&key);
            let attribute_value = normalize_key(&value);
            let _ = self.matcher.check(
                Bucket::HtmlAttribute {
                    attribute: &attribute_key,
                    value: "",
                },
                line,
            );
            let _ = self.matcher.check(
                Bucket::HtmlAttribute {
                    attribute: &attribute_key,
                    value: &attribute_value,
                },
                line,
            );

            match key.as_str() {
                "style" => css::classify_inline(self.matcher, &value, line),
                "src" | "srcset" => {
                    for url in image::attribute_urls(&key, &value) {
                        self.matcher.check_image(url, line);
                    }
                }
                _ => {}
            }
        }
    }

    fn link(&self, attributes: &[Attribute], line: usize) {
        for attribute in attributes.iter().filter(|a| a.name == "href") {
            if let Some(kind) = link_type(&attribute.value) {
                let _ = self.matcher.check(Bucket::LinkType(kind), line);
            }
        }
    }
}

/// `anchor` for `#fragment`, `mailto` for `mailto:address` (any case).
/// Both need at least one character after the prefix.
fn link_type(href: &str) -> Option<&'static str> {
    let href = trim_whitespace(href);
    if ANCHOR_LINK.is_match(href) {
        Some("anchor")
    } else if MAILTO_LINK.is_match(href) {
        Some("mailto")
    } else {
        None
    }
}
