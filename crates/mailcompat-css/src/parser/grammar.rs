//! Grammar event parser over the CSS token stream.
//!
//! Follows the rule structure of [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//! but does not build a tree. Each call to [`GrammarParser::next_event`]
//! consumes one construct (a selector segment, a declaration, an at-rule
//! prelude, or a block end) and reports it as a [`GrammarEvent`] together
//! with its tokens. [`GrammarParser::offset`] then tells where in the input
//! that construct ended.
//!
//! Malformed constructs are skipped the way [§ 5.4](https://www.w3.org/TR/css-syntax-3/#parser-algorithms)
//! drops invalid rules and declarations: a bad declaration up to the next
//! `;` or the end of its block, a bad selector together with its block.
//! Only running out of input ends the event stream.

use strum_macros::IntoStaticStr;

use super::error::GrammarError;
use crate::tokenizer::{CSSToken, CSSTokenizer, TokenKind};

/// One syntactic construct reported by the [`GrammarParser`].
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum GrammarEvent<'a> {
    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-an-at-rule)
    /// without a block, e.g. `@import url(a.css);`.
    AtRule {
        /// The at-keyword including `@`.
        name: &'a str,
        /// Prelude tokens, whitespace-trimmed.
        prelude: Vec<CSSToken<'a>>,
    },

    /// An at-rule whose prelude ends in `{`. The block's contents follow as
    /// further events up to the matching [`GrammarEvent::EndAtRule`].
    BeginAtRule {
        /// The at-keyword including `@`.
        name: &'a str,
        /// Prelude tokens, whitespace-trimmed.
        prelude: Vec<CSSToken<'a>>,
    },

    /// `}` closing an at-rule block.
    EndAtRule,

    /// One selector of a selector list, terminated by a top-level comma.
    QualifiedRule {
        /// Normalized selector tokens.
        selector: Vec<CSSToken<'a>>,
    },

    /// The last selector of a selector list, terminated by `{`.
    BeginRuleset {
        /// Normalized selector tokens.
        selector: Vec<CSSToken<'a>>,
    },

    /// `}` closing a ruleset block.
    EndRuleset,

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    Declaration {
        /// Property name as written.
        property: &'a str,
        /// Value tokens, whitespace-trimmed. `!important` stays in the list.
        value: Vec<CSSToken<'a>>,
    },

    /// A declaration whose name starts with `--`.
    CustomProperty {
        /// Property name as written, including the leading hyphens.
        name: &'a str,
        /// Value tokens, whitespace-trimmed.
        value: Vec<CSSToken<'a>>,
    },

    /// Parsing stopped. Returned for every call once the input is consumed.
    Error(GrammarError),
}

impl<'a> GrammarEvent<'a> {
    /// The tokens carried by the event; empty for block ends and errors.
    #[must_use]
    pub fn tokens(&self) -> &[CSSToken<'a>] {
        match self {
            Self::AtRule { prelude, .. } | Self::BeginAtRule { prelude, .. } => prelude,
            Self::QualifiedRule { selector } | Self::BeginRuleset { selector } => selector,
            Self::Declaration { value, .. } | Self::CustomProperty { value, .. } => value,
            Self::EndAtRule | Self::EndRuleset | Self::Error(_) => &[],
        }
    }

    /// Event name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    AtRule,
    Ruleset,
}

/// Pull parser producing [`GrammarEvent`]s.
pub struct GrammarParser<'a> {
    tokens: Vec<CSSToken<'a>>,
    position: usize,
    /// Enclosing blocks, innermost last.
    blocks: Vec<Block>,
    /// A declaration consumed the `}` of its block; the block end is due.
    pending_close: bool,
    /// Parse a bare declaration list, as found in a `style` attribute.
    inline: bool,
    error: Option<GrammarError>,
}

impl<'a> GrammarParser<'a> {
    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    #[must_use]
    pub fn stylesheet(input: &'a str) -> Self {
        Self::with_mode(input, false)
    }

    /// [§ 5.3.6 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
    ///
    /// At-rules and nested rulesets are not recognized in this mode.
    #[must_use]
    pub fn inline(input: &'a str) -> Self {
        Self::with_mode(input, true)
    }

    fn with_mode(input: &'a str, inline: bool) -> Self {
        Self {
            tokens: CSSTokenizer::tokenize(input),
            position: 0,
            blocks: Vec::new(),
            pending_close: false,
            inline,
            error: None,
        }
    }

    /// Byte offset just past the last token consumed by the most recent event.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.tokens[..self.position].last().map_or(0, CSSToken::end)
    }

    /// Consume the next construct.
    pub fn next_event(&mut self) -> GrammarEvent<'a> {
        let event = self.parse_event();
        log::trace!("{} ending at byte {}", event.kind(), self.offset());
        event
    }

    fn parse_event(&mut self) -> GrammarEvent<'a> {
        if let Some(error) = &self.error {
            return GrammarEvent::Error(error.clone());
        }
        if self.pending_close {
            self.pending_close = false;
            return self.close_block();
        }

        loop {
            self.skip_whitespace();
            let Some(token) = self.peek() else {
                return self.fail(GrammarError::EndOfInput);
            };

            match token.kind {
                // "If the top-level flag is set, do nothing" for CDO/CDC.
                TokenKind::CDO | TokenKind::CDC if self.blocks.is_empty() => self.position += 1,
                TokenKind::Semicolon => self.position += 1,
                TokenKind::RightBrace if !self.blocks.is_empty() => {
                    self.position += 1;
                    return self.close_block();
                }
                TokenKind::RightBrace => {
                    skipped(&GrammarError::UnexpectedToken {
                        offset: token.offset,
                        found: token.kind,
                    });
                    self.position += 1;
                }
                TokenKind::AtKeyword if !self.inline => return self.consume_at_rule(),
                _ => {
                    let parsed = if !self.inline
                        && (self.blocks.is_empty() || self.block_opens_first())
                    {
                        self.consume_selector()
                    } else {
                        self.consume_declaration()
                    };
                    match parsed {
                        Ok(event) => return event,
                        Err(error) if error.is_end_of_input() => return self.fail(error),
                        Err(error) => skipped(&error),
                    }
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-an-at-rule)
    fn consume_at_rule(&mut self) -> GrammarEvent<'a> {
        let name = self.tokens[self.position].text;
        self.position += 1;

        let start = self.position;
        let mut depth = 0usize;
        let (end, opens_block) = loop {
            let Some(token) = self.peek() else {
                break (self.position, false);
            };
            match token.kind {
                _ if token.opens_group() => depth += 1,
                _ if token.closes_group() => depth = depth.saturating_sub(1),
                TokenKind::Semicolon if depth == 0 => {
                    self.position += 1;
                    break (self.position - 1, false);
                }
                TokenKind::LeftBrace if depth == 0 => {
                    self.position += 1;
                    break (self.position - 1, true);
                }
                // Left for the enclosing block to close.
                TokenKind::RightBrace if depth == 0 => break (self.position, false),
                _ => {}
            }
            self.position += 1;
        };

        let prelude = trim_whitespace(&self.tokens[start..end]).to_vec();
        if opens_block {
            self.blocks.push(Block::AtRule);
            GrammarEvent::BeginAtRule { name, prelude }
        } else {
            GrammarEvent::AtRule { name, prelude }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule),
    /// one comma-separated selector at a time.
    ///
    /// A selector cut short by `;` is dropped along with the block that
    /// follows it. One cut short by `}` is dropped and the `}` left to close
    /// the enclosing block.
    fn consume_selector(&mut self) -> Result<GrammarEvent<'a>, GrammarError> {
        let start = self.position;
        let mut depth = 0usize;
        loop {
            let Some(token) = self.peek() else {
                return Err(GrammarError::EndOfInput);
            };
            match token.kind {
                _ if token.opens_group() => depth += 1,
                _ if token.closes_group() => depth = depth.saturating_sub(1),
                TokenKind::Comma if depth == 0 => {
                    self.position += 1;
                    let selector = normalize_selector(&self.tokens[start..self.position - 1]);
                    return Ok(GrammarEvent::QualifiedRule { selector });
                }
                TokenKind::LeftBrace => {
                    self.position += 1;
                    let selector = normalize_selector(&self.tokens[start..self.position - 1]);
                    self.blocks.push(Block::Ruleset);
                    return Ok(GrammarEvent::BeginRuleset { selector });
                }
                TokenKind::Semicolon | TokenKind::RightBrace => {
                    if token.kind == TokenKind::Semicolon {
                        self.skip_rule_block();
                    }
                    return Err(GrammarError::UnexpectedToken {
                        offset: token.offset,
                        found: token.kind,
                    });
                }
                _ => {}
            }
            self.position += 1;
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    ///
    /// The terminating `;` or `}` is consumed with the declaration.
    fn consume_declaration(&mut self) -> Result<GrammarEvent<'a>, GrammarError> {
        let name_token = self.tokens[self.position];
        if !matches!(
            name_token.kind,
            TokenKind::Ident | TokenKind::CustomPropertyName
        ) {
            self.skip_declaration();
            return Err(GrammarError::UnexpectedToken {
                offset: name_token.offset,
                found: name_token.kind,
            });
        }
        self.position += 1;

        // "While the next input token is a <whitespace-token>, consume the next
        // input token. If the next input token is anything other than a
        // <colon-token>, this is a parse error."
        self.skip_whitespace();
        if self.peek().map(|t| t.kind) != Some(TokenKind::Colon) {
            self.skip_declaration();
            return Err(GrammarError::MissingColon {
                offset: name_token.offset,
            });
        }
        self.position += 1;

        let start = self.position;
        let mut depth = 0usize;
        let end = loop {
            let Some(token) = self.peek() else {
                break self.position;
            };
            match token.kind {
                _ if token.opens_group() => depth += 1,
                TokenKind::LeftBrace => depth += 1,
                _ if token.closes_group() => depth = depth.saturating_sub(1),
                TokenKind::RightBrace if depth > 0 => depth -= 1,
                TokenKind::Semicolon if depth == 0 => {
                    self.position += 1;
                    break self.position - 1;
                }
                TokenKind::RightBrace if !self.blocks.is_empty() => {
                    self.position += 1;
                    self.pending_close = true;
                    break self.position - 1;
                }
                TokenKind::RightBrace => break self.position,
                _ => {}
            }
            self.position += 1;
        };

        let value = trim_whitespace(&self.tokens[start..end]).to_vec();
        Ok(if name_token.kind == TokenKind::CustomPropertyName {
            GrammarEvent::CustomProperty {
                name: name_token.text,
                value,
            }
        } else {
            GrammarEvent::Declaration {
                property: name_token.text,
                value,
            }
        })
    }

    /// Skip the rest of a malformed declaration: through the next top-level
    /// `;`, or up to the `}` that closes the enclosing block.
    fn skip_declaration(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                _ if token.opens_group() => depth += 1,
                TokenKind::LeftBrace => depth += 1,
                _ if token.closes_group() => depth = depth.saturating_sub(1),
                TokenKind::RightBrace if depth > 0 => depth -= 1,
                TokenKind::Semicolon if depth == 0 => {
                    self.position += 1;
                    return;
                }
                TokenKind::RightBrace => return,
                _ => {}
            }
            self.position += 1;
        }
    }

    /// Skip a malformed rule through the end of its `{ ... }` block. Stops
    /// early at a `}` closing the enclosing block.
    fn skip_rule_block(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace if depth == 0 => return,
                TokenKind::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.position += 1;
                        return;
                    }
                }
                _ => {}
            }
            self.position += 1;
        }
    }

    fn close_block(&mut self) -> GrammarEvent<'a> {
        match self.blocks.pop() {
            Some(Block::AtRule) => GrammarEvent::EndAtRule,
            Some(Block::Ruleset) => GrammarEvent::EndRuleset,
            None => self.fail(GrammarError::EndOfInput),
        }
    }

    /// Whether a `{` comes before the next top-level `;` or `}`, which makes
    /// the upcoming item a nested ruleset rather than a declaration.
    fn block_opens_first(&self) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens[self.position..] {
            match token.kind {
                _ if token.opens_group() => depth += 1,
                _ if token.closes_group() => depth = depth.saturating_sub(1),
                TokenKind::LeftBrace if depth == 0 => return true,
                TokenKind::Semicolon | TokenKind::RightBrace if depth == 0 => return false,
                _ => {}
            }
        }
        false
    }

    fn fail(&mut self, error: GrammarError) -> GrammarEvent<'a> {
        self.error = Some(error.clone());
        GrammarEvent::Error(error)
    }

    fn peek(&self) -> Option<CSSToken<'a>> {
        self.tokens.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|t| t.is_whitespace()) {
            self.position += 1;
        }
    }
}

fn skipped(error: &GrammarError) {
    log::warn!("skipping malformed css: {error}");
}

/// Strip leading and trailing whitespace tokens.
fn trim_whitespace<'t, 'a>(tokens: &'t [CSSToken<'a>]) -> &'t [CSSToken<'a>] {
    let start = tokens
        .iter()
        .position(|t| !t.is_whitespace())
        .unwrap_or(tokens.len());
    let end = tokens
        .iter()
        .rposition(|t| !t.is_whitespace())
        .map_or(start, |i| i + 1);
    &tokens[start..end]
}

/// [Selectors § 16.1 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// Keeps only whitespace that acts as a descendant combinator: whitespace is
/// dropped at either end, next to `>`, `+` and `~`, inside attribute
/// brackets, and when repeated.
fn normalize_selector<'a>(tokens: &[CSSToken<'a>]) -> Vec<CSSToken<'a>> {
    let is_combinator = |t: &CSSToken<'_>| t.is_delim('>') || t.is_delim('+') || t.is_delim('~');
    let tokens = trim_whitespace(tokens);

    let mut out: Vec<CSSToken<'a>> = Vec::with_capacity(tokens.len());
    let mut brackets = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftBracket => brackets += 1,
            TokenKind::RightBracket => brackets = brackets.saturating_sub(1),
            TokenKind::Whitespace => {
                let next = tokens[i + 1..].iter().find(|t| !t.is_whitespace());
                let keep = brackets == 0
                    && out.last().is_some_and(|p| !p.is_whitespace() && !is_combinator(p))
                    && next.is_some_and(|n| !is_combinator(n));
                if !keep {
                    continue;
                }
            }
            _ => {}
        }
        out.push(*token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[CSSToken<'_>]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_selector_whitespace_normalization() {
        let tokens = CSSTokenizer::tokenize("  .a  >  .b   c [ x = y ]  ");
        assert_eq!(
            texts(&normalize_selector(&tokens)),
            vec![".", "a", ">", ".", "b", "   ", "c", " ", "[", "x", "=", "y", "]"]
        );
    }

    #[test]
    fn test_trim_whitespace_of_blank_list() {
        let tokens = CSSTokenizer::tokenize("   ");
        assert!(trim_whitespace(&tokens).is_empty());
    }

    #[test]
    fn test_end_of_input_is_sticky() {
        let mut parser = GrammarParser::stylesheet("}");
        assert_eq!(parser.next_event(), GrammarEvent::Error(GrammarError::EndOfInput));
        assert_eq!(parser.next_event(), GrammarEvent::Error(GrammarError::EndOfInput));
    }

    #[test]
    fn test_skip_rule_block_stops_at_enclosing_close() {
        let mut parser = GrammarParser::stylesheet("a; } b { c: d }");
        parser.skip_rule_block();
        assert_eq!(parser.tokens[parser.position].kind, TokenKind::RightBrace);
        assert_eq!(parser.position, 3);
    }
}
