use strum_macros::Display;

use super::character_reference::decode_character_references;
use super::error::TokenizeError;
use super::helpers::{is_name_terminator, is_whitespace_byte};
use super::token::{Attribute, Spanned, Token};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The content model the tokenizer is in between tokens. Tag, attribute and
/// comment states are handled inside a single token scan and never persist
/// across tokens.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Holds the name of the element whose end tag leaves the state.
    #[strum(to_string = "RAWTEXT")]
    RawText(String),
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    #[strum(to_string = "PLAINTEXT")]
    PlainText,
}

/// Elements whose content is emitted verbatim until the matching end tag.
const RAW_TEXT_ELEMENTS: [&str; 9] = [
    "iframe", "noembed", "noframes", "noscript", "script", "style", "textarea", "title", "xmp",
];

/// Streaming HTML tokenizer.
///
/// Tokens are produced lazily in document order, each tagged with its byte
/// offset. The tokenizer never fails on malformed markup; the only error is a
/// token larger than the configured buffer limit, after which the stream ends.
pub struct HTMLTokenizer<'a> {
    pub(super) input: &'a str,
    pub(super) current_pos: usize,
    pub(super) state: TokenizerState,
    max_buffer: Option<usize>,
    failed: bool,
}

impl<'a> HTMLTokenizer<'a> {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            current_pos: 0,
            state: TokenizerState::Data,
            max_buffer: None,
            failed: false,
        }
    }

    /// Limit the source length of any single token to `limit` bytes.
    #[must_use]
    pub const fn with_max_buffer(mut self, limit: usize) -> Self {
        self.max_buffer = Some(limit);
        self
    }

    /// Current content state.
    #[must_use]
    pub const fn state(&self) -> &TokenizerState {
        &self.state
    }

    /// Byte offset of the next unconsumed input byte.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.current_pos
    }

    /// Produce the next token, `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizeError::BufferExceeded`] when a token's source text is
    /// longer than the limit set with [`HTMLTokenizer::with_max_buffer`].
    pub fn next_token(&mut self) -> Result<Option<Spanned<Token>>, TokenizeError> {
        if self.failed {
            return Ok(None);
        }

        loop {
            let start = self.current_pos;
            if start >= self.input.len() {
                return Ok(None);
            }

            let token = match self.state.clone() {
                TokenizerState::Data => self.consume_data(),
                TokenizerState::RawText(tag) => self.consume_raw_text(&tag),
                TokenizerState::PlainText => Some(Token::Text {
                    data: self.consume_rest().to_string(),
                }),
            };

            // Nothing emitted: input was dropped or the state changed.
            let Some(token) = token else {
                continue;
            };

            let len = self.current_pos - start;
            if let Some(limit) = self.max_buffer
                && len > limit
            {
                self.failed = true;
                return Err(TokenizeError::BufferExceeded {
                    offset: start,
                    limit,
                });
            }

            return Ok(Some(Spanned {
                offset: start,
                len,
                token,
            }));
        }
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    /// and [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn consume_data(&mut self) -> Option<Token> {
        if self.peek_byte(0) == Some(b'<') {
            match self.peek_byte(1) {
                Some(c) if c.is_ascii_alphabetic() => return self.consume_start_tag(),
                Some(b'/') => match self.peek_byte(2) {
                    Some(c) if c.is_ascii_alphabetic() => return self.consume_end_tag(),
                    // "missing-end-tag-name parse error": `</>` is dropped.
                    Some(b'>') => {
                        self.current_pos += 3;
                        return None;
                    }
                    Some(_) => return Some(self.consume_bogus_comment(2)),
                    None => {}
                },
                Some(b'!') => return Some(self.consume_markup_declaration()),
                // "unexpected-question-mark-instead-of-tag-name parse error"
                Some(b'?') => return Some(self.consume_bogus_comment(1)),
                _ => {}
            }
        }
        Some(self.consume_text())
    }

    /// Character data up to the next position that opens markup.
    fn consume_text(&mut self) -> Token {
        let start = self.current_pos;
        let mut search_from = start + 1;
        let end = loop {
            match self.find_from(search_from, "<") {
                Some(lt) if self.starts_markup(lt) => break lt,
                Some(lt) => search_from = lt + 1,
                None => break self.input.len(),
            }
        };
        self.current_pos = end;
        Token::Text {
            data: self.input[start..end].to_string(),
        }
    }

    /// Whether the `<` at `at` begins a tag, comment or declaration.
    fn starts_markup(&self, at: usize) -> bool {
        let bytes = self.input.as_bytes();
        match bytes.get(at + 1) {
            Some(c) if c.is_ascii_alphabetic() => true,
            Some(b'!' | b'?') => true,
            Some(b'/') => bytes.get(at + 2).is_some(),
            _ => false,
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the lowercase version of the current input character ... to the
    /// current tag token's tag name."
    fn consume_tag_name(&mut self) -> String {
        self.consume_while(|b| !is_name_terminator(b))
            .to_ascii_lowercase()
    }

    /// Start tag from `<` up to and including `>`.
    fn consume_start_tag(&mut self) -> Option<Token> {
        self.current_pos += 1; // <
        let name = self.consume_tag_name();
        let (attributes, self_closing) = self.consume_tag_body()?;

        if name == "plaintext" {
            self.state = TokenizerState::PlainText;
        } else if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.state = TokenizerState::RawText(name.clone());
        }

        Some(Token::StartTag {
            name,
            self_closing,
            attributes,
        })
    }

    /// End tag from `</` up to and including `>`.
    fn consume_end_tag(&mut self) -> Option<Token> {
        self.current_pos += 2; // </
        let name = self.consume_tag_name();
        // "end-tag-with-attributes parse error": attributes are dropped.
        let _ = self.consume_tag_body()?;
        Some(Token::EndTag { name })
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    /// through [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    ///
    /// Returns `None` on "eof-in-tag": the unfinished tag is not emitted.
    fn consume_tag_body(&mut self) -> Option<(Vec<Attribute>, bool)> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_byte(0) {
                None => {
                    log::trace!("eof-in-tag at byte {}", self.current_pos);
                    return None;
                }
                Some(b'>') => {
                    self.current_pos += 1;
                    return Some((attributes, false));
                }
                Some(b'/') => {
                    self.current_pos += 1;
                    if self.peek_byte(0) == Some(b'>') {
                        self.current_pos += 1;
                        return Some((attributes, true));
                    }
                }
                Some(_) => attributes.push(self.consume_attribute()),
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    /// and the attribute value states that follow it.
    fn consume_attribute(&mut self) -> Attribute {
        let start = self.current_pos;
        // "unexpected-equals-sign-before-attribute-name": a leading `=` is
        // part of the name.
        self.advance_char();
        let _ = self.consume_while(|b| !is_name_terminator(b) && b != b'=');
        let name = self.input[start..self.current_pos].to_ascii_lowercase();

        self.skip_whitespace();
        if self.peek_byte(0) != Some(b'=') {
            return Attribute::new(name, String::new());
        }
        self.current_pos += 1; // =
        self.skip_whitespace();

        let raw = match self.peek_byte(0) {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = self.current_pos + 1;
                let quote = if quote == b'"' { "\"" } else { "'" };
                if let Some(end) = self.find_from(value_start, quote) {
                    self.current_pos = end + 1;
                    &self.input[value_start..end]
                } else {
                    self.current_pos = self.input.len();
                    &self.input[value_start..]
                }
            }
            // "missing-attribute-value parse error"
            Some(b'>') | None => "",
            Some(_) => self.consume_while(|b| !is_whitespace_byte(b) && b != b'>'),
        };

        Attribute::new(name, decode_character_references(raw).into_owned())
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn consume_markup_declaration(&mut self) -> Token {
        if self.next_few_characters_are("<!--") {
            return self.consume_comment();
        }
        if self.next_few_characters_are_case_insensitive("<!doctype") {
            let body_start = self.current_pos + 2;
            let raw = match self.find_from(body_start, ">") {
                Some(end) => {
                    self.current_pos = end + 1;
                    &self.input[body_start..end]
                }
                None => {
                    self.current_pos = self.input.len();
                    &self.input[body_start..]
                }
            };
            return Token::Doctype {
                raw: raw.to_string(),
            };
        }
        // "incorrectly-opened-comment parse error"; CDATA lands here as well.
        self.consume_bogus_comment(2)
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    /// through [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn consume_comment(&mut self) -> Token {
        // "abrupt-closing-of-empty-comment": `<!-->` and `<!--->`.
        for empty in ["<!-->", "<!--->"] {
            if self.next_few_characters_are(empty) {
                self.current_pos += empty.len();
                return Token::Comment {
                    data: String::new(),
                };
            }
        }

        let data_start = self.current_pos + 4;
        let data = match self.find_from(data_start, "-->") {
            Some(end) => {
                self.current_pos = end + 3;
                &self.input[data_start..end]
            }
            // "eof-in-comment"
            None => {
                self.current_pos = self.input.len();
                &self.input[data_start..]
            }
        };
        Token::Comment {
            data: data.to_string(),
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// `skip` is the length of the opening sequence (`<?`, `<!`, `</`) minus
    /// the characters that belong to the comment data.
    fn consume_bogus_comment(&mut self, skip: usize) -> Token {
        let data_start = self.current_pos + skip;
        let data = match self.find_from(data_start, ">") {
            Some(end) => {
                self.current_pos = end + 1;
                &self.input[data_start..end]
            }
            None => {
                self.current_pos = self.input.len();
                &self.input[data_start..]
            }
        };
        Token::Comment {
            data: data.to_string(),
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Everything up to the "appropriate end tag token" is one text token. The
    /// end tag itself is left for the data state.
    fn consume_raw_text(&mut self, tag: &str) -> Option<Token> {
        let start = self.current_pos;
        let end = self.find_appropriate_end_tag(start, tag);
        self.state = TokenizerState::Data;
        if end == start {
            return None;
        }
        self.current_pos = end;
        Some(Token::Text {
            data: self.input[start..end].to_string(),
        })
    }

    /// Offset of the first `</tag` (ASCII case-insensitive) followed by
    /// whitespace, `/` or `>`, or the end of input if there is none.
    fn find_appropriate_end_tag(&self, from: usize, tag: &str) -> usize {
        let bytes = self.input.as_bytes();
        let mut search_from = from;
        while let Some(lt) = self.find_from(search_from, "</") {
            let name_start = lt + 2;
            let name_end = name_start + tag.len();
            let name_matches = bytes
                .get(name_start..name_end)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag.as_bytes()));
            if name_matches && bytes.get(name_end).copied().is_some_and(is_name_terminator) {
                return lt;
            }
            search_from = name_start;
        }
        self.input.len()
    }
}

impl Iterator for HTMLTokenizer<'_> {
    type Item = Result<Spanned<Token>, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        HTMLTokenizer::new(input)
            .map(|t| t.map(|s| s.token))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_raw_text_state_follows_style_start_tag() {
        let mut tokenizer = HTMLTokenizer::new("<style>a<b</style>");
        let _ = tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.state().to_string(), "RAWTEXT");
        let text = tokenizer.next_token().unwrap().unwrap();
        assert_eq!(
            text.token,
            Token::Text {
                data: "a<b".to_string()
            }
        );
        assert_eq!(tokenizer.state(), &TokenizerState::Data);
    }

    #[test]
    fn test_empty_end_tag_is_dropped() {
        assert_eq!(
            tokens("a</>b"),
            vec![
                Token::Text {
                    data: "a".to_string()
                },
                Token::Text {
                    data: "b".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unfinished_tag_at_eof_is_dropped() {
        assert_eq!(
            tokens("x<div class=\"a"),
            vec![Token::Text {
                data: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_buffer_limit() {
        let mut tokenizer = HTMLTokenizer::new("<p>0123456789</p>").with_max_buffer(5);
        assert!(tokenizer.next_token().unwrap().is_some());
        assert_eq!(
            tokenizer.next_token(),
            Err(TokenizeError::BufferExceeded { offset: 3, limit: 5 })
        );
        assert_eq!(tokenizer.next_token(), Ok(None));
    }
}
