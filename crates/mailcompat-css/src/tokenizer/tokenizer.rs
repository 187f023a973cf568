use super::token::{CSSToken, TokenKind};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// Streaming CSS tokenizer. Comments are consumed and never produce tokens.
/// Every token borrows its source text from the input.
pub struct CSSTokenizer<'a> {
    /// The input being tokenized.
    input: &'a str,
    /// Byte offset of the next unconsumed code point.
    position: usize,
}

impl<'a> CSSTokenizer<'a> {
    /// Create a new CSS tokenizer over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Byte offset of the next unconsumed code point.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.position
    }

    /// Tokenize the whole input.
    #[must_use]
    pub fn tokenize(input: &'a str) -> Vec<CSSToken<'a>> {
        Self::new(input).collect()
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// Returns `None` at end of input.
    pub fn next_token(&mut self) -> Option<CSSToken<'a>> {
        // "Consume comments."
        self.consume_comments();

        let start = self.position;
        // "Consume the next input code point."
        let c = self.consume()?;

        let kind = match c {
            // "whitespace"
            c if is_whitespace(c) => {
                self.consume_whitespace();
                TokenKind::Whitespace
            }

            // "U+0022 QUOTATION MARK (")" / "U+0027 APOSTROPHE (')"
            '"' | '\'' => self.consume_string_token(c),

            // "U+0023 NUMBER SIGN (#)"
            '#' => {
                // "If the next input code point is an ident code point or the next
                // two input code points are a valid escape..."
                if self.peek().is_some_and(is_ident_code_point) || is_valid_escape(self.rest())
                {
                    self.consume_ident_sequence();
                    TokenKind::Hash
                } else {
                    TokenKind::Delim
                }
            }

            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,

            // "U+002B PLUS SIGN (+)" / "U+002E FULL STOP (.)"
            '+' | '.' => {
                // "If the input stream starts with a number, reconsume the current
                // input code point, consume a numeric token, and return it."
                if starts_number(&self.input[start..]) {
                    self.position = start;
                    self.consume_numeric_token()
                } else {
                    TokenKind::Delim
                }
            }

            // "U+002D HYPHEN-MINUS (-)"
            '-' => {
                if starts_number(&self.input[start..]) {
                    self.position = start;
                    self.consume_numeric_token()
                }
                // "Otherwise, if the next 2 input code points are U+002D U+003E (->)..."
                else if self.rest().starts_with("->") {
                    self.position += 2;
                    TokenKind::CDC
                }
                // "Otherwise, if the input stream starts with an ident sequence..."
                else if starts_ident(&self.input[start..]) {
                    self.position = start;
                    self.consume_ident_like_token()
                } else {
                    TokenKind::Delim
                }
            }

            // "U+003C LESS-THAN SIGN (<)"
            '<' => {
                // "If the next 3 input code points are U+0021 U+002D U+002D (!--)..."
                if self.rest().starts_with("!--") {
                    self.position += 3;
                    TokenKind::CDO
                } else {
                    TokenKind::Delim
                }
            }

            // "U+0040 COMMERCIAL AT (@)"
            '@' => {
                // "If the next 3 input code points would start an ident sequence..."
                if starts_ident(self.rest()) {
                    self.consume_ident_sequence();
                    TokenKind::AtKeyword
                } else {
                    TokenKind::Delim
                }
            }

            // "U+005C REVERSE SOLIDUS (\)"
            '\\' => {
                if is_valid_escape(&self.input[start..]) {
                    self.position = start;
                    self.consume_ident_like_token()
                } else {
                    // "This is a parse error."
                    TokenKind::Delim
                }
            }

            // "digit"
            c if c.is_ascii_digit() => {
                self.position = start;
                self.consume_numeric_token()
            }

            // "ident-start code point"
            c if is_ident_start_code_point(c) => {
                self.position = start;
                self.consume_ident_like_token()
            }

            // "anything else"
            _ => TokenKind::Delim,
        };

        Some(CSSToken::new(
            kind,
            &self.input[start..self.position],
            start,
        ))
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// "consume them and all following code points up to and including the
    /// first U+002A ASTERISK (*) followed by U+002F SOLIDUS (/), or up to an
    /// EOF code point."
    fn consume_comments(&mut self) {
        while self.rest().starts_with("/*") {
            self.position = match self.input[self.position + 2..].find("*/") {
                Some(end) => self.position + 2 + end + 2,
                None => self.input.len(),
            };
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char) -> TokenKind {
        loop {
            match self.peek() {
                // "EOF": "This is a parse error. Return the <string-token>."
                None => return TokenKind::String,
                // "newline": "This is a parse error. Reconsume the current input
                // code point, create a <bad-string-token>, and return it."
                Some('\n') => return TokenKind::BadString,
                Some('\\') => {
                    self.position += 1;
                    // Either an escaped newline or an escaped code point; both
                    // are skipped whole.
                    let _ = self.consume();
                }
                Some(c) => {
                    self.position += c.len_utf8();
                    if c == ending_code_point {
                        return TokenKind::String;
                    }
                }
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> TokenKind {
        self.consume_number();

        // "If the next 3 input code points would start an ident sequence..."
        if starts_ident(self.rest()) {
            self.consume_ident_sequence();
            TokenKind::Dimension
        }
        // "Otherwise, if the next input code point is U+0025 PERCENTAGE SIGN (%)..."
        else if self.peek() == Some('%') {
            self.position += 1;
            TokenKind::Percentage
        } else {
            TokenKind::Number
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) {
        let bytes = self.input.as_bytes();
        let digit_at = |pos: usize| bytes.get(pos).is_some_and(u8::is_ascii_digit);

        // "If the next input code point is U+002B PLUS SIGN (+) or U+002D
        // HYPHEN-MINUS (-), consume it."
        if matches!(bytes.get(self.position), Some(b'+' | b'-')) {
            self.position += 1;
        }
        while digit_at(self.position) {
            self.position += 1;
        }
        // "If the next 2 input code points are U+002E FULL STOP (.) followed by
        // a digit..."
        if bytes.get(self.position) == Some(&b'.') && digit_at(self.position + 1) {
            self.position += 1;
            while digit_at(self.position) {
                self.position += 1;
            }
        }
        // "If the next 2 or 3 input code points are U+0045 (E) or U+0065 (e),
        // optionally followed by U+002D (-) or U+002B (+), followed by a digit..."
        if matches!(bytes.get(self.position), Some(b'e' | b'E')) {
            let signed = matches!(bytes.get(self.position + 1), Some(b'+' | b'-'));
            let digit_pos = self.position + if signed { 2 } else { 1 };
            if digit_at(digit_pos) {
                self.position = digit_pos;
                while digit_at(self.position) {
                    self.position += 1;
                }
            }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn consume_ident_like_token(&mut self) -> TokenKind {
        let start = self.position;
        self.consume_ident_sequence();
        let name = &self.input[start..self.position];

        if self.peek() != Some('(') {
            return if name.starts_with("--") {
                TokenKind::CustomPropertyName
            } else {
                TokenKind::Ident
            };
        }
        self.position += 1; // (

        if !name.eq_ignore_ascii_case("url") {
            return TokenKind::Function;
        }

        let after_paren = self.position;
        self.consume_whitespace();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                // A quoted argument followed by `)` still forms one url token.
                self.position += 1;
                if self.consume_string_token(quote) == TokenKind::String {
                    self.consume_whitespace();
                    if self.peek() == Some(')') {
                        self.position += 1;
                        return TokenKind::Url;
                    }
                }
                self.position = after_paren;
                TokenKind::Function
            }
            _ => self.consume_url_token(),
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> TokenKind {
        loop {
            match self.consume() {
                // "U+0029 RIGHT PARENTHESIS ())" / "EOF"
                Some(')') | None => return TokenKind::Url,
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    match self.peek() {
                        Some(')') => {
                            self.position += 1;
                            return TokenKind::Url;
                        }
                        None => return TokenKind::Url,
                        Some(_) => {
                            self.consume_bad_url_remnants();
                            return TokenKind::BadUrl;
                        }
                    }
                }
                Some('"' | '\'' | '(') => {
                    self.consume_bad_url_remnants();
                    return TokenKind::BadUrl;
                }
                Some('\\') => {
                    if is_valid_escape(&self.input[self.position - 1..]) {
                        let _ = self.consume();
                    } else {
                        self.consume_bad_url_remnants();
                        return TokenKind::BadUrl;
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') => {
                    let _ = self.consume();
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) {
        loop {
            match self.peek() {
                Some(c) if is_ident_code_point(c) => self.position += c.len_utf8(),
                Some('\\') if is_valid_escape(self.rest()) => {
                    self.position += 1;
                    self.consume_escaped_code_point();
                }
                _ => return,
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Only advances; the escaped value itself is not needed.
    fn consume_escaped_code_point(&mut self) {
        match self.consume() {
            // "hex digit": "Consume as many hex digits as possible, but no more
            // than 5. ... If the next input code point is whitespace, consume it."
            Some(c) if c.is_ascii_hexdigit() => {
                for _ in 0..5 {
                    if !self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        break;
                    }
                    self.position += 1;
                }
                if self.peek().is_some_and(is_whitespace) {
                    self.position += 1;
                }
            }
            _ => {}
        }
    }

    /// The unconsumed part of the input.
    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the next code point.
    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }
}

impl<'a> Iterator for CSSTokenizer<'a> {
    type Item = CSSToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(s: &str) -> bool {
    let mut chars = s.chars();
    // "If the first code point is not U+005C REVERSE SOLIDUS (\), return false.
    // Otherwise, if the second code point is a newline, return false."
    chars.next() == Some('\\') && chars.next() != Some('\n')
}

/// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
fn starts_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        // "U+002D HYPHEN-MINUS": "If the second code point is an ident-start code
        // point or a U+002D HYPHEN-MINUS, or the second and third code points are
        // a valid escape, return true."
        Some('-') => {
            let rest = chars.as_str();
            rest.chars()
                .next()
                .is_some_and(|c| is_ident_start_code_point(c) || c == '-')
                || is_valid_escape(rest)
        }
        Some(c) if is_ident_start_code_point(c) => true,
        Some('\\') => is_valid_escape(s),
        _ => false,
    }
}

/// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
fn starts_number(s: &str) -> bool {
    let bytes = s.as_bytes();
    let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
    match bytes.first() {
        Some(b'+' | b'-') => digit_at(1) || (bytes.get(1) == Some(&b'.') && digit_at(2)),
        Some(b'.') => digit_at(1),
        Some(b) => b.is_ascii_digit(),
        None => false,
    }
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        CSSTokenizer::new(input).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_quoted_url_is_one_token() {
        assert_eq!(
            kinds("url( 'a b.png' )"),
            vec![(TokenKind::Url, "url( 'a b.png' )")]
        );
    }

    #[test]
    fn test_unterminated_quoted_url_falls_back_to_function() {
        assert_eq!(
            kinds("url('a' x)")[0],
            (TokenKind::Function, "url(")
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("a/* x */b/* open"),
            vec![(TokenKind::Ident, "a"), (TokenKind::Ident, "b")]
        );
    }
}
