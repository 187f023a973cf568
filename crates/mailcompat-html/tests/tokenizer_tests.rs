//! Integration tests for the HTML tokenizer.

use mailcompat_html::{Attribute, HTMLTokenizer, Spanned, Token, TokenizeError};
use quickcheck_macros::quickcheck;

/// Helper to tokenize a string and return the spanned tokens.
fn tokenize(input: &str) -> Vec<Spanned<Token>> {
    HTMLTokenizer::new(input)
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn tokens(input: &str) -> Vec<Token> {
    tokenize(input).into_iter().map(|s| s.token).collect()
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

#[test]
fn test_plain_text() {
    assert_eq!(tokens("Hello"), vec![text("Hello")]);
}

#[test]
fn test_doctype() {
    let tokens = tokens("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 1);
    assert_eq!(
        tokens[0].doctype_literal().as_deref(),
        Some("<!DOCTYPE html>")
    );
}

#[test]
fn test_lowercase_doctype_keeps_source_case() {
    let tokens = tokens("<!doctype HTML>");
    assert_eq!(
        tokens[0],
        Token::Doctype {
            raw: "doctype HTML".to_string()
        }
    );
}

#[test]
fn test_start_tag() {
    match &tokens("<DIV>")[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            assert!(attributes.is_empty());
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

#[test]
fn test_end_tag() {
    assert_eq!(
        tokens("</Div >"),
        vec![Token::EndTag {
            name: "div".to_string()
        }]
    );
}

#[test]
fn test_self_closing_tag() {
    match &tokens("<br/>")[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        other => panic!("Expected self-closing StartTag token, got {other:?}"),
    }
}

#[test]
fn test_attributes() {
    let tokens = tokens(r#"<input TYPE="Submit" value='a b' checked data-x=1>"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(
        attributes,
        &vec![
            Attribute::new("type".to_string(), "Submit".to_string()),
            Attribute::new("value".to_string(), "a b".to_string()),
            Attribute::new("checked".to_string(), String::new()),
            Attribute::new("data-x".to_string(), "1".to_string()),
        ]
    );
}

#[test]
fn test_attribute_character_references_are_decoded() {
    let tokens = tokens(r#"<a href="?a=1&amp;b=2&#33;">"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("Expected StartTag token");
    };
    assert_eq!(attributes[0].value, "?a=1&b=2!");
}

#[test]
fn test_unquoted_value_before_self_closing_slash() {
    let tokens = tokens("<img src=a.png />");
    let Token::StartTag {
        attributes,
        self_closing,
        ..
    } = &tokens[0]
    else {
        panic!("Expected StartTag token");
    };
    assert_eq!(attributes[0].value, "a.png");
    assert!(self_closing);
}

#[test]
fn test_comments() {
    assert_eq!(
        tokens("<!-- hi --><!--><!--->"),
        vec![
            Token::Comment {
                data: " hi ".to_string()
            },
            Token::Comment {
                data: String::new()
            },
            Token::Comment {
                data: String::new()
            },
        ]
    );
}

#[test]
fn test_bogus_comments() {
    assert_eq!(
        tokens("<?xml version=\"1.0\"?><![CDATA[x]]>"),
        vec![
            Token::Comment {
                data: "?xml version=\"1.0\"?".to_string()
            },
            Token::Comment {
                data: "[CDATA[x]]".to_string()
            },
        ]
    );
}

#[test]
fn test_stray_less_than_is_text() {
    assert_eq!(tokens("a < b <"), vec![text("a < b <")]);
}

#[test]
fn test_style_content_is_one_verbatim_token() {
    let css = "\n  a > b { color: red }\n  </p> <b>\n";
    let input = format!("<style type=\"text/css\">{css}</STYLE><p>");
    let tokens = tokens(&input);
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[1], text(css));
    assert_eq!(tokens[2].tag_name(), Some("style"));
    assert_eq!(tokens[3].tag_name(), Some("p"));
}

#[test]
fn test_raw_text_end_tag_needs_terminator() {
    let tokens = tokens("<style></styles></style>");
    assert_eq!(tokens[1], text("</styles>"));
    assert_eq!(tokens[2].tag_name(), Some("style"));
}

#[test]
fn test_empty_style_element() {
    assert_eq!(tokens("<style></style>").len(), 2);
}

#[test]
fn test_offsets() {
    let spans = tokenize("ab<p class=x>\n<!--c--></p>");
    let offsets: Vec<(usize, usize)> = spans.iter().map(|s| (s.offset, s.len)).collect();
    assert_eq!(offsets, vec![(0, 2), (2, 11), (13, 1), (14, 8), (22, 4)]);
}

#[test]
fn test_buffer_exceeded_stops_the_stream() {
    let mut tokenizer =
        HTMLTokenizer::new("<p>short</p><!-- a much longer comment -->").with_max_buffer(12);
    let results: Vec<_> = tokenizer.by_ref().collect();
    assert_eq!(results.len(), 4);
    assert_eq!(
        results[3],
        Err(TokenizeError::BufferExceeded {
            offset: 12,
            limit: 12
        })
    );
    assert_eq!(tokenizer.next_token(), Ok(None));
}

#[test]
fn test_display_round_trips_simple_markup() {
    let input = "<p class=\"a\">x</p>";
    let rendered: String = tokens(input).iter().map(ToString::to_string).collect();
    assert_eq!(rendered, input);
}

#[quickcheck]
fn spans_never_overlap(input: String) -> bool {
    let mut expected = 0;
    for span in tokenize(&input) {
        if span.offset < expected {
            return false;
        }
        expected = span.end();
    }
    expected <= input.len()
}
