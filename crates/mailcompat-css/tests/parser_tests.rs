//! Integration tests for the CSS grammar event parser.

use mailcompat_css::{GrammarError, GrammarEvent, GrammarParser};

/// Simplified view of an event: its name, the event's own text and the text
/// of its tokens.
#[derive(Debug, PartialEq, Eq)]
struct Seen {
    kind: &'static str,
    data: String,
    tokens: Vec<String>,
    end: usize,
}

fn events(parser: &mut GrammarParser<'_>) -> (Vec<Seen>, GrammarError) {
    let mut seen = Vec::new();
    loop {
        let event = parser.next_event();
        let data = match &event {
            GrammarEvent::AtRule { name, .. }
            | GrammarEvent::BeginAtRule { name, .. }
            | GrammarEvent::CustomProperty { name, .. } => (*name).to_string(),
            GrammarEvent::Declaration { property, .. } => (*property).to_string(),
            GrammarEvent::Error(error) => return (seen, error.clone()),
            _ => String::new(),
        };
        seen.push(Seen {
            kind: event.kind(),
            data,
            tokens: event.tokens().iter().map(ToString::to_string).collect(),
            end: parser.offset(),
        });
    }
}

fn stylesheet(input: &str) -> (Vec<Seen>, GrammarError) {
    events(&mut GrammarParser::stylesheet(input))
}

fn kinds(seen: &[Seen]) -> Vec<&'static str> {
    seen.iter().map(|s| s.kind).collect()
}

#[test]
fn test_simple_ruleset() {
    let (seen, error) = stylesheet("a { color: red; }");
    assert_eq!(error, GrammarError::EndOfInput);
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration", "EndRuleset"]);
    assert_eq!(seen[0].tokens, vec!["a"]);
    assert_eq!(seen[0].end, 3);
    assert_eq!(seen[1].data, "color");
    assert_eq!(seen[1].tokens, vec!["red"]);
    assert_eq!(seen[1].end, 15);
    assert_eq!(seen[2].end, 17);
}

#[test]
fn test_declaration_consumes_closing_brace() {
    let (seen, _) = stylesheet("a{b:c}");
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration", "EndRuleset"]);
    assert_eq!(seen[1].end, 6);
    assert_eq!(seen[2].end, 6);
}

#[test]
fn test_selector_list_is_split_at_commas() {
    let (seen, _) = stylesheet(".grid, .notgrid > p {}");
    assert_eq!(kinds(&seen), vec!["QualifiedRule", "BeginRuleset", "EndRuleset"]);
    assert_eq!(seen[0].tokens, vec![".", "grid"]);
    assert_eq!(seen[0].end, 6);
    assert_eq!(seen[1].tokens, vec![".", "notgrid", ">", "p"]);
}

#[test]
fn test_comma_inside_functional_pseudo_does_not_split() {
    let (seen, _) = stylesheet(":is(a, b) {}");
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "EndRuleset"]);
    assert_eq!(seen[0].tokens[1], "is(");
}

#[test]
fn test_at_rules() {
    let (seen, _) = stylesheet(
        "@import url(a.css);\n@media (max-width: 700px) { .a { width: 1px } }",
    );
    assert_eq!(
        kinds(&seen),
        vec![
            "AtRule",
            "BeginAtRule",
            "BeginRuleset",
            "Declaration",
            "EndRuleset",
            "EndAtRule"
        ]
    );
    assert_eq!(seen[0].data, "@import");
    assert_eq!(seen[0].tokens, vec!["url(a.css)"]);
    assert_eq!(seen[1].data, "@media");
    assert_eq!(
        seen[1].tokens,
        vec!["(", "max-width", ":", " ", "700px", ")"]
    );
}

#[test]
fn test_nested_at_rules() {
    let (seen, _) = stylesheet("@media screen { @media print { a { b: c; } } }");
    assert_eq!(
        kinds(&seen),
        vec![
            "BeginAtRule",
            "BeginAtRule",
            "BeginRuleset",
            "Declaration",
            "EndRuleset",
            "EndAtRule",
            "EndAtRule"
        ]
    );
}

#[test]
fn test_block_at_rule_with_declarations() {
    let (seen, _) = stylesheet("@font-face { font-family: X; src: url(x.woff2) }");
    assert_eq!(
        kinds(&seen),
        vec!["BeginAtRule", "Declaration", "Declaration", "EndAtRule"]
    );
}

#[test]
fn test_keyframes_selectors() {
    let (seen, _) = stylesheet("@keyframes spin { from { a: b } 50% { a: c } }");
    assert_eq!(seen[1].tokens, vec!["from"]);
    assert_eq!(seen[4].tokens, vec!["50%"]);
}

#[test]
fn test_custom_property_and_important() {
    let (seen, _) = stylesheet(":root { --brand: #333; color: var(--brand) !important; }");
    assert_eq!(seen[1].kind, "CustomProperty");
    assert_eq!(seen[1].data, "--brand");
    assert_eq!(seen[2].tokens, vec!["var(", "--brand", ")", " ", "!", "important"]);
}

#[test]
fn test_inline_declaration_list() {
    let mut parser = GrammarParser::inline("background: url('img.webp') no-repeat; color: black");
    let (seen, error) = events(&mut parser);
    assert_eq!(error, GrammarError::EndOfInput);
    assert_eq!(kinds(&seen), vec!["Declaration", "Declaration"]);
    assert_eq!(seen[0].tokens, vec!["url('img.webp')", " ", "no-repeat"]);
    assert_eq!(seen[1].tokens, vec!["black"]);
}

#[test]
fn test_inline_mode_skips_blocks() {
    let mut parser = GrammarParser::inline("a { b: c }; color: red");
    let (seen, error) = events(&mut parser);
    assert_eq!(error, GrammarError::EndOfInput);
    assert_eq!(kinds(&seen), vec!["Declaration"]);
    assert_eq!(seen[0].data, "color");
}

#[test]
fn test_cdo_cdc_ignored_at_top_level() {
    let (seen, _) = stylesheet("<!-- a { b: c } -->");
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration", "EndRuleset"]);
}

#[test]
fn test_declaration_without_colon_is_skipped() {
    let (seen, error) = stylesheet("a { b c; d: e }");
    assert_eq!(error, GrammarError::EndOfInput);
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration", "EndRuleset"]);
    assert_eq!(seen[1].data, "d");
    assert_eq!(seen[1].tokens, vec!["e"]);
}

#[test]
fn test_star_hack_is_skipped_to_block_end() {
    let (seen, _) = stylesheet(".a { *zoom: 1 }
.b { display: flex; }");
    assert_eq!(
        kinds(&seen),
        vec!["BeginRuleset", "EndRuleset", "BeginRuleset", "Declaration", "EndRuleset"]
    );
    assert_eq!(seen[3].data, "display");
}

#[test]
fn test_selector_cut_by_semicolon_drops_its_block() {
    let (seen, _) = stylesheet(".a; { color: red }
.b { display: flex }");
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration", "EndRuleset"]);
    assert_eq!(seen[0].tokens, vec![".", "b"]);
    assert_eq!(seen[1].data, "display");
}

#[test]
fn test_stray_close_brace_is_skipped() {
    let (seen, _) = stylesheet("} a { b: c }");
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration", "EndRuleset"]);
}

#[test]
fn test_dangling_selector_inside_at_rule() {
    let (seen, _) = stylesheet("@media print { .a } .b { c: d }");
    assert_eq!(
        kinds(&seen),
        vec!["BeginAtRule", "EndAtRule", "BeginRuleset", "Declaration", "EndRuleset"]
    );
}

#[test]
fn test_unclosed_block_ends_with_end_of_input() {
    let (seen, error) = stylesheet("a { b: c");
    assert_eq!(kinds(&seen), vec!["BeginRuleset", "Declaration"]);
    assert_eq!(error, GrammarError::EndOfInput);
}
