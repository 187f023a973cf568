//! Character reference decoding for attribute values.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Only attribute values are decoded; text content is forwarded untouched.

use std::borrow::Cow;

use super::named_character_references::{LONGEST_ENTITY, lookup_entity};

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column of that row."
const fn windows_1252_replacement(code: u32) -> Option<char> {
    Some(match code {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x8B => '\u{2039}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x99 => '\u{2122}',
        0x9B => '\u{203A}',
        _ => return None,
    })
}

/// Decode the character references in an attribute value.
///
/// Unrecognized references are left as written. Borrows when the value has no
/// `&` at all.
#[must_use]
pub fn decode_character_references(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];
        match decode_one(rest) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &rest[consumed..];
            }
            None => out.push('&'),
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode the reference at the start of `after_amp`, returning the replacement
/// and the number of bytes consumed.
fn decode_one(after_amp: &str) -> Option<(Cow<'static, str>, usize)> {
    if let Some(numeric) = after_amp.strip_prefix('#') {
        let (code, consumed) = parse_numeric(numeric)?;
        return Some((Cow::Owned(code.to_string()), consumed + 1));
    }

    // [§ 13.2.5.73 Named character reference state]
    // "Consume the maximum number of characters possible..."
    let candidate_len = after_amp
        .bytes()
        .take(LONGEST_ENTITY)
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b';')
        .count();
    (1..=candidate_len)
        .rev()
        .find_map(|len| lookup_entity(&after_amp[..len]).map(|text| (Cow::Borrowed(text), len)))
}

/// [§ 13.2.5.74 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
///
/// `input` starts just after `&#`.
fn parse_numeric(input: &str) -> Option<(char, usize)> {
    let (radix, prefix) = match input.as_bytes().first() {
        Some(b'x' | b'X') => (16, 1),
        _ => (10, 0),
    };
    let digits = input[prefix..]
        .bytes()
        .take_while(|b| b.is_ascii_digit() || (radix == 16 && b.is_ascii_hexdigit()))
        .count();
    if digits == 0 {
        return None;
    }

    let mut consumed = prefix + digits;
    if input.as_bytes().get(consumed) == Some(&b';') {
        consumed += 1;
    }

    // Oversized values saturate and fall through to the replacement character.
    let code = u32::from_str_radix(&input[prefix..prefix + digits], radix).unwrap_or(u32::MAX);
    let c = match code {
        0 => '\u{FFFD}',
        _ => windows_1252_replacement(code)
            .or_else(|| char::from_u32(code))
            .unwrap_or('\u{FFFD}'),
    };
    Some((c, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_without_ampersand_is_borrowed() {
        assert!(matches!(
            decode_character_references("plain"),
            Cow::Borrowed("plain")
        ));
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_character_references("&#65;&#x42;&#X43"), "ABC");
        assert_eq!(decode_character_references("&#x92;"), "\u{2019}");
        assert_eq!(decode_character_references("&#0;"), "\u{FFFD}");
        assert_eq!(decode_character_references("&#;"), "&#;");
    }

    #[test]
    fn test_named_references_prefer_longest_match() {
        assert_eq!(decode_character_references("a&amp;b"), "a&b");
        assert_eq!(decode_character_references("a&ampb"), "a&b");
        assert_eq!(decode_character_references("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_accented_and_typographic_references() {
        assert_eq!(decode_character_references("caf&eacute;"), "caf\u{00E9}");
        assert_eq!(decode_character_references("caf&eacute"), "caf\u{00E9}");
        assert_eq!(
            decode_character_references("it&rsquo;s &thetasym;"),
            "it\u{2019}s \u{03D1}"
        );
        assert_eq!(decode_character_references("&rsquo"), "&rsquo");
    }
}
