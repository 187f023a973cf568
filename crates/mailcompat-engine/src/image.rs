//! Image format detection for `src`, `srcset` and CSS `url(...)` values.
//!
//! The format is the file extension of the URL path, or `base64` for inline
//! `data:` URLs. URLs that do not parse as a URL reference are skipped.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{is_whitespace, trim_whitespace};

/// `url(...)` with one optional quote or space inside each parenthesis.
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(['"\t\n\x0C\r ]?(.*?)['"\t\n\x0C\r ]?\)"#)
        .expect("css url pattern is valid")
});

/// Format key for `url`, or `None` when the URL cannot be parsed.
///
/// `url` may be wrapped in CSS `url(...)` syntax, optionally quoted.
pub(crate) fn image_format(url: &str) -> Option<String> {
    let url = unwrap_css_url(url).unwrap_or(url);
    if url.starts_with("data:") && url.contains("base64") {
        return Some("base64".to_owned());
    }
    url_path(url).map(|path| extension(path).to_ascii_lowercase())
}

/// Candidate URLs of an image attribute value.
///
/// A `srcset` holding a list (any whitespace or comma) yields the URL of
/// every comma-separated candidate; anything else is one URL.
pub(crate) fn attribute_urls<'v>(attribute: &str, value: &'v str) -> Vec<&'v str> {
    let value = trim_whitespace(value);
    if attribute == "srcset" && value.contains(|c: char| c == ',' || is_whitespace(c)) {
        value
            .split(',')
            .filter_map(|candidate| trim_whitespace(candidate).split(is_whitespace).next())
            .collect()
    } else {
        vec![value]
    }
}

/// The address inside the first `url(...)` of `text`, on one line.
fn unwrap_css_url(text: &str) -> Option<&str> {
    CSS_URL
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|address| address.as_str())
}

/// Path component of a URL reference, or `None` when it does not parse.
///
/// A reference with a scheme but no slash after it (`mailto:`, `data:` without
/// base64) is opaque and has an empty path. Rejected: control characters, a
/// malformed percent escape, and a colon in the first path segment of a
/// scheme-less reference.
fn url_path(url: &str) -> Option<&str> {
    if url.chars().any(|c| c.is_ascii_control()) {
        return None;
    }

    let url = url.split('#').next().unwrap_or_default();
    let url = url.split('?').next().unwrap_or_default();

    let rest = match scheme_end(url)? {
        Some(colon) => {
            let rest = &url[colon + 1..];
            if !rest.starts_with('/') {
                return Some("");
            }
            rest
        }
        None => {
            let first_segment = url.split('/').next().unwrap_or_default();
            if first_segment.contains(':') {
                return None;
            }
            url
        }
    };

    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map_or("", |slash| &authority_and_path[slash..]),
        None => rest,
    };

    valid_escapes(path).then_some(path)
}

/// Byte index of the colon ending a scheme: `Some(None)` when there is no
/// scheme, `None` when the reference starts with a colon.
fn scheme_end(url: &str) -> Option<Option<usize>> {
    for (i, c) in url.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' if i > 0 => {}
            ':' if i == 0 => return None,
            ':' => return Some(Some(i)),
            _ => return Some(None),
        }
    }
    Some(None)
}

fn valid_escapes(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// Extension of the last path segment, without the dot.
fn extension(path: &str) -> &str {
    let segment = path.rsplit('/').next().unwrap_or_default();
    segment.rfind('.').map_or("", |dot| &segment[dot + 1..])
}
