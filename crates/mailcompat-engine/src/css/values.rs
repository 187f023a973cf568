//! Normalization of declaration names and values into lookup keys.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::normalize_key;

/// Property name key: trimmed, lowercased, and with the physical longhands of
/// `margin` and `padding` folded into the shorthand.
pub(crate) fn property_key(property: &str) -> String {
    let key = normalize_key(property);
    let shorthand = match key.as_str() {
        "margin-top" | "margin-bottom" | "margin-left" | "margin-right" => "margin",
        "padding-top" | "padding-bottom" | "padding-left" | "padding-right" => "padding",
        _ => return key,
    };
    shorthand.to_owned()
}

/// Signed number with at most one fractional digit.
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+|-)?([0-9](\.[0-9])?|\.[0-9])").expect("number pattern is valid")
});

/// Unit key of a dimension or percentage: every number matched by
/// [`NUMBER`] is removed, so `10px` gives `px` and `50%` gives `%`.
pub(crate) fn dimension_unit(text: &str) -> String {
    normalize_key(&NUMBER.replace_all(text, ""))
}

/// Function key: `rgb(` gives `rgb`.
pub(crate) fn function_name(text: &str) -> String {
    normalize_key(&text.replace('(', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_key() {
        assert_eq!(property_key(" Margin-Top "), "margin");
        assert_eq!(property_key("padding-left"), "padding");
        assert_eq!(property_key("margin-inline-start"), "margin-inline-start");
        assert_eq!(property_key("COLOR"), "color");
    }

    #[test]
    fn test_dimension_unit() {
        assert_eq!(dimension_unit("10px"), "px");
        assert_eq!(dimension_unit("-1.5EM"), "em");
        assert_eq!(dimension_unit("+.5rem"), "rem");
        assert_eq!(dimension_unit("1.25rem"), "rem");
        assert_eq!(dimension_unit("50%"), "%");
        assert_eq!(dimension_unit("100vh"), "vh");
        assert_eq!(dimension_unit("initial"), "initial");
        assert_eq!(dimension_unit("123.45px"), "px");
    }

    #[test]
    fn test_function_name() {
        assert_eq!(function_name("RGB("), "rgb");
        assert_eq!(function_name("linear-gradient("), "linear-gradient");
    }
}
