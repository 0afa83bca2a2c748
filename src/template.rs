//! The `{ name }` templating pass and the `wrap` slot.
//!
//! Tokens are found once per call and replaced in a single pass, so a
//! substituted value is never scanned again. Unknown names stay literal.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, NoExpand, Regex};

lazy_static! {
    static ref WRAP_SLOT_REGEX: Regex = Regex::new(r"\{\s*\}").unwrap();
    static ref WRAP_GAP_REGEX: Regex = Regex::new(r"^(\S*)\s+(\S*)$").unwrap();
    static ref VARIABLE_TOKEN_REGEX: Regex = Regex::new(r"\{\s*([^{}\s]+)\s*\}").unwrap();
}

/// Puts `text` into every unnamed `{ }` slot of `template`.
///
/// A template without such a slot that is just two delimiters around a
/// whitespace gap (`[ ]`, `« »`) takes `text` in the gap instead. Any other
/// template is returned unchanged.
///
/// ```rust
/// assert_eq!(tie::template::wrap("«{ }»", "Hi"), "«Hi»");
/// assert_eq!(tie::template::wrap("[ ]", "Hi"), "[Hi]");
/// ```
pub fn wrap(template: &str, text: &str) -> String {
    if WRAP_SLOT_REGEX.is_match(template) {
        return WRAP_SLOT_REGEX
            .replace_all(template, NoExpand(text))
            .into_owned();
    }

    match WRAP_GAP_REGEX.captures(template) {
        Some(caps) => format!("{}{}{}", &caps[1], text, &caps[2]),
        None => template.to_string(),
    }
}

/// Replaces every `{ name }` token whose name is in `values`.
///
/// ```rust
/// use indexmap::IndexMap;
/// let mut values = IndexMap::new();
/// values.insert("name".to_string(), "Sam".to_string());
/// assert_eq!(tie::template::substitute("Hi { name }, {unknown}", &values), "Hi Sam, {unknown}");
/// ```
pub fn substitute(text: &str, values: &IndexMap<String, String>) -> String {
    VARIABLE_TOKEN_REGEX
        .replace_all(text, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Names of the `{ name }` tokens in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<&str> {
    VARIABLE_TOKEN_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_wrap_tolerates_whitespace() {
        assert_eq!(wrap("[ ]", "Hi"), "[Hi]");
        assert_eq!(wrap("[{}]", "Hi"), "[Hi]");
        assert_eq!(wrap("[{   }]", "Hi"), "[Hi]");
    }

    #[test]
    fn test_wrap_gap_only_without_braced_slot() {
        assert_eq!(wrap("« »", "Hi"), "«Hi»");
        assert_eq!(wrap("<b>  </b>", "$1 off"), "<b>$1 off</b>");
        assert_eq!(wrap("( { } )", "Hi"), "( Hi )");
        assert_eq!(wrap("no slot here", "Hi"), "no slot here");
    }

    #[test]
    fn test_wrap_keeps_named_tokens() {
        assert_eq!(wrap("{ } - {site}", "Home"), "Home - {site}");
    }

    #[test]
    fn test_wrap_does_not_expand_dollar_sequences() {
        assert_eq!(wrap("<{ }>", "$1 off"), "<$1 off>");
    }

    #[test]
    fn test_substitute_whitespace_tolerant() {
        let vals = values(&[("name", "Sam")]);
        assert_eq!(substitute("{name}|{ name }|{  name}", &vals), "Sam|Sam|Sam");
    }

    #[test]
    fn test_substitute_leaves_unknown_literal() {
        let vals = values(&[("name", "Sam")]);
        assert_eq!(substitute("Hi {name}, {age}", &vals), "Hi Sam, {age}");
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let vals = values(&[("a", "{b}"), ("b", "x")]);
        assert_eq!(substitute("{a}", &vals), "{b}");
    }

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(placeholders("{ b } and {a} and { }"), vec!["b", "a"]);
    }
}
