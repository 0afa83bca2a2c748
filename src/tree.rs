//! The frozen resource tree shared by every [`crate::Node`].
//!
//! Built once from the merged document. `+key` entries become sections,
//! `$key` entries become variables, everything else is a text leaf (a mapping)
//! or a literal (a scalar). Children sit behind `Arc`, so navigating only bumps
//! a reference count.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{Error, formats::kind_of, types::Mode};

pub(crate) const SECTION_PREFIX: char = '+';
pub(crate) const VARIABLE_PREFIX: char = '$';
pub(crate) const WRAP_KEY: &str = "wrap";

pub(crate) type Variables = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Content {
    Section(Arc<Section>),
    Text(Arc<Text>),
    Literal(Value),
}

impl Content {
    pub(crate) fn mode(&self) -> Mode {
        match self {
            Content::Section(_) => Mode::Section,
            Content::Text(_) | Content::Literal(_) => Mode::Text,
        }
    }

    pub(crate) fn variables(&self) -> Option<&Variables> {
        match self {
            Content::Section(section) => Some(&section.variables),
            Content::Text(text) => Some(&text.variables),
            Content::Literal(_) => None,
        }
    }
}

/// A section: raw keys (with the `+` marker kept) to children, in document order.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Section {
    pub(crate) entries: IndexMap<String, Content>,
    pub(crate) variables: Variables,
}

impl Section {
    pub(crate) fn from_map(map: Map<String, Value>, path: &str) -> Result<Self, Error> {
        let mut section = Section::default();

        for (key, value) in map {
            let child_path = join_path(path, key.trim_start_matches(SECTION_PREFIX));

            if let Some(name) = key.strip_prefix(VARIABLE_PREFIX) {
                section.variables.insert(name.to_string(), value);
                continue;
            }

            let content = if key.starts_with(SECTION_PREFIX) {
                let map = match value {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => {
                        return Err(Error::parse_error(
                            child_path,
                            format!("a section must be a mapping, found {}", kind_of(&other)),
                            None,
                        ));
                    }
                };
                Content::Section(Arc::new(Section::from_map(map, &child_path)?))
            } else {
                match value {
                    Value::Object(map) => Content::Text(Arc::new(Text::from_map(map, &child_path)?)),
                    other => Content::Literal(other),
                }
            };
            section.entries.insert(key, content);
        }

        Ok(section)
    }

    /// Looks `name` up as a section first, then as a text leaf.
    pub(crate) fn lookup(&self, name: &str) -> Option<&Content> {
        self.entries
            .get(&format!("{}{}", SECTION_PREFIX, name))
            .or_else(|| self.entries.get(name))
    }
}

/// A text leaf: locale code to translation, plus the reserved `wrap` template.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Text {
    pub(crate) translations: IndexMap<String, Value>,
    pub(crate) wrap: Option<String>,
    pub(crate) variables: Variables,
}

impl Text {
    fn from_map(map: Map<String, Value>, path: &str) -> Result<Self, Error> {
        let mut text = Text::default();

        for (key, value) in map {
            if let Some(name) = key.strip_prefix(VARIABLE_PREFIX) {
                text.variables.insert(name.to_string(), value);
            } else if key == WRAP_KEY {
                text.wrap = match value {
                    Value::Null => None,
                    other @ (Value::Object(_) | Value::Array(_)) => {
                        return Err(Error::parse_error(
                            join_path(path, WRAP_KEY),
                            format!("a wrap template must be a string, found {}", kind_of(&other)),
                            None,
                        ));
                    }
                    scalar => Some(display_scalar(&scalar)),
                };
            } else {
                text.translations.insert(key, value);
            }
        }

        Ok(text)
    }
}

/// The string form of a scalar used as text: strings verbatim, `null` empty,
/// everything else in its JSON spelling.
pub(crate) fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: Value) -> Section {
        match value {
            Value::Object(map) => Section::from_map(map, "").unwrap(),
            _ => panic!("test tree must be a mapping"),
        }
    }

    #[test]
    fn test_classifies_entries() {
        let section = build(json!({
            "$user": "Sam",
            "+menu": { "open": { "en": "Open" } },
            "hello": { "en": "Hi", "wrap": "[ ]", "$mark": "!" },
            "answer": 42
        }));

        assert_eq!(section.variables.get("user"), Some(&json!("Sam")));
        assert_eq!(section.entries.len(), 3);
        assert_eq!(section.lookup("menu").unwrap().mode(), Mode::Section);
        assert_eq!(section.lookup("answer"), Some(&Content::Literal(json!(42))));

        let Some(Content::Text(hello)) = section.lookup("hello") else {
            panic!("hello should be a text leaf");
        };
        assert_eq!(hello.wrap.as_deref(), Some("[ ]"));
        assert_eq!(hello.translations.keys().collect::<Vec<_>>(), vec!["en"]);
        assert_eq!(hello.variables.get("mark"), Some(&json!("!")));
    }

    #[test]
    fn test_section_wins_lookup_tie_break() {
        let section = build(json!({
            "title": { "en": "Text" },
            "+title": { "sub": "x" }
        }));
        assert_eq!(section.lookup("title").unwrap().mode(), Mode::Section);
    }

    #[test]
    fn test_null_section_is_empty() {
        let section = build(json!({ "+empty": null }));
        let Some(Content::Section(empty)) = section.lookup("empty") else {
            panic!("expected a section");
        };
        assert!(empty.entries.is_empty());
    }

    #[test]
    fn test_scalar_section_is_rejected() {
        let map = json!({ "+outer": { "+inner": "oops" } });
        let Value::Object(map) = map else { unreachable!() };
        let err = Section::from_map(map, "").unwrap_err();
        match err {
            Error::DocumentParse { path, .. } => assert_eq!(path, "outer.inner"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_scalar() {
        assert_eq!(display_scalar(&json!("a")), "a");
        assert_eq!(display_scalar(&json!(3)), "3");
        assert_eq!(display_scalar(&json!(2.5)), "2.5");
        assert_eq!(display_scalar(&json!(true)), "true");
        assert_eq!(display_scalar(&Value::Null), "");
    }
}
