//! Small shared types: node modes, merge policies and the `tie` configuration block.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::{error::Error, version::Version};

/// Which kind of content a node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Ordered mapping of named children. Navigable, not renderable.
    Section,
    /// Locale map or literal. Renderable, not navigable.
    Text,
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Section => write!(f, "section"),
            Mode::Text => write!(f, "text"),
        }
    }
}

/// Strategy for handling conflicts when merging documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictStrategy {
    /// Fail the load on any differing leaf collision
    Raise,
    /// Keep the last loaded value (default)
    #[default]
    Override,
    /// Keep the first loaded value
    Ignore,
}

impl Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictStrategy::Raise => write!(f, "raise"),
            ConflictStrategy::Override => write!(f, "override"),
            ConflictStrategy::Ignore => write!(f, "ignore"),
        }
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raise" => Ok(ConflictStrategy::Raise),
            "override" => Ok(ConflictStrategy::Override),
            "ignore" => Ok(ConflictStrategy::Ignore),
            other => Err(Error::configuration_error(format!(
                "unknown merge conflict policy `{}` (expected raise, override or ignore)",
                other
            ))),
        }
    }
}

/// The reserved top-level `tie` block of a document. Never merged into content.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub version: Option<VersionSpec>,

    /// Dot-separated section path the whole document is nested under.
    #[serde(default)]
    pub section: Option<String>,

    #[serde(default)]
    pub merge_conflict: Option<String>,

    #[serde(default)]
    pub default_locale: Option<String>,
}

/// A declared version. YAML happily reads `version: 0.1` as a number, which
/// is why fractional numbers are refused by [`VersionSpec::to_version`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    Text(String),
    Number(serde_json::Number),
}

impl VersionSpec {
    /// Parses the declaration. Integers are accepted; a fractional number is
    /// an error because YAML has already turned `1.10` into `1.1`.
    pub fn to_version(&self) -> Result<Version, Error> {
        match self {
            VersionSpec::Text(text) => text.parse(),
            VersionSpec::Number(number) if number.is_f64() => {
                Err(Error::configuration_error(format!(
                    "version `{}` must be quoted, unquoted it reads as a decimal number",
                    number
                )))
            }
            VersionSpec::Number(number) => number.to_string().parse(),
        }
    }
}

impl Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionSpec::Text(s) => write!(f, "{}", s),
            VersionSpec::Number(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_strategy_from_str() {
        assert_eq!("raise".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Raise);
        assert_eq!(
            " Override ".parse::<ConflictStrategy>().unwrap(),
            ConflictStrategy::Override
        );
        assert_eq!("ignore".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Ignore);
        assert!(matches!(
            "merge".parse::<ConflictStrategy>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_conflict_strategy_default_is_override() {
        assert_eq!(ConflictStrategy::default(), ConflictStrategy::Override);
        assert_eq!(ConflictStrategy::default().to_string(), "override");
    }

    #[test]
    fn test_document_config_refuses_fractional_version() {
        let value = serde_json::json!({ "version": 0.1, "section": "a.b" });
        let config: DocumentConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.section.as_deref(), Some("a.b"));
        assert!(config.merge_conflict.is_none());

        let version = config.version.unwrap();
        assert_eq!(version.to_string(), "0.1");
        assert!(matches!(version.to_version(), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_version_spec_integer_and_text() {
        let number = VersionSpec::Number(serde_json::Number::from(2));
        assert_eq!(number.to_version().unwrap(), Version::new(2, 0, 0));

        let text = VersionSpec::Text("1.10".to_string());
        assert_eq!(text.to_version().unwrap(), Version::new(1, 10, 0));
    }

    #[test]
    fn test_document_config_ignores_unknown_keys() {
        let value = serde_json::json!({ "default_locale": "fr", "author": "someone" });
        let config: DocumentConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.default_locale.as_deref(), Some("fr"));
    }
}
