//! Document front-ends: turn raw text into the generic document tree.
//!
//! The engine only ever sees [`serde_json::Value`]. Mappings keep their
//! insertion order.

pub mod json;
pub mod yaml;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

use serde_json::Value;

use crate::Error;

/// Represents all supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatType {
    /// YAML documents (`.yaml`, `.yml`), also the fallback for unknown extensions.
    #[default]
    Yaml,
    /// JSON documents (`.json`).
    Json,
}

/// # Example
/// ```rust
/// use tie::formats::FormatType;
/// assert_eq!(FormatType::Yaml.to_string(), "yaml");
/// assert_eq!(FormatType::Json.to_string(), "json");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Yaml => write!(f, "yaml"),
            FormatType::Json => write!(f, "json"),
        }
    }
}

/// Accepts `yaml`, `yml` and `json`, case-insensitively.
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(FormatType::Yaml),
            "json" => Ok(FormatType::Json),
            other => Err(Error::configuration_error(format!(
                "unknown document format `{}`",
                other
            ))),
        }
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Yaml => "yaml",
            FormatType::Json => "json",
        }
    }

    /// Parses `input` into a document tree. `name` only labels errors.
    ///
    /// Blank input is an empty mapping. Anything other than a mapping at the
    /// top level is rejected.
    pub fn parse(&self, input: &str, name: &str) -> Result<Value, Error> {
        if input.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        let value = match self {
            FormatType::Yaml => yaml::parse(input, name)?,
            FormatType::Json => json::parse(input, name)?,
        };

        match value {
            Value::Object(_) => Ok(value),
            Value::Null => Ok(Value::Object(Default::default())),
            other => Err(Error::parse_error(
                name,
                format!("expected a mapping at the top level, found {}", kind_of(&other)),
                None,
            )),
        }
    }
}

/// Infers a [`FormatType`] from a file path's extension. Unknown extensions read as YAML.
///
/// # Example
/// ```rust
/// use tie::formats::{FormatType, infer_format_from_extension};
/// assert_eq!(infer_format_from_extension("app.json"), FormatType::Json);
/// assert_eq!(infer_format_from_extension("app.yml"), FormatType::Yaml);
/// assert_eq!(infer_format_from_extension("app.tie"), FormatType::Yaml);
/// ```
pub fn infer_format_from_extension<P: AsRef<Path>>(path: P) -> FormatType {
    match path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => FormatType::Json,
        _ => FormatType::Yaml,
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
