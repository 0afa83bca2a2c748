//! All error types for the tie crate.
//!
//! Load-time variants abort the whole load. Navigation and rendering variants
//! are per call and never change the state of the instance that produced them.

use thiserror::Error;

use crate::types::Mode;

#[derive(Error, Debug)]
pub enum Error {
    #[error("document not found: {path}")]
    DocumentNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error reading `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document `{path}`: {message}")]
    DocumentParse {
        path: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("document `{path}` requires version {required}, but only {supported} is supported")]
    VersionIncompatible {
        path: String,
        required: String,
        supported: String,
    },

    #[error("merge conflict in `{path}` at key `{key}`")]
    MergeConflict { path: String, key: String },

    #[error("document `{path}` is already loaded (cyclic or duplicate import)")]
    CyclicImport { path: String },

    #[error("malformed `$import` in `{path}`: {message}")]
    MalformedImport { path: String, message: String },

    #[error("`$import` used in `{source_name}`, which was not loaded from a file path")]
    ImportWithoutPath { source_name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("locale `{0}` does not comply with supported standards (ISO 639, BCP 47)")]
    InvalidLocale(String),

    #[error("the requested node `{name}` is not found under `{path}`")]
    NodeNotFound { path: String, name: String },

    #[error("cannot {operation} `{path}`: it is a {actual} node")]
    WrongNodeMode {
        path: String,
        operation: &'static str,
        actual: Mode,
    },

    #[error("no translation for `{path}` in `{locale}` or default `{default_locale}`")]
    MissingTranslation {
        path: String,
        locale: String,
        default_locale: String,
    },
}

impl Error {
    /// Creates a new document parse error with optional source error
    pub fn parse_error(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::DocumentParse {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates a new configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }

    /// Maps an I/O failure while opening `path`, keeping `NotFound` distinct.
    pub(crate) fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::DocumentNotFound { path, source }
        } else {
            Error::Io { path, source }
        }
    }
}

/// Shorthand result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
