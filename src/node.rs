//! Navigable, value-like views into the frozen tree.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    Error,
    locale::validate_locale,
    tree::{Content, SECTION_PREFIX, Section, VARIABLE_PREFIX, Variables, join_path},
    types::Mode,
};

/// Rendering switches fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Settle for any available translation when both the active and the
    /// default locale miss.
    pub use_fallbacks: bool,
    /// Fail with [`Error::MissingTranslation`] instead of rendering a `[path]` placeholder.
    pub panic_on_missing: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            use_fallbacks: false,
            panic_on_missing: true,
        }
    }
}

/// A position in the resource tree together with the active locale.
///
/// Nodes are cheap to clone and never change: [`Node::get`] and
/// [`Node::set_locale`] return new nodes that share the underlying tree.
///
/// # Example
///
/// ```rust
/// use tie::{Tie, traits::MemorySource};
///
/// let source = MemorySource::new().with_document(
///     "app.yaml",
///     "+greetings:\n  hello:\n    en: Hello {name}\n    fr: Bonjour {name}\n",
/// );
/// let tie = Tie::builder().source(source).open(["app.yaml"])?;
/// let hello = tie.get("greetings")?.get("hello")?;
/// assert_eq!(hello.render_with([("name", "Sam")])?, "Hello Sam");
/// assert_eq!(hello.set_locale(Some("fr"))?.render_with([("name", "Sam")])?, "Bonjour Sam");
/// # Ok::<(), tie::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) content: Content,
    pub(crate) variables: Arc<Variables>,
    pub(crate) locale: String,
    pub(crate) default_locale: Arc<str>,
    pub(crate) settings: RenderSettings,
    pub(crate) path: String,
}

impl Node {
    pub(crate) fn root(
        section: Arc<Section>,
        locale: String,
        default_locale: Arc<str>,
        settings: RenderSettings,
    ) -> Self {
        Node {
            variables: Arc::new(section.variables.clone()),
            content: Content::Section(section),
            locale,
            default_locale,
            settings,
            path: String::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.content.mode()
    }

    pub fn is_section(&self) -> bool {
        self.mode() == Mode::Section
    }

    /// The active locale used for rendering.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Dotted path from the root (`""` for the root itself).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Variables visible to this node: those declared along the navigation
    /// path, the nearest declaration winning.
    pub fn variables(&self) -> &IndexMap<String, Value> {
        &self.variables
    }

    /// Navigates to the child named `name`, preferring a `+name` section over a
    /// `name` text leaf.
    pub fn get(&self, name: &str) -> Result<Node, Error> {
        let section = self.section("navigate into")?;
        let child = section.lookup(name).ok_or_else(|| Error::NodeNotFound {
            path: self.display_path().to_string(),
            name: name.to_string(),
        })?;
        Ok(self.descend(name, child.clone()))
    }

    /// The text and literal children of this section, in document order.
    pub fn children(&self) -> Result<impl Iterator<Item = Node> + '_, Error> {
        let section = self.section("iterate")?;
        Ok(section
            .entries
            .iter()
            .filter(|(key, _)| !key.starts_with(SECTION_PREFIX))
            .map(|(key, content)| self.descend(key, content.clone())))
    }

    /// The nested sections of this section, in document order.
    pub fn sections(&self) -> Result<impl Iterator<Item = Node> + '_, Error> {
        let section = self.section("iterate")?;
        Ok(section.entries.iter().filter_map(|(key, content)| {
            key.strip_prefix(SECTION_PREFIX)
                .map(|name| self.descend(name, content.clone()))
        }))
    }

    /// Every name [`Node::get`] accepts here, `+` markers stripped, without duplicates.
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        let section = self.section("list the keys of")?;
        let mut keys: Vec<String> = Vec::with_capacity(section.entries.len());
        for key in section.entries.keys() {
            let name = key.strip_prefix(SECTION_PREFIX).unwrap_or(key);
            if !keys.iter().any(|k| k == name) {
                keys.push(name.to_string());
            }
        }
        Ok(keys)
    }

    /// Returns a copy with `locale` active, or the default locale for `None`.
    pub fn set_locale(&self, locale: Option<&str>) -> Result<Node, Error> {
        let locale = locale.unwrap_or(&self.default_locale);
        validate_locale(locale)?;
        Ok(self.with_locale(locale))
    }

    pub(crate) fn with_locale(&self, locale: &str) -> Node {
        Node {
            locale: locale.to_string(),
            ..self.clone()
        }
    }

    pub(crate) fn wrong_mode(&self, operation: &'static str) -> Error {
        Error::WrongNodeMode {
            path: self.display_path().to_string(),
            operation,
            actual: self.mode(),
        }
    }

    pub(crate) fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            self.path.as_str()
        }
    }

    fn section(&self, operation: &'static str) -> Result<&Arc<Section>, Error> {
        match &self.content {
            Content::Section(section) => Ok(section),
            _ => Err(self.wrong_mode(operation)),
        }
    }

    fn descend(&self, name: &str, content: Content) -> Node {
        let variables = match content.variables() {
            Some(own) if !own.is_empty() => {
                let mut merged = (*self.variables).clone();
                merged.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
                Arc::new(merged)
            }
            _ => Arc::clone(&self.variables),
        };

        Node {
            content,
            variables,
            locale: self.locale.clone(),
            default_locale: Arc::clone(&self.default_locale),
            settings: self.settings,
            path: join_path(&self.path, name),
        }
    }

    /// Looks a `$name` reference up in this node's variables. Anything else is returned as is.
    pub(crate) fn dereference<'a>(&'a self, value: &'a Value) -> &'a Value {
        match value {
            Value::String(s) => s
                .strip_prefix(VARIABLE_PREFIX)
                .and_then(|name| self.variables.get(name))
                .unwrap_or(value),
            _ => value,
        }
    }
}
