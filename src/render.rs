//! Rendering text nodes and whole subtrees.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    Error, Node,
    locale::{is_locale_code, resolve},
    template,
    tree::{Content, Variables, display_scalar, join_path},
};

impl Node {
    /// Renders this text node in the active locale without extra variables.
    pub fn render(&self) -> Result<String, Error> {
        self.render_text(&Variables::new())
    }

    /// Renders this text node, substituting `{name}` placeholders.
    ///
    /// `vars` override variables declared in the document. Placeholders with no
    /// matching variable are left as they are.
    pub fn render_with<I, K, V>(&self, vars: I) -> Result<String, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.render_text(&collect_vars(vars))
    }

    /// Renders every text below this node into nested JSON objects.
    ///
    /// Sections become objects keyed by name. With `active_only`, a text leaf
    /// becomes its rendering in the active locale; otherwise it becomes an
    /// object from each locale code it declares to the rendering in that locale.
    pub fn render_tree(&self, active_only: bool) -> Result<Value, Error> {
        self.render_subtree(active_only, &Variables::new())
    }

    /// [`Node::render_tree`] with extra variables applied to every leaf.
    pub fn render_tree_with<I, K, V>(&self, active_only: bool, vars: I) -> Result<Value, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.render_subtree(active_only, &collect_vars(vars))
    }

    fn render_text(&self, overrides: &Variables) -> Result<String, Error> {
        let text = match &self.content {
            Content::Section(_) => return Err(self.wrong_mode("render")),
            Content::Literal(value) => return Ok(display_scalar(value)),
            Content::Text(text) => text,
        };

        let Some(translation) = self.translate(&text.translations, &self.path)? else {
            return Ok(format!("[{}]", self.display_path()));
        };

        let translation = match &text.wrap {
            Some(wrap) => template::wrap(wrap, &translation),
            None => translation,
        };

        let mut values = IndexMap::new();
        for name in template::placeholders(&translation) {
            if values.contains_key(name) {
                continue;
            }
            let Some(value) = overrides.get(name).or_else(|| self.variables.get(name)) else {
                continue;
            };
            if let Some(resolved) = self.resolve_variable(name, value)? {
                values.insert(name.to_string(), resolved);
            }
        }

        Ok(template::substitute(&translation, &values))
    }

    /// One `$name` hop, then a locale match for mappings, then stringification.
    fn resolve_variable(&self, name: &str, value: &Value) -> Result<Option<String>, Error> {
        match self.dereference(value) {
            Value::Object(map) => {
                let path = join_path(&self.path, &format!("${}", name));
                self.translate(map, &path)
            }
            other => Ok(Some(display_scalar(other))),
        }
    }

    /// Picks the translation for `[locale, default_locale]`.
    ///
    /// `Ok(None)` only in permissive mode, when nothing matched.
    fn translate<'m, I>(&self, translations: I, path: &str) -> Result<Option<String>, Error>
    where
        I: IntoIterator<Item = (&'m String, &'m Value)>,
    {
        let candidates = translations.into_iter().collect::<Vec<_>>();
        let priority = [self.locale.as_str(), &*self.default_locale];
        let matched = resolve(
            &priority,
            candidates.iter().map(|&(code, _)| code.as_str()),
            self.settings.use_fallbacks,
        );

        match matched.and_then(|code| candidates.iter().find(|(c, _)| c.as_str() == code)) {
            Some((_, value)) => Ok(Some(display_scalar(value))),
            None if self.settings.panic_on_missing => Err(Error::MissingTranslation {
                path: if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path.to_string()
                },
                locale: self.locale.clone(),
                default_locale: self.default_locale.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn render_subtree(&self, active_only: bool, overrides: &Variables) -> Result<Value, Error> {
        match &self.content {
            Content::Section(_) => {
                let mut out = Map::new();
                for name in self.keys()? {
                    let child = self.get(&name)?;
                    out.insert(name, child.render_subtree(active_only, overrides)?);
                }
                Ok(Value::Object(out))
            }
            Content::Literal(value) => Ok(Value::String(display_scalar(value))),
            Content::Text(_) if active_only => Ok(Value::String(self.render_text(overrides)?)),
            Content::Text(text) => {
                let mut out = Map::new();
                for code in text.translations.keys().filter(|k| is_locale_code(k)) {
                    let rendered = self.with_locale(code).render_text(overrides)?;
                    out.insert(code.clone(), Value::String(rendered));
                }
                Ok(Value::Object(out))
            }
        }
    }
}

fn collect_vars<I, K, V>(vars: I) -> Variables
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    vars.into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
