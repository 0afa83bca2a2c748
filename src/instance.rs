//! The root resource instance: owns the loader state and the frozen tree.

use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::Value;

use crate::{
    Error, Node,
    builder::TieBuilder,
    formats::FormatType,
    loader::Loader,
    locale::validate_locale,
    node::RenderSettings,
    tree::Section,
    types::ConflictStrategy,
    version::Version,
};

/// A loaded set of resource documents.
///
/// # Example
///
/// ```rust,no_run
/// use tie::Tie;
///
/// let tie = Tie::open("locales/app.yaml")?;
/// let title = tie.set_locale(Some("fr"))?.get("menu")?.get("title")?;
/// println!("{}", title.render()?);
/// # Ok::<(), tie::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tie {
    loader: Loader,
    settings: RenderSettings,
    /// Locale chosen with [`Tie::set_locale_in_place`], surviving later loads.
    locale: Option<String>,
    root: Node,
}

impl Tie {
    /// Loads a single document with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Tie::builder().open([path])
    }

    /// Creates a [`TieBuilder`] for configuring construction.
    pub fn builder() -> TieBuilder {
        TieBuilder::new()
    }

    pub(crate) fn from_loader(loader: Loader, settings: RenderSettings) -> Result<Self, Error> {
        let root = build_root(&loader, settings, None)?;
        Ok(Tie {
            loader,
            settings,
            locale: None,
            root,
        })
    }

    /// Loads more documents into this instance. On error nothing changes.
    pub fn load<I, P>(&mut self, paths: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut loader = self.loader.clone();
        loader.load(paths)?;
        self.commit(loader)
    }

    /// Loads one more document from a stream. On error nothing changes.
    pub fn load_reader<R: Read>(
        &mut self,
        reader: R,
        format: FormatType,
        name: &str,
    ) -> Result<(), Error> {
        let mut loader = self.loader.clone();
        loader.load_reader(reader, format, name)?;
        self.commit(loader)
    }

    fn commit(&mut self, loader: Loader) -> Result<(), Error> {
        self.root = build_root(&loader, self.settings, self.locale.as_deref())?;
        self.loader = loader;
        Ok(())
    }

    /// The root section.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Navigates from the root; see [`Node::get`].
    pub fn get(&self, name: &str) -> Result<Node, Error> {
        self.root.get(name)
    }

    /// Returns the root with `locale` active (the default locale for `None`).
    pub fn set_locale(&self, locale: Option<&str>) -> Result<Node, Error> {
        self.root.set_locale(locale)
    }

    /// Changes the active locale of this instance itself.
    pub fn set_locale_in_place(&mut self, locale: Option<&str>) -> Result<(), Error> {
        self.root = self.root.set_locale(locale)?;
        self.locale = locale.map(str::to_string);
        Ok(())
    }

    pub fn locale(&self) -> &str {
        self.root.locale()
    }

    pub fn default_locale(&self) -> &str {
        self.root.default_locale()
    }

    /// See [`Node::render_tree`].
    pub fn render_tree(&self, active_only: bool) -> Result<Value, Error> {
        self.root.render_tree(active_only)
    }

    /// See [`Node::render_tree_with`].
    pub fn render_tree_with<I, K, V>(&self, active_only: bool, vars: I) -> Result<Value, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.root.render_tree_with(active_only, vars)
    }

    /// The resolved document version.
    pub fn version(&self) -> Version {
        self.loader.version()
    }

    pub fn loaded_paths(&self) -> &[PathBuf] {
        self.loader.loaded_paths()
    }

    /// The caller-level merge policy override, if any.
    pub fn merge_conflict(&self) -> Option<ConflictStrategy> {
        self.loader.merge_conflict()
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }
}

fn build_root(
    loader: &Loader,
    settings: RenderSettings,
    locale: Option<&str>,
) -> Result<Node, Error> {
    let default_locale = loader.default_locale();
    validate_locale(default_locale)?;

    let section = Section::from_map(loader.tree().clone(), "")?;
    Ok(Node::root(
        Arc::new(section),
        locale.unwrap_or(default_locale).to_string(),
        Arc::from(default_locale),
        settings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_document(
                "base.yaml",
                "tie:\n  default_locale: en\n$app: Tie\n+menu:\n  open:\n    en: Open {app}\n    fr: Ouvrir {app}\n",
            )
            .with_document("extra.yaml", "+menu:\n  close:\n    en: Close\n")
            .with_document("broken.yaml", "+menu: [1, 2]\n")
    }

    #[test]
    fn test_set_locale_in_place_survives_load() {
        let mut tie = Tie::builder().source(source()).open(["base.yaml"]).unwrap();
        assert_eq!(tie.locale(), "en");
        tie.set_locale_in_place(Some("fr")).unwrap();
        tie.load(["extra.yaml"]).unwrap();
        assert_eq!(tie.locale(), "fr");
        let open = tie.get("menu").unwrap().get("open").unwrap();
        assert_eq!(open.render().unwrap(), "Ouvrir Tie");
    }

    #[test]
    fn test_set_locale_returns_copy() {
        let tie = Tie::builder().source(source()).open(["base.yaml"]).unwrap();
        let fr = tie.set_locale(Some("fr")).unwrap();
        assert_eq!(fr.locale(), "fr");
        assert_eq!(tie.locale(), "en");
    }

    #[test]
    fn test_failed_structural_load_keeps_instance() {
        let mut tie = Tie::builder().source(source()).open(["base.yaml"]).unwrap();
        let err = tie.load(["broken.yaml"]).unwrap_err();
        assert!(matches!(err, Error::DocumentParse { .. }));
        assert_eq!(tie.loaded_paths().len(), 1);
        assert!(tie.get("menu").unwrap().get("open").is_ok());
    }

    #[test]
    fn test_invalid_in_place_locale_changes_nothing() {
        let mut tie = Tie::builder().source(source()).open(["base.yaml"]).unwrap();
        assert!(tie.set_locale_in_place(Some("not a locale")).is_err());
        assert_eq!(tie.locale(), "en");
    }
}
