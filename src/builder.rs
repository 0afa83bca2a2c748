/// Builder for creating a `Tie` instance with a fluent interface.
///
/// Options set here beat whatever the loaded documents declare in their
/// `tie` blocks.
///
/// # Example
///
/// ```rust,no_run
/// use tie::{Tie, ConflictStrategy};
///
/// let tie = Tie::builder()
///     .default_locale("en-GB")
///     .merge_conflict(ConflictStrategy::Raise)
///     .panic_on_missing(false)
///     .open(["locales/base.yaml", "locales/checkout.yaml"])?;
/// # Ok::<(), tie::Error>(())
/// ```
use std::{io::Read, path::Path, sync::Arc};

use crate::{
    Error, Tie,
    formats::FormatType,
    loader::{LoadOptions, Loader},
    locale::validate_locale,
    node::RenderSettings,
    traits::{DocumentSource, FileSystem},
    types::ConflictStrategy,
    version::Version,
};

#[derive(Debug, Clone)]
pub struct TieBuilder {
    options: LoadOptions,
    settings: RenderSettings,
    source: Arc<dyn DocumentSource>,
}

impl TieBuilder {
    /// Creates a builder with default options reading from the filesystem.
    pub fn new() -> Self {
        Self {
            options: LoadOptions::default(),
            settings: RenderSettings::default(),
            source: Arc::new(FileSystem),
        }
    }

    /// Overrides the default locale declared by documents.
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.options.default_locale = Some(locale.into());
        self
    }

    /// Overrides the merge policy declared by documents.
    pub fn merge_conflict(mut self, strategy: ConflictStrategy) -> Self {
        self.options.merge_conflict = Some(strategy);
        self
    }

    /// Like [`TieBuilder::merge_conflict`], from a policy name (`raise`, `override`, `ignore`).
    pub fn merge_conflict_name(self, name: &str) -> Result<Self, Error> {
        Ok(self.merge_conflict(name.parse()?))
    }

    pub fn use_fallbacks(mut self, use_fallbacks: bool) -> Self {
        self.settings.use_fallbacks = use_fallbacks;
        self
    }

    pub fn panic_on_missing(mut self, panic_on_missing: bool) -> Self {
        self.settings.panic_on_missing = panic_on_missing;
        self
    }

    /// The newest document version accepted. Defaults to this crate's version.
    pub fn supported_version(mut self, version: Version) -> Self {
        self.options.supported_version = version;
        self
    }

    /// Where documents are read from. Defaults to [`FileSystem`].
    pub fn source(mut self, source: impl DocumentSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Builds an instance with nothing loaded yet.
    pub fn build(self) -> Result<Tie, Error> {
        if let Some(locale) = &self.options.default_locale {
            validate_locale(locale)?;
        }
        Tie::from_loader(Loader::new(self.source, self.options), self.settings)
    }

    /// Builds an instance and loads `paths` into it, in order.
    pub fn open<I, P>(self, paths: I) -> Result<Tie, Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut tie = self.build()?;
        tie.load(paths)?;
        Ok(tie)
    }

    /// Builds an instance from a single stream. `$import` is unavailable there.
    pub fn from_reader<R: Read>(self, reader: R, format: FormatType) -> Result<Tie, Error> {
        let mut tie = self.build()?;
        tie.load_reader(reader, format, "<stream>")?;
        Ok(tie)
    }
}

impl Default for TieBuilder {
    fn default() -> Self {
        Self::new()
    }
}
