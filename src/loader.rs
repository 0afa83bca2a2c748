//! Loading, import expansion and deep merging of resource documents.
//!
//! Every call to [`Loader::load`] works on a copy of the current state and
//! only commits it when every document loaded cleanly, so a failed load never
//! leaves a half-merged tree behind.

use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde_json::{Map, Value, map::Entry};
use tracing::{debug, trace};

use crate::{
    Error,
    formats::{FormatType, infer_format_from_extension, kind_of},
    locale::validate_locale,
    traits::{DocumentSource, FileSystem},
    types::{ConflictStrategy, DocumentConfig},
    version::Version,
};

/// Key of the reserved configuration block at the top of a document.
pub const CONFIG_KEY: &str = "tie";
/// Key of the import directive, valid at any nesting level.
pub const IMPORT_KEY: &str = "$import";

const FALLBACK_LOCALE: &str = "en";

/// Loader settings fixed by the caller. They beat anything a document declares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub default_locale: Option<String>,
    pub merge_conflict: Option<ConflictStrategy>,
    /// Documents declaring a newer version than this are rejected.
    pub supported_version: Version,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_locale(mut self, default_locale: Option<String>) -> Self {
        self.default_locale = default_locale;
        self
    }

    pub fn with_merge_conflict(mut self, merge_conflict: Option<ConflictStrategy>) -> Self {
        self.merge_conflict = merge_conflict;
        self
    }

    pub fn with_supported_version(mut self, supported_version: Version) -> Self {
        self.supported_version = supported_version;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct LoadState {
    tree: Map<String, Value>,
    loaded: Vec<PathBuf>,
    version: Option<Version>,
    default_locale: Option<String>,
}

/// Accumulates documents into one merged tree.
#[derive(Debug, Clone)]
pub struct Loader {
    source: Arc<dyn DocumentSource>,
    options: LoadOptions,
    state: LoadState,
}

impl Default for Loader {
    fn default() -> Self {
        Loader::new(Arc::new(FileSystem), LoadOptions::default())
    }
}

impl Loader {
    pub fn new(source: Arc<dyn DocumentSource>, options: LoadOptions) -> Self {
        Loader {
            source,
            options,
            state: LoadState::default(),
        }
    }

    /// Loads and merges every document in `paths`, in order.
    pub fn load<I, P>(&mut self, paths: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut session = self.session();
        for path in paths {
            let mut tree = std::mem::take(&mut session.state.tree);
            session.load_path(path.as_ref(), &mut tree, None)?;
            session.state.tree = tree;
        }
        self.state = session.state;
        Ok(())
    }

    /// Loads one document from a stream. `name` labels errors only.
    ///
    /// A stream has no directory to resolve relative paths against, so any
    /// `$import` inside it fails with [`Error::ImportWithoutPath`].
    pub fn load_reader<R: Read>(
        &mut self,
        mut reader: R,
        format: FormatType,
        name: &str,
    ) -> Result<(), Error> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| Error::from_io(name, e))?;
        let document = format.parse(&text, name)?;

        let mut session = self.session();
        let mut tree = std::mem::take(&mut session.state.tree);
        session.load_document(document, name, None, None, &mut tree)?;
        session.state.tree = tree;
        self.state = session.state;
        Ok(())
    }

    /// The merged document tree.
    pub fn tree(&self) -> &Map<String, Value> {
        &self.state.tree
    }

    /// Identities of every document loaded so far, in load order.
    pub fn loaded_paths(&self) -> &[PathBuf] {
        &self.state.loaded
    }

    /// The highest version declared by a loaded document, or the supported
    /// version when none declared one.
    pub fn version(&self) -> Version {
        self.state
            .version
            .unwrap_or(self.options.supported_version)
    }

    /// The caller's default locale, else the first declared by a document, else `en`.
    pub fn default_locale(&self) -> &str {
        self.options
            .default_locale
            .as_deref()
            .or(self.state.default_locale.as_deref())
            .unwrap_or(FALLBACK_LOCALE)
    }

    /// The caller-level merge policy override, if any.
    pub fn merge_conflict(&self) -> Option<ConflictStrategy> {
        self.options.merge_conflict
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    fn session(&self) -> Session<'_> {
        Session {
            source: self.source.as_ref(),
            options: &self.options,
            state: self.state.clone(),
        }
    }
}

struct Session<'a> {
    source: &'a dyn DocumentSource,
    options: &'a LoadOptions,
    state: LoadState,
}

impl Session<'_> {
    /// `importer` is the policy of the document importing this one, if any.
    fn load_path(
        &mut self,
        path: &Path,
        target: &mut Map<String, Value>,
        importer: Option<ConflictStrategy>,
    ) -> Result<(), Error> {
        let name = path.display().to_string();
        let identity = self.source.resolve(path);
        if self.state.loaded.contains(&identity) {
            return Err(Error::CyclicImport { path: name });
        }
        // Recorded before imports are expanded so a self-import is caught.
        self.state.loaded.push(identity);

        let mut text = String::new();
        self.source
            .open(path)
            .and_then(|mut reader| reader.read_to_string(&mut text))
            .map_err(|e| Error::from_io(&name, e))?;

        let document = infer_format_from_extension(path).parse(&text, &name)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.load_document(document, &name, Some(&base_dir), importer, target)
    }

    fn load_document(
        &mut self,
        document: Value,
        name: &str,
        base_dir: Option<&Path>,
        importer: Option<ConflictStrategy>,
        target: &mut Map<String, Value>,
    ) -> Result<(), Error> {
        let Value::Object(mut content) = document else {
            return Err(Error::parse_error(
                name,
                format!("expected a mapping at the top level, found {}", kind_of(&document)),
                None,
            ));
        };

        let config = take_config(&mut content, name)?;
        self.check_version(&config, name)?;
        let strategy = match (importer, self.resolve_strategy(&config)?) {
            // An import never weakens a `raise` declared by its importer.
            (Some(ConflictStrategy::Raise), _) => ConflictStrategy::Raise,
            (_, own) => own,
        };

        if self.state.default_locale.is_none()
            && let Some(locale) = config.default_locale
        {
            validate_locale(&locale)?;
            self.state.default_locale = Some(locale);
        }

        self.expand_imports(&mut content, name, base_dir, strategy)?;
        let content = nest_under_section(content, config.section.as_deref())?;

        debug!(
            "merging `{}` ({} top-level keys, policy {})",
            name,
            content.len(),
            strategy
        );
        merge_maps(target, content, strategy, name, "")
    }

    fn check_version(&mut self, config: &DocumentConfig, name: &str) -> Result<(), Error> {
        let supported = self.options.supported_version;
        let Some(declared) = &config.version else {
            return Ok(());
        };

        let required = declared.to_string();
        let version = declared.to_version()?;
        if version > supported {
            return Err(Error::VersionIncompatible {
                path: name.to_string(),
                required,
                supported: supported.to_string(),
            });
        }

        self.state.version = Some(self.state.version.map_or(version, |v| v.max(version)));
        Ok(())
    }

    fn resolve_strategy(&self, config: &DocumentConfig) -> Result<ConflictStrategy, Error> {
        let declared = config
            .merge_conflict
            .as_deref()
            .map(str::parse::<ConflictStrategy>)
            .transpose()?;
        Ok(self
            .options
            .merge_conflict
            .or(declared)
            .unwrap_or_default())
    }

    /// Pops `$import` at every mapping level and loads each listed document
    /// into that same mapping, depth-first in declaration order.
    fn expand_imports(
        &mut self,
        node: &mut Map<String, Value>,
        name: &str,
        base_dir: Option<&Path>,
        strategy: ConflictStrategy,
    ) -> Result<(), Error> {
        if let Some(imports) = node.shift_remove(IMPORT_KEY) {
            let Some(base_dir) = base_dir else {
                return Err(Error::ImportWithoutPath {
                    source_name: name.to_string(),
                });
            };
            for relative in import_paths(imports, name)? {
                let path = base_dir.join(&relative);
                debug!("`{}` imports `{}`", name, path.display());
                self.load_path(&path, node, Some(strategy))?;
            }
        }

        for child in node.values_mut() {
            if let Value::Object(map) = child {
                self.expand_imports(map, name, base_dir, strategy)?;
            }
        }
        Ok(())
    }
}

fn take_config(content: &mut Map<String, Value>, name: &str) -> Result<DocumentConfig, Error> {
    match content.shift_remove(CONFIG_KEY) {
        None | Some(Value::Null) => Ok(DocumentConfig::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| {
            Error::configuration_error(format!("invalid `{}` block in `{}`: {}", CONFIG_KEY, name, e))
        }),
    }
}

fn import_paths(value: Value, name: &str) -> Result<Vec<String>, Error> {
    let malformed = |message: String| Error::MalformedImport {
        path: name.to_string(),
        message,
    };

    let Value::Array(items) = value else {
        return Err(malformed(format!(
            "expected a list of paths, found {}",
            kind_of(&value)
        )));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(path) => Ok(path),
            other => Err(malformed(format!(
                "expected a path string, found {}",
                kind_of(&other)
            ))),
        })
        .collect()
}

/// Wraps `content` so that `"a.b"` yields `{"+a": {"+b": content}}`.
fn nest_under_section(
    content: Map<String, Value>,
    section: Option<&str>,
) -> Result<Map<String, Value>, Error> {
    let Some(section) = section else {
        return Ok(content);
    };

    let segments = section.split('.').map(str::trim).collect::<Vec<_>>();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::configuration_error(format!(
            "invalid section path `{}`",
            section
        )));
    }

    Ok(segments.into_iter().rev().fold(content, |inner, segment| {
        let mut outer = Map::new();
        outer.insert(format!("+{}", segment), Value::Object(inner));
        outer
    }))
}

/// Deep-merges `source` into `target`. Mappings merge key by key; any other
/// collision with a differing value is settled by `strategy`.
fn merge_maps(
    target: &mut Map<String, Value>,
    source: Map<String, Value>,
    strategy: ConflictStrategy,
    name: &str,
    prefix: &str,
) -> Result<(), Error> {
    for (key, value) in source {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match target.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), value) {
                (Value::Object(existing), Value::Object(incoming)) => {
                    merge_maps(existing, incoming, strategy, name, &dotted)?;
                }
                (existing, incoming) if *existing == incoming => {}
                (existing, incoming) => match strategy {
                    ConflictStrategy::Raise => {
                        return Err(Error::MergeConflict {
                            path: name.to_string(),
                            key: dotted,
                        });
                    }
                    ConflictStrategy::Ignore => {
                        trace!("`{}`: keeping existing value of `{}`", name, dotted);
                    }
                    ConflictStrategy::Override => {
                        trace!("`{}`: overriding `{}`", name, dotted);
                        *existing = incoming;
                    }
                },
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MemorySource;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a mapping"),
        }
    }

    fn loader(source: MemorySource) -> Loader {
        Loader::new(
            Arc::new(source),
            LoadOptions::default().with_supported_version(Version::new(1, 0, 0)),
        )
    }

    #[test]
    fn test_merge_override_replaces_leaves() {
        let mut target = object(json!({ "hi": { "en": "Hi", "fr": "Salut" } }));
        let source = object(json!({ "hi": { "en": "Hello", "de": "Hallo" } }));
        merge_maps(&mut target, source, ConflictStrategy::Override, "b", "").unwrap();
        assert_eq!(
            Value::Object(target),
            json!({ "hi": { "en": "Hello", "fr": "Salut", "de": "Hallo" } })
        );
    }

    #[test]
    fn test_merge_ignore_keeps_first() {
        let mut target = object(json!({ "hi": { "en": "Hi" } }));
        let source = object(json!({ "hi": { "en": "Hello" }, "bye": "Bye" }));
        merge_maps(&mut target, source, ConflictStrategy::Ignore, "b", "").unwrap();
        assert_eq!(Value::Object(target), json!({ "hi": { "en": "Hi" }, "bye": "Bye" }));
    }

    #[test]
    fn test_merge_raise_names_dotted_key() {
        let mut target = object(json!({ "+a": { "hi": { "en": "Hi" } } }));
        let source = object(json!({ "+a": { "hi": { "en": "Hello" } } }));
        let err = merge_maps(&mut target, source, ConflictStrategy::Raise, "b.yaml", "").unwrap_err();
        match err {
            Error::MergeConflict { path, key } => {
                assert_eq!(path, "b.yaml");
                assert_eq!(key, "+a.hi.en");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_merge_raise_allows_identical_values() {
        let mut target = object(json!({ "hi": { "en": "Hi" } }));
        let source = object(json!({ "hi": { "en": "Hi" } }));
        merge_maps(&mut target, source, ConflictStrategy::Raise, "b", "").unwrap();
    }

    #[test]
    fn test_merge_map_against_scalar_is_a_leaf_conflict() {
        let mut target = object(json!({ "hi": "plain" }));
        let source = object(json!({ "hi": { "en": "Hi" } }));
        assert!(merge_maps(&mut target.clone(), source.clone(), ConflictStrategy::Raise, "b", "").is_err());
        merge_maps(&mut target, source, ConflictStrategy::Override, "b", "").unwrap();
        assert_eq!(target["hi"], json!({ "en": "Hi" }));
    }

    #[test]
    fn test_nest_under_section() {
        let nested = nest_under_section(object(json!({ "x": 1 })), Some("a.b")).unwrap();
        assert_eq!(Value::Object(nested), json!({ "+a": { "+b": { "x": 1 } } }));
        assert!(nest_under_section(Map::new(), Some("a..b")).is_err());
    }

    #[test]
    fn test_import_paths_validation() {
        assert_eq!(
            import_paths(json!(["a.yaml", "b.yaml"]), "doc").unwrap(),
            vec!["a.yaml", "b.yaml"]
        );
        assert!(matches!(
            import_paths(json!("a.yaml"), "doc"),
            Err(Error::MalformedImport { .. })
        ));
        assert!(matches!(
            import_paths(json!(["a.yaml", 3]), "doc"),
            Err(Error::MalformedImport { .. })
        ));
    }

    #[test]
    fn test_load_strips_config_block() {
        let source = MemorySource::new().with_document(
            "app.yaml",
            "tie:\n  version: \"0.1\"\n  default_locale: fr\nhello:\n  fr: Salut\n",
        );
        let mut loader = loader(source);
        loader.load(["app.yaml"]).unwrap();
        assert!(!loader.tree().contains_key("tie"));
        assert_eq!(loader.default_locale(), "fr");
        assert_eq!(loader.version(), Version::new(0, 1, 0));
    }

    #[test]
    fn test_import_lands_at_declaring_level() {
        let source = MemorySource::new()
            .with_document(
                "res/main.yaml",
                "+menu:\n  $import: [parts/menu.yaml]\n  close:\n    en: Close\n",
            )
            .with_document("res/parts/menu.yaml", "open:\n  en: Open\n");
        let mut loader = loader(source);
        loader.load(["res/main.yaml"]).unwrap();
        assert_eq!(
            Value::Object(loader.tree().clone()),
            json!({ "+menu": { "close": { "en": "Close" }, "open": { "en": "Open" } } })
        );
        assert_eq!(loader.loaded_paths().len(), 2);
    }

    #[test]
    fn test_cyclic_import_is_rejected() {
        let source = MemorySource::new()
            .with_document("a.yaml", "$import: [b.yaml]\nx: 1\n")
            .with_document("b.yaml", "$import: [a.yaml]\ny: 2\n");
        let mut loader = loader(source);
        let err = loader.load(["a.yaml"]).unwrap_err();
        assert!(matches!(err, Error::CyclicImport { ref path } if path == "a.yaml"));
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let source = MemorySource::new()
            .with_document("a.yaml", "x: 1\n")
            .with_document("b.yaml", "tie:\n  version: 9.0.0\ny: 2\n");
        let mut loader = loader(source);
        loader.load(["a.yaml"]).unwrap();
        let err = loader.load(["b.yaml"]).unwrap_err();
        assert!(matches!(err, Error::VersionIncompatible { .. }));
        assert_eq!(Value::Object(loader.tree().clone()), json!({ "x": 1 }));
        assert_eq!(loader.loaded_paths().len(), 1);
    }

    #[test]
    fn test_reader_rejects_imports() {
        let mut loader = loader(MemorySource::new());
        let err = loader
            .load_reader("$import: [x.yaml]\n".as_bytes(), FormatType::Yaml, "<stdin>")
            .unwrap_err();
        assert!(matches!(err, Error::ImportWithoutPath { ref source_name } if source_name == "<stdin>"));
    }

    #[test]
    fn test_constructor_policy_beats_document_policy() {
        let source = MemorySource::new()
            .with_document("a.yaml", "hi: one\n")
            .with_document("b.yaml", "tie:\n  merge_conflict: raise\nhi: two\n");
        let mut loader = Loader::new(
            Arc::new(source),
            LoadOptions::default().with_merge_conflict(Some(ConflictStrategy::Ignore)),
        );
        loader.load(["a.yaml", "b.yaml"]).unwrap();
        assert_eq!(loader.tree()["hi"], json!("one"));
    }

    #[test]
    fn test_unknown_document_policy_is_fatal() {
        let source = MemorySource::new().with_document("a.yaml", "tie:\n  merge_conflict: merge\n");
        let err = loader(source).load(["a.yaml"]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }
}
