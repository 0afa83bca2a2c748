//! The document-opening capability injected into the loader.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::{Component, Path, PathBuf},
};

/// Opens documents by path. The loader never touches the filesystem directly.
///
/// # Example
///
/// ```rust
/// use tie::traits::{DocumentSource, MemorySource};
/// use std::io::Read;
///
/// let source = MemorySource::new().with_document("app.yaml", "hello:\n  en: Hi\n");
/// let mut text = String::new();
/// source.open("app.yaml".as_ref())?.read_to_string(&mut text)?;
/// assert!(text.contains("Hi"));
/// # Ok::<(), std::io::Error>(())
/// ```
pub trait DocumentSource: Debug + Send + Sync {
    /// Open the document at `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// The identity of `path`, used to detect documents loaded twice.
    fn resolve(&self, path: &Path) -> PathBuf {
        normalize(path)
    }
}

/// Reads documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl DocumentSource for FileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
    }
}

/// Serves documents from memory, keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document under `path`.
    pub fn with_document(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.documents
            .insert(normalize(path.as_ref()), content.into());
    }
}

impl DocumentSource for MemorySource {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        match self.documents.get(&normalize(path)) {
            Some(content) => Ok(Box::new(Cursor::new(content.as_bytes()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no document registered at {}", path.display()),
            )),
        }
    }
}

/// Lexically removes `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
