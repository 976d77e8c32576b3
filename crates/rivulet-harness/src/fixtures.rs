#![forbid(unsafe_code)]

//! Text resources exposed as [`Single`] sources.
//!
//! A [`ResourceStore`] resolves a resource name to UTF-8 text, either from
//! entries registered in memory or from `<root>/<name>.txt` on disk. Each
//! subscription to [`ResourceStore::load_text`] performs a fresh lookup and
//! resolves with the text or a [`FileReadError`].
//!
//! # Failure Modes
//!
//! | Condition | Error |
//! |-----------|-------|
//! | No entry and no file | [`FileReadError::NotFound`] |
//! | Entry marked unreadable, or the file read fails | [`FileReadError::Unreadable`] |
//! | Bytes are not valid UTF-8 | [`FileReadError::EncodingFailed`] |

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rivulet_core::{Disposable, Single};
use tracing::debug;

/// Why a resource could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReadError {
    NotFound { name: String },
    Unreadable { name: String, reason: String },
    EncodingFailed { name: String },
}

impl fmt::Display for FileReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "resource not found: {name}"),
            Self::Unreadable { name, reason } => {
                write!(f, "resource unreadable: {name} ({reason})")
            }
            Self::EncodingFailed { name } => write!(f, "resource is not valid UTF-8: {name}"),
        }
    }
}

impl std::error::Error for FileReadError {}

#[derive(Debug, Clone)]
enum Entry {
    Bytes(Vec<u8>),
    Unreadable(String),
}

#[derive(Debug, Clone, Default)]
struct StoreInner {
    entries: BTreeMap<String, Entry>,
    root: Option<PathBuf>,
}

/// Named text resources. Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    inner: Arc<StoreInner>,
}

/// File extension appended to names looked up on disk.
pub const RESOURCE_EXTENSION: &str = "txt";

impl ResourceStore {
    /// An empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that falls back to `<root>/<name>.txt`.
    #[must_use]
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: BTreeMap::new(),
                root: Some(root.into()),
            }),
        }
    }

    fn with_entry(self, name: &str, entry: Entry) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.inner);
        inner.entries.insert(name.to_string(), entry);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Register UTF-8 text under `name`.
    #[must_use]
    pub fn with_text(self, name: &str, text: &str) -> Self {
        self.with_entry(name, Entry::Bytes(text.as_bytes().to_vec()))
    }

    /// Register raw bytes under `name`.
    #[must_use]
    pub fn with_bytes(self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_entry(name, Entry::Bytes(bytes.into()))
    }

    /// Register `name` as present but unreadable.
    #[must_use]
    pub fn with_unreadable(self, name: &str, reason: &str) -> Self {
        self.with_entry(name, Entry::Unreadable(reason.to_string()))
    }

    /// Directory consulted for names with no memory entry.
    pub fn root(&self) -> Option<&Path> {
        self.inner.root.as_deref()
    }

    /// Resolve `name` to text now.
    ///
    /// # Errors
    ///
    /// See the module-level failure table.
    pub fn read_text(&self, name: &str) -> Result<String, FileReadError> {
        let bytes = match self.inner.entries.get(name) {
            Some(Entry::Bytes(bytes)) => bytes.clone(),
            Some(Entry::Unreadable(reason)) => {
                return Err(FileReadError::Unreadable {
                    name: name.to_string(),
                    reason: reason.clone(),
                });
            }
            None => self.read_file(name)?,
        };
        String::from_utf8(bytes).map_err(|_| FileReadError::EncodingFailed {
            name: name.to_string(),
        })
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, FileReadError> {
        let not_found = || FileReadError::NotFound {
            name: name.to_string(),
        };
        let root = self.inner.root.as_ref().ok_or_else(not_found)?;
        let path = root.join(format!("{name}.{RESOURCE_EXTENSION}"));
        if !path.is_file() {
            return Err(not_found());
        }
        std::fs::read(&path).map_err(|err| FileReadError::Unreadable {
            name: name.to_string(),
            reason: err.to_string(),
        })
    }

    /// A [`Single`] that loads `name` on each subscription.
    ///
    /// ```
    /// use rivulet_core::prelude::*;
    /// use rivulet_harness::ResourceStore;
    ///
    /// let store = ResourceStore::new().with_text("Copyright", "(c) 2017");
    /// let _sub = store
    ///     .load_text("Copyright")
    ///     .subscribe_success(|text| assert_eq!(text, "(c) 2017"));
    /// ```
    pub fn load_text(&self, name: &str) -> Single<String> {
        let store = self.clone();
        let name = name.to_string();
        Single::create(move |emitter| {
            match store.read_text(&name) {
                Ok(text) => {
                    debug!(resource = %name, bytes = text.len(), "resource loaded");
                    emitter.success(text);
                }
                Err(err) => {
                    debug!(resource = %name, error = %err, "resource load failed");
                    emitter.error(err);
                }
            }
            Disposable::empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_entries_resolve() {
        let store = ResourceStore::new()
            .with_text("a", "alpha")
            .with_bytes("bad", vec![0xff, 0xfe])
            .with_unreadable("locked", "permission denied");

        assert_eq!(store.read_text("a"), Ok("alpha".to_string()));
        assert_eq!(
            store.read_text("bad"),
            Err(FileReadError::EncodingFailed { name: "bad".into() })
        );
        assert!(matches!(
            store.read_text("locked"),
            Err(FileReadError::Unreadable { .. })
        ));
        assert_eq!(
            store.read_text("missing"),
            Err(FileReadError::NotFound { name: "missing".into() })
        );
    }

    #[test]
    fn directory_lookup_uses_txt_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Copyright.txt"), "text on disk").expect("write");
        std::fs::write(dir.path().join("Latin1.txt"), [0xe9u8]).expect("write");

        let store = ResourceStore::from_dir(dir.path());
        assert_eq!(store.read_text("Copyright"), Ok("text on disk".to_string()));
        assert!(matches!(
            store.read_text("Latin1"),
            Err(FileReadError::EncodingFailed { .. })
        ));
        assert!(matches!(
            store.read_text("Other"),
            Err(FileReadError::NotFound { .. })
        ));
    }

    #[test]
    fn memory_entry_shadows_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("x.txt"), "disk").expect("write");
        let store = ResourceStore::from_dir(dir.path()).with_text("x", "memory");
        assert_eq!(store.read_text("x"), Ok("memory".to_string()));
        assert_eq!(store.root(), Some(dir.path()));
    }

    #[test]
    fn error_display() {
        let err = FileReadError::Unreadable {
            name: "n".into(),
            reason: "denied".into(),
        };
        assert_eq!(err.to_string(), "resource unreadable: n (denied)");
    }
}
