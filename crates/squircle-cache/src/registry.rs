#![forbid(unsafe_code)]

//! Document metadata registry.
//!
//! The cache store notifies a [`DocumentRegistry`] when a document's content
//! is saved (upsert) and when its cache is discarded (delete). Two backends
//! are provided:
//!
//! - [`InMemoryRegistry`]: process-local map, for tests and embedding.
//! - [`JsonFileRegistry`]: a versioned JSON file on disk.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "documents": [
//!     { "uuid": "0b6f...", "name": "main.rs", "path": "/sdcard/main.rs",
//!       "modified": true, "position": 0 }
//!   ]
//! }
//! ```
//!
//! Writes use a temp-file-then-rename pattern to prevent corruption on crash.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Current file format version.
const FORMAT_VERSION: u64 = 1;

/// Metadata for one open document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Stable opaque identifier, independent of the file path.
    pub uuid: String,
    /// Display name, used for language detection.
    pub name: String,
    /// Source path on the device.
    pub path: String,
    /// Whether the buffer has unsaved changes.
    #[serde(default)]
    pub modified: bool,
    /// Tab position.
    #[serde(default)]
    pub position: usize,
}

impl DocumentModel {
    #[must_use]
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            path: path.into(),
            modified: false,
            position: 0,
        }
    }

    #[must_use]
    pub fn with_modified(mut self, modified: bool) -> Self {
        self.modified = modified;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported registry file version: {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u64 },
}

/// Create/update/delete access to document metadata.
pub trait DocumentRegistry {
    /// Insert or replace the entry for `document.uuid`.
    fn upsert(&self, document: &DocumentModel) -> Result<(), RegistryError>;

    /// Remove the entry for `uuid`. Removing a missing entry is not an error.
    fn delete(&self, uuid: &str) -> Result<(), RegistryError>;

    fn get(&self, uuid: &str) -> Result<Option<DocumentModel>, RegistryError>;

    /// All entries, ordered by tab position then uuid.
    fn list(&self) -> Result<Vec<DocumentModel>, RegistryError>;
}

fn sorted(documents: impl Iterator<Item = DocumentModel>) -> Vec<DocumentModel> {
    let mut out: Vec<DocumentModel> = documents.collect();
    out.sort_by(|a, b| (a.position, &a.uuid).cmp(&(b.position, &b.uuid)));
    out
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local registry.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    documents: Mutex<BTreeMap<String, DocumentModel>>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.documents).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.documents).is_empty()
    }
}

impl DocumentRegistry for InMemoryRegistry {
    fn upsert(&self, document: &DocumentModel) -> Result<(), RegistryError> {
        lock(&self.documents).insert(document.uuid.clone(), document.clone());
        Ok(())
    }

    fn delete(&self, uuid: &str) -> Result<(), RegistryError> {
        lock(&self.documents).remove(uuid);
        Ok(())
    }

    fn get(&self, uuid: &str) -> Result<Option<DocumentModel>, RegistryError> {
        Ok(lock(&self.documents).get(uuid).cloned())
    }

    fn list(&self) -> Result<Vec<DocumentModel>, RegistryError> {
        Ok(sorted(lock(&self.documents).values().cloned()))
    }
}

/// On-disk representation of the registry.
#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    version: u64,
    documents: Vec<DocumentModel>,
}

/// Registry persisted as a JSON file.
///
/// Every mutation rewrites the whole file. The in-process mutex serializes
/// callers sharing one instance; separate processes are not coordinated.
#[derive(Debug)]
pub struct JsonFileRegistry {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileRegistry {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file returns an empty map.
    fn load(&self) -> Result<BTreeMap<String, DocumentModel>, RegistryError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: RegistryFile = serde_json::from_str(&contents)?;
        if file.version != FORMAT_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                found: file.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(file
            .documents
            .into_iter()
            .map(|doc| (doc.uuid.clone(), doc))
            .collect())
    }

    fn store(&self, documents: &BTreeMap<String, DocumentModel>) -> Result<(), RegistryError> {
        let file = RegistryFile {
            version: FORMAT_VERSION,
            documents: sorted(documents.values().cloned()),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl DocumentRegistry for JsonFileRegistry {
    fn upsert(&self, document: &DocumentModel) -> Result<(), RegistryError> {
        let _guard = lock(&self.guard);
        let mut documents = self.load()?;
        documents.insert(document.uuid.clone(), document.clone());
        self.store(&documents)
    }

    fn delete(&self, uuid: &str) -> Result<(), RegistryError> {
        let _guard = lock(&self.guard);
        let mut documents = self.load()?;
        if documents.remove(uuid).is_some() {
            self.store(&documents)?;
        }
        Ok(())
    }

    fn get(&self, uuid: &str) -> Result<Option<DocumentModel>, RegistryError> {
        let _guard = lock(&self.guard);
        Ok(self.load()?.remove(uuid))
    }

    fn list(&self) -> Result<Vec<DocumentModel>, RegistryError> {
        let _guard = lock(&self.guard);
        Ok(sorted(self.load()?.into_values()))
    }
}
