#![forbid(unsafe_code)]

//! Per-document cache blobs.
//!
//! [`StackStore`] keeps three flat text files per document under one cache
//! root:
//!
//! ```text
//! <cache_dir>/
//!   <id>.cache        content
//!   <id>-undo.cache   undo stack (see crate::codec)
//!   <id>-redo.cache   redo stack
//! ```
//!
//! # Failure Policy
//!
//! - Filesystem errors on save, load and delete propagate as
//!   [`CacheError::Io`].
//! - A missing undo/redo blob loads as an empty stack.
//! - A malformed undo/redo blob (bad `start` field) also loads as an empty
//!   stack; the document still opens, it just loses its history.
//! - Invalid UTF-8 in an undo/redo blob is decoded lossily.
//!
//! # Concurrency
//!
//! Every call is a plain blocking operation. There is no per-document
//! locking: concurrent saves of the same blob are last-writer-wins. Each
//! stack write goes to its own temp file in the cache root before it is
//! renamed over the blob.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::codec;
use crate::error::{CacheError, Result};
use crate::filesystem::{FileParams, Filesystem, LocalFilesystem};
use crate::history::EditHistory;
use crate::language::Language;
use crate::registry::{DocumentModel, DocumentRegistry};
use crate::stack::{EditStack, StackConfig};

/// Which of a document's blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobRole {
    Content,
    Undo,
    Redo,
}

impl BlobRole {
    pub const ALL: [Self; 3] = [Self::Content, Self::Undo, Self::Redo];

    /// File name for `document_id` in this role.
    #[must_use]
    pub fn file_name(self, document_id: &str) -> String {
        match self {
            Self::Content => format!("{document_id}.cache"),
            Self::Undo => format!("{document_id}-undo.cache"),
            Self::Redo => format!("{document_id}-redo.cache"),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

/// Everything needed to resume editing a cached document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub document: DocumentModel,
    pub language: Language,
    pub undo_stack: EditStack,
    pub redo_stack: EditStack,
    pub text: String,
}

impl DocumentContent {
    /// Rebuild the session's history from the restored stacks.
    #[must_use]
    pub fn history(&self) -> EditHistory {
        EditHistory::from_stacks(self.undo_stack.clone(), self.redo_stack.clone())
    }
}

/// File-backed cache for document content and undo/redo stacks.
#[derive(Debug)]
pub struct StackStore<R, F = LocalFilesystem> {
    cache_dir: PathBuf,
    registry: R,
    filesystem: F,
    params: FileParams,
    stack_config: StackConfig,
}

impl<R: DocumentRegistry> StackStore<R, LocalFilesystem> {
    /// Store rooted at `cache_dir` using the local filesystem.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>, registry: R) -> Self {
        Self::with_filesystem(cache_dir, registry, LocalFilesystem)
    }
}

impl<R: DocumentRegistry, F: Filesystem> StackStore<R, F> {
    #[must_use]
    pub fn with_filesystem(cache_dir: impl Into<PathBuf>, registry: R, filesystem: F) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            registry,
            filesystem,
            params: FileParams::default(),
            stack_config: StackConfig::unlimited(),
        }
    }

    /// Options passed to the filesystem for content blobs.
    #[must_use]
    pub fn with_file_params(mut self, params: FileParams) -> Self {
        self.params = params;
        self
    }

    /// Depth limit applied to stacks restored from disk.
    #[must_use]
    pub fn with_stack_config(mut self, config: StackConfig) -> Self {
        self.stack_config = config;
        self
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[must_use]
    pub fn blob_path(&self, document_id: &str, role: BlobRole) -> PathBuf {
        self.cache_dir.join(role.file_name(document_id))
    }

    /// Whether the content blob exists.
    #[must_use]
    pub fn is_cached(&self, document_id: &str) -> bool {
        self.blob_path(document_id, BlobRole::Content).exists()
    }

    /// Overwrite the content blob, then record the document in the registry.
    pub fn save_content(&self, document: &DocumentModel, text: &str) -> Result<()> {
        self.ensure_cache_dir()?;
        let path = self.blob_path(&document.uuid, BlobRole::Content);
        self.filesystem
            .save_file(&path, text, &self.params)
            .map_err(|e| CacheError::io(&path, e))?;
        tracing::debug!(document_id = %document.uuid, bytes = text.len(), "saved content blob");
        self.registry.upsert(document)?;
        Ok(())
    }

    pub fn save_undo(&self, document_id: &str, stack: &EditStack) -> Result<()> {
        self.save_stack(document_id, BlobRole::Undo, stack)
    }

    pub fn save_redo(&self, document_id: &str, stack: &EditStack) -> Result<()> {
        self.save_stack(document_id, BlobRole::Redo, stack)
    }

    /// Save content and both stacks of a live session.
    pub fn save_session(
        &self,
        document: &DocumentModel,
        text: &str,
        history: &EditHistory,
    ) -> Result<()> {
        self.save_content(document, text)?;
        self.save_undo(&document.uuid, history.undo_stack())?;
        self.save_redo(&document.uuid, history.redo_stack())
    }

    /// Read the content blob and both stacks.
    ///
    /// Fails if any existing blob cannot be read. Malformed stack contents
    /// are not an error.
    pub fn load_content(&self, document: &DocumentModel) -> Result<DocumentContent> {
        let path = self.blob_path(&document.uuid, BlobRole::Content);
        let text = self
            .filesystem
            .load_file(&path, &self.params)
            .map_err(|e| CacheError::io(&path, e))?;
        Ok(DocumentContent {
            document: document.clone(),
            language: Language::from_file_name(&document.name),
            undo_stack: self.load_undo_stack(&document.uuid)?,
            redo_stack: self.load_redo_stack(&document.uuid)?,
            text,
        })
    }

    /// Absent or malformed blob gives an empty stack; read failures propagate.
    pub fn load_undo_stack(&self, document_id: &str) -> Result<EditStack> {
        self.load_stack(document_id, BlobRole::Undo)
    }

    pub fn load_redo_stack(&self, document_id: &str) -> Result<EditStack> {
        self.load_stack(document_id, BlobRole::Redo)
    }

    /// Remove all three blobs, then the registry entry. Idempotent.
    pub fn delete_cache(&self, document: &DocumentModel) -> Result<()> {
        for role in BlobRole::ALL {
            let path = self.blob_path(&document.uuid, role);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(document_id = %document.uuid, role = role.as_str(), "deleted blob");
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io(&path, e)),
            }
        }
        self.registry.delete(&document.uuid)?;
        Ok(())
    }

    /// Remove every entry under the cache root, best-effort.
    ///
    /// Returns how many entries were removed. Entries that cannot be removed
    /// are logged and skipped.
    pub fn delete_all_caches(&self) -> usize {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(dir = %self.cache_dir.display(), error = %e, "cannot list cache dir");
                }
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let result = if is_dir {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete cache entry");
                }
            }
        }
        tracing::info!(removed, "cleared cache dir");
        removed
    }

    fn ensure_cache_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| CacheError::io(&self.cache_dir, e))
    }

    /// Create any of the three blobs that do not exist yet.
    fn create_blobs_if_missing(&self, document_id: &str) -> Result<()> {
        self.ensure_cache_dir()?;
        for role in BlobRole::ALL {
            let path = self.blob_path(document_id, role);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(CacheError::io(&path, e)),
            }
        }
        Ok(())
    }

    fn save_stack(&self, document_id: &str, role: BlobRole, stack: &EditStack) -> Result<()> {
        self.create_blobs_if_missing(document_id)?;
        let path = self.blob_path(document_id, role);
        let encoded = codec::encode(stack);

        let mut temp = NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| CacheError::io(&self.cache_dir, e))?;
        temp.write_all(encoded.as_bytes())
            .map_err(|e| CacheError::io(&path, e))?;
        temp.persist(&path)
            .map_err(|e| CacheError::io(&path, e.error))?;

        tracing::debug!(
            document_id,
            role = role.as_str(),
            records = stack.len(),
            "saved stack blob"
        );
        Ok(())
    }

    fn load_stack(&self, document_id: &str, role: BlobRole) -> Result<EditStack> {
        let mut stack = EditStack::with_config(self.stack_config);
        let path = self.blob_path(document_id, role);
        if !path.exists() {
            return Ok(stack);
        }

        let bytes = fs::read(&path).map_err(|e| CacheError::io(&path, e))?;
        let raw = String::from_utf8_lossy(&bytes);
        match codec::decode(&raw) {
            Ok(decoded) => {
                for record in decoded {
                    stack.push(record);
                }
            }
            Err(e) => {
                tracing::warn!(
                    document_id,
                    role = role.as_str(),
                    error = %e,
                    "malformed stack blob, starting with empty history"
                );
            }
        }
        Ok(stack)
    }
}
