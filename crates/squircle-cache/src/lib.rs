#![forbid(unsafe_code)]

//! Document cache for the Squircle editor.
//!
//! An editing session keeps its edits in an [`EditHistory`]. On teardown the
//! session's text and both stacks are written to a [`StackStore`]; on resume
//! the store reads them back and the history is rebuilt.
//!
//! # Quick Start
//!
//! ```no_run
//! use squircle_cache::{DocumentModel, EditHistory, EditRecord, InMemoryRegistry, StackStore};
//!
//! let store = StackStore::new("/data/cache", InMemoryRegistry::new());
//! let doc = DocumentModel::new("3f2a", "main.js", "/sdcard/main.js");
//!
//! let mut history = EditHistory::default();
//! history.record(EditRecord::insert(0, "let x;"));
//! store.save_session(&doc, "let x;", &history)?;
//!
//! let content = store.load_content(&doc)?;
//! assert_eq!(content.undo_stack.len(), 1);
//! # Ok::<(), squircle_cache::CacheError>(())
//! ```
//!
//! # Module Structure
//!
//! - [`change`]: the [`EditRecord`] text change
//! - [`stack`]: [`EditStack`], the ordered undo or redo stack
//! - [`history`]: [`EditHistory`], paired undo/redo stacks
//! - [`codec`]: flat text encoding of a stack
//! - [`store`]: [`StackStore`], per-document blobs on disk
//! - [`registry`]: document metadata registry
//! - [`filesystem`]: whole-file text I/O
//! - [`language`]: language detection from a file name
//! - [`config`]: [`CacheConfig`]

pub mod change;
pub mod codec;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod history;
pub mod language;
pub mod registry;
pub mod stack;
pub mod store;

pub use change::{ChangeError, EditRecord};
pub use codec::{CodecError, DELIMITER};
pub use config::{CacheConfig, ConfigError};
pub use error::{CacheError, Result};
pub use filesystem::{FileParams, Filesystem, LineBreak, LocalFilesystem};
pub use history::EditHistory;
pub use language::Language;
pub use registry::{DocumentModel, DocumentRegistry, InMemoryRegistry, JsonFileRegistry, RegistryError};
pub use stack::{EditStack, StackConfig};
pub use store::{BlobRole, DocumentContent, StackStore};
