#![forbid(unsafe_code)]

//! Whole-file text I/O.
//!
//! The store reads and writes the content blob through a [`Filesystem`] so
//! hosts can substitute their own storage. [`LocalFilesystem`] is the
//! `std::fs` implementation.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Line separator applied when saving text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreak {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl LineBreak {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }
}

/// Per-call options for [`Filesystem`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileParams {
    pub line_break: LineBreak,
}

impl FileParams {
    #[must_use]
    pub fn with_line_break(mut self, line_break: LineBreak) -> Self {
        self.line_break = line_break;
        self
    }
}

/// Read/write of whole-file text content at a path.
///
/// In memory, text uses `\n` line endings. `save_file` writes each `\n` as
/// `params.line_break` and `load_file` maps that separator back to `\n`.
/// Every other byte, including a lone `\r` under [`LineBreak::Lf`], is kept.
pub trait Filesystem {
    fn load_file(&self, path: &Path, params: &FileParams) -> io::Result<String>;

    /// Overwrite the file, creating it if absent.
    fn save_file(&self, path: &Path, text: &str, params: &FileParams) -> io::Result<()>;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn load_file(&self, path: &Path, params: &FileParams) -> io::Result<String> {
        let text = std::fs::read_to_string(path)?;
        Ok(match params.line_break {
            LineBreak::Lf => text,
            other => text.replace(other.as_str(), "\n"),
        })
    }

    fn save_file(&self, path: &Path, text: &str, params: &FileParams) -> io::Result<()> {
        match params.line_break {
            LineBreak::Lf => std::fs::write(path, text),
            other => std::fs::write(path, text.replace('\n', other.as_str())),
        }
    }
}
