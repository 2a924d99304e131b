#![forbid(unsafe_code)]

//! Text change records.
//!
//! An [`EditRecord`] is one atomic replace-span edit: `old_text` at `start`
//! was replaced by `new_text`. Pure insertions have an empty `old_text`,
//! pure deletions an empty `new_text`.
//!
//! Offsets are measured in characters (Unicode scalar values), not bytes,
//! so records stay valid for buffers holding multi-byte text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One atomic edit applied to a document's text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditRecord {
    /// Text span that was replaced.
    pub old_text: String,
    /// Text span that replaced it.
    pub new_text: String,
    /// Zero-based character offset where the edit was applied.
    pub start: usize,
}

impl EditRecord {
    /// Create a replacement record.
    #[must_use]
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>, start: usize) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
            start,
        }
    }

    /// Create a pure insertion.
    #[must_use]
    pub fn insert(start: usize, text: impl Into<String>) -> Self {
        Self::new(String::new(), text, start)
    }

    /// Create a pure deletion.
    #[must_use]
    pub fn delete(start: usize, text: impl Into<String>) -> Self {
        Self::new(text, String::new(), start)
    }

    /// Whether either text field contains `ch`.
    #[must_use]
    pub fn contains_char(&self, ch: char) -> bool {
        self.old_text.contains(ch) || self.new_text.contains(ch)
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.old_text.len() + self.new_text.len()
    }

    /// Re-apply the edit: replace `old_text` at `start` with `new_text`.
    pub fn apply(&self, buffer: &mut String) -> Result<(), ChangeError> {
        replace_span(buffer, self.start, &self.old_text, &self.new_text)
    }

    /// Reverse the edit: replace `new_text` at `start` with `old_text`.
    pub fn revert(&self, buffer: &mut String) -> Result<(), ChangeError> {
        replace_span(buffer, self.start, &self.new_text, &self.old_text)
    }
}

impl fmt::Display for EditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{}: {:?} -> {:?}",
            self.start, self.old_text, self.new_text
        )
    }
}

/// Errors raised when applying a record to a buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    #[error("offset {offset} is past the end of the buffer ({length} chars)")]
    OffsetOutOfBounds { offset: usize, length: usize },

    #[error("expected {expected:?} at offset {offset}, found {actual:?}")]
    SpanMismatch {
        offset: usize,
        expected: String,
        actual: String,
    },
}

/// Map a character offset to a byte offset, allowing one-past-the-end.
fn byte_offset(buffer: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    match buffer.char_indices().nth(char_offset) {
        Some((idx, _)) => Some(idx),
        None if buffer.chars().count() == char_offset => Some(buffer.len()),
        None => None,
    }
}

fn replace_span(
    buffer: &mut String,
    start: usize,
    expected: &str,
    replacement: &str,
) -> Result<(), ChangeError> {
    let length = buffer.chars().count();
    let from = byte_offset(buffer, start).ok_or(ChangeError::OffsetOutOfBounds {
        offset: start,
        length,
    })?;
    let end = from + expected.len();
    match buffer.get(from..end) {
        Some(actual) if actual == expected => {
            buffer.replace_range(from..end, replacement);
            Ok(())
        }
        actual => Err(ChangeError::SpanMismatch {
            offset: start,
            expected: expected.to_string(),
            actual: actual.unwrap_or_default().to_string(),
        }),
    }
}
