#![forbid(unsafe_code)]

//! Flat text codec for edit stacks.
//!
//! # Wire Format
//!
//! ```text
//! old<D>new<D>start<D>old<D>new<D>start ... old<D>new<D>start
//! ```
//!
//! `<D>` is [`DELIMITER`] (U+0005). Records are written top of stack first,
//! three fields each, with no delimiter after the final field. An empty
//! stack encodes to the empty string.
//!
//! Decoding walks the fields backward in triples, so the bottom record is
//! pushed first and the original push order is reconstructed. Leading
//! fields that do not form a complete triple are dropped.
//!
//! # Failure Modes
//!
//! - **Delimiter in text**: a record whose text contains U+0005 cannot be
//!   told apart from a field boundary. The format is kept as-is for
//!   compatibility with existing caches; [`encode`] logs a warning.
//! - **Non-numeric start**: [`decode`] returns [`CodecError::InvalidStart`]
//!   and no partial stack.

use std::num::ParseIntError;

use crate::change::EditRecord;
use crate::stack::EditStack;

/// Field separator. A control character assumed absent from source text.
pub const DELIMITER: char = '\u{0005}';

/// Errors from [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("invalid start offset {value:?} in field {index}: {source}")]
    InvalidStart {
        /// Index of the offending field in the split blob.
        index: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Encode a stack, top of stack first.
#[must_use]
pub fn encode(stack: &EditStack) -> String {
    let mut out = String::with_capacity(stack.size_bytes());
    for (depth, record) in stack.iter().rev().enumerate() {
        if record.contains_char(DELIMITER) {
            tracing::warn!(
                depth,
                start = record.start,
                "edit record contains the field delimiter; cache will not round-trip"
            );
        }
        out.push_str(&record.old_text);
        out.push(DELIMITER);
        out.push_str(&record.new_text);
        out.push(DELIMITER);
        out.push_str(&record.start.to_string());
        out.push(DELIMITER);
    }
    out.pop();
    out
}

/// Decode a blob produced by [`encode`].
///
/// A single trailing `\n` left by buffered writers is ignored.
pub fn decode(raw: &str) -> Result<EditStack, CodecError> {
    let mut stack = EditStack::new();
    if raw.is_empty() {
        return Ok(stack);
    }

    let mut fields: Vec<&str> = raw.split(DELIMITER).collect();
    if let Some(last) = fields.last_mut() {
        if let Some(stripped) = last.strip_suffix('\n') {
            *last = stripped;
        }
    }

    let leftover = fields.len() % 3;
    if leftover != 0 {
        tracing::debug!(
            fields = fields.len(),
            discarded = leftover,
            "dropping incomplete leading fields"
        );
    }

    let Some(mut i) = fields.len().checked_sub(3) else {
        return Ok(stack);
    };
    loop {
        stack.push(parse_record(&fields, i)?);
        if i < 3 {
            break;
        }
        i -= 3;
    }
    Ok(stack)
}

fn parse_record(fields: &[&str], i: usize) -> Result<EditRecord, CodecError> {
    let raw_start = fields[i + 2];
    let start = raw_start
        .parse::<usize>()
        .map_err(|source| CodecError::InvalidStart {
            index: i + 2,
            value: raw_start.to_string(),
            source,
        })?;
    Ok(EditRecord::new(fields[i], fields[i + 1], start))
}
