#![forbid(unsafe_code)]

//! Edit stack used for undo or redo.
//!
//! [`EditStack`] is an ordered LIFO sequence of [`EditRecord`]s. Index 0 is
//! the bottom (oldest push), the last index is the top (newest push).
//!
//! # Invariants
//!
//! 1. Iteration order is push order (oldest first).
//! 2. `len() <= config.max_depth` after any push.
//! 3. Eviction only ever drops from the bottom.
//!
//! ```text
//! push(r1) push(r2) push(r3)
//! ┌───────────────────────────────┐
//! │ bottom [r1, r2, r3] top       │
//! └───────────────────────────────┘
//!
//! pop() -> r3
//! ┌───────────────────────────────┐
//! │ bottom [r1, r2] top           │
//! └───────────────────────────────┘
//! ```

use std::collections::VecDeque;

use crate::change::EditRecord;

/// Configuration for an edit stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackConfig {
    /// Maximum number of records to keep. Oldest records are evicted first.
    pub max_depth: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl StackConfig {
    /// Create a configuration with the given depth limit.
    ///
    /// A limit of 0 means unlimited.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        if max_depth == 0 {
            Self::unlimited()
        } else {
            Self { max_depth }
        }
    }

    /// Create an unlimited configuration.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Ordered, mutable stack of edit records.
#[derive(Debug, Clone, Default)]
pub struct EditStack {
    records: VecDeque<EditRecord>,
    config: StackConfig,
}

impl PartialEq for EditStack {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for EditStack {}

impl EditStack {
    /// Create an empty, unlimited stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stack with the given limits.
    #[must_use]
    pub fn with_config(config: StackConfig) -> Self {
        Self {
            records: VecDeque::new(),
            config,
        }
    }

    /// Push a record on top, evicting from the bottom if over the limit.
    pub fn push(&mut self, record: EditRecord) {
        self.records.push_back(record);
        while self.records.len() > self.config.max_depth {
            self.records.pop_front();
        }
    }

    /// Remove and return the top record.
    pub fn pop(&mut self) -> Option<EditRecord> {
        self.records.pop_back()
    }

    /// Top record without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&EditRecord> {
        self.records.back()
    }

    /// Record at `index`, counted from the bottom.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EditRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Iterate bottom to top (push order).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EditRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> StackConfig {
        self.config
    }

    /// Total bytes held by all records.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.records.iter().map(EditRecord::size_bytes).sum()
    }
}

impl FromIterator<EditRecord> for EditStack {
    fn from_iter<I: IntoIterator<Item = EditRecord>>(iter: I) -> Self {
        let mut stack = Self::new();
        for record in iter {
            stack.push(record);
        }
        stack
    }
}

impl IntoIterator for EditStack {
    type Item = EditRecord;
    type IntoIter = std::collections::vec_deque::IntoIter<EditRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a EditStack {
    type Item = &'a EditRecord;
    type IntoIter = std::collections::vec_deque::Iter<'a, EditRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(n: usize) -> EditRecord {
        EditRecord::insert(n, format!("r{n}"))
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut stack = EditStack::new();
        stack.push(rec(1));
        stack.push(rec(2));
        stack.push(rec(3));

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.peek(), Some(&rec(3)));
        assert_eq!(stack.pop(), Some(rec(3)));
        assert_eq!(stack.pop(), Some(rec(2)));
        assert_eq!(stack.pop(), Some(rec(1)));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn get_counts_from_bottom() {
        let stack: EditStack = (1..=3).map(rec).collect();
        assert_eq!(stack.get(0), Some(&rec(1)));
        assert_eq!(stack.get(2), Some(&rec(3)));
        assert_eq!(stack.get(3), None);
    }

    #[test]
    fn iteration_follows_push_order() {
        let stack: EditStack = (1..=4).map(rec).collect();
        let starts: Vec<usize> = stack.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![1, 2, 3, 4]);
        let reversed: Vec<usize> = stack.iter().rev().map(|r| r.start).collect();
        assert_eq!(reversed, vec![4, 3, 2, 1]);
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let mut stack = EditStack::with_config(StackConfig::new(2));
        stack.push(rec(1));
        stack.push(rec(2));
        stack.push(rec(3));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.get(0), Some(&rec(2)));
        assert_eq!(stack.peek(), Some(&rec(3)));
    }

    #[test]
    fn zero_depth_means_unlimited() {
        assert_eq!(StackConfig::new(0), StackConfig::unlimited());
        let mut stack = EditStack::with_config(StackConfig::new(0));
        for n in 0..500 {
            stack.push(rec(n));
        }
        assert_eq!(stack.len(), 500);
    }

    #[test]
    fn equality_ignores_config() {
        let mut limited = EditStack::with_config(StackConfig::new(10));
        limited.push(rec(1));
        let unlimited: EditStack = std::iter::once(rec(1)).collect();
        assert_eq!(limited, unlimited);
    }

    #[test]
    fn clear_and_size() {
        let mut stack: EditStack = (1..=3).map(rec).collect();
        assert!(stack.size_bytes() > 0);
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.size_bytes(), 0);
    }
}
