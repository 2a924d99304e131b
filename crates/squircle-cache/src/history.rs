#![forbid(unsafe_code)]

//! Undo/redo history for one editing session.
//!
//! [`EditHistory`] keeps the two [`EditStack`]s the cache store persists.
//!
//! # Invariants
//!
//! 1. A record lives on at most one of the two stacks.
//! 2. The redo stack is cleared whenever a new record is recorded.
//!
//! ```text
//! record(r4)
//! ┌───────────────────────────────┐
//! │ Undo: [r1, r2, r3, r4]        │
//! │ Redo: []                      │
//! └───────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────┐
//! │ Undo: [r1, r2]                │
//! │ Redo: [r4, r3]                │
//! └───────────────────────────────┘
//! ```

use crate::change::{ChangeError, EditRecord};
use crate::stack::{EditStack, StackConfig};

/// Paired undo and redo stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditHistory {
    undo: EditStack,
    redo: EditStack,
}

impl EditHistory {
    /// Create an empty history with the given depth limit on both stacks.
    #[must_use]
    pub fn new(config: StackConfig) -> Self {
        Self {
            undo: EditStack::with_config(config),
            redo: EditStack::with_config(config),
        }
    }

    /// Rebuild a history from persisted stacks.
    #[must_use]
    pub fn from_stacks(undo: EditStack, redo: EditStack) -> Self {
        Self { undo, redo }
    }

    /// Hand the stacks back for persistence.
    #[must_use]
    pub fn into_stacks(self) -> (EditStack, EditStack) {
        (self.undo, self.redo)
    }

    /// Record a freshly applied edit. Starts a new branch.
    pub fn record(&mut self, change: EditRecord) {
        self.redo.clear();
        self.undo.push(change);
    }

    /// Move the newest edit to the redo stack and return it.
    pub fn undo(&mut self) -> Option<&EditRecord> {
        let change = self.undo.pop()?;
        self.redo.push(change);
        self.redo.peek()
    }

    /// Move the most recently undone edit back to the undo stack.
    pub fn redo(&mut self) -> Option<&EditRecord> {
        let change = self.redo.pop()?;
        self.undo.push(change);
        self.undo.peek()
    }

    /// Undo the newest edit against `buffer`.
    ///
    /// On failure the history is left unchanged.
    pub fn undo_in(&mut self, buffer: &mut String) -> Option<Result<(), ChangeError>> {
        let change = self.undo.peek()?;
        if let Err(err) = change.revert(buffer) {
            return Some(Err(err));
        }
        self.undo();
        Some(Ok(()))
    }

    /// Redo the most recently undone edit against `buffer`.
    ///
    /// On failure the history is left unchanged.
    pub fn redo_in(&mut self, buffer: &mut String) -> Option<Result<(), ChangeError>> {
        let change = self.redo.peek()?;
        if let Err(err) = change.apply(buffer) {
            return Some(Err(err));
        }
        self.redo();
        Some(Ok(()))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_stack(&self) -> &EditStack {
        &self.undo
    }

    #[must_use]
    pub fn redo_stack(&self) -> &EditStack {
        &self.redo
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_pushes_and_clears_redo() {
        let mut history = EditHistory::default();
        history.record(EditRecord::insert(0, "a"));
        history.record(EditRecord::insert(1, "b"));
        history.undo();
        assert!(history.can_redo());

        history.record(EditRecord::insert(1, "c"));
        assert!(!history.can_redo());
        assert_eq!(history.undo_stack().len(), 2);
    }

    #[test]
    fn undo_redo_move_records_between_stacks() {
        let mut history = EditHistory::default();
        history.record(EditRecord::insert(0, "a"));
        history.record(EditRecord::insert(1, "b"));

        assert_eq!(history.undo().map(|r| r.new_text.as_str()), Some("b"));
        assert_eq!(history.undo_stack().len(), 1);
        assert_eq!(history.redo_stack().len(), 1);

        assert_eq!(history.redo().map(|r| r.new_text.as_str()), Some("b"));
        assert_eq!(history.undo_stack().len(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn empty_history_returns_none() {
        let mut history = EditHistory::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        let mut buf = String::new();
        assert!(history.undo_in(&mut buf).is_none());
    }

    #[test]
    fn buffer_round_trip_through_undo_and_redo() {
        let mut buf = String::from("fn main() {}");
        let mut history = EditHistory::default();

        let change = EditRecord::new("main", "start", 3);
        change.apply(&mut buf).unwrap();
        history.record(change);
        assert_eq!(buf, "fn start() {}");

        history.undo_in(&mut buf).unwrap().unwrap();
        assert_eq!(buf, "fn main() {}");

        history.redo_in(&mut buf).unwrap().unwrap();
        assert_eq!(buf, "fn start() {}");
    }

    #[test]
    fn failed_undo_keeps_history_intact() {
        let mut buf = String::from("unrelated");
        let mut history = EditHistory::default();
        history.record(EditRecord::new("x", "yy", 0));

        assert!(history.undo_in(&mut buf).unwrap().is_err());
        assert_eq!(history.undo_stack().len(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn stacks_survive_into_and_from() {
        let mut history = EditHistory::new(StackConfig::unlimited());
        history.record(EditRecord::insert(0, "a"));
        history.record(EditRecord::insert(1, "b"));
        history.undo();

        let (undo, redo) = history.clone().into_stacks();
        assert_eq!(EditHistory::from_stacks(undo, redo), history);
    }
}
