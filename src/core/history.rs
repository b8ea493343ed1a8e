//! Bounded, branch-truncating snapshot history.
//!
//! The history is a timeline of snapshots with a cursor. Recording a new
//! snapshot discards everything after the cursor, so entries reachable only
//! through redo are lost once a new branch starts.

use super::value::Snapshot;
use std::collections::VecDeque;
use thiserror::Error;

/// Default number of entries a history keeps.
pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 10;

/// Errors raised when rebuilding a history from stored parts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistoryError {
    #[error("history has no entries")]
    Empty,

    #[error("history holds {len} entries but the maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("history index {index} is out of bounds for {len} entries")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Timeline of snapshots supporting undo and redo.
///
/// Invariants: the history is never empty, `index() < len()`, and
/// `len() <= max_len()`.
///
/// Capacity policy: when a push takes the length past the maximum, the oldest
/// entry is dropped and the cursor is left where it was. Below capacity the
/// cursor advances onto the new entry. Both cases leave the cursor on the
/// newest entry when pushing from the end of the timeline.
///
/// # Example
///
/// ```rust
/// use recall::{History, Snapshot};
/// use serde_json::json;
///
/// let snap = |n: i64| Snapshot::try_from(json!({"n": n})).unwrap();
///
/// let mut history = History::new(snap(0), 3);
/// history.push(snap(1));
/// history.push(snap(2));
/// history.push(snap(3));
///
/// assert_eq!(history.len(), 3);
/// assert_eq!(history.first(), &snap(1));
///
/// let previous = history.undo().cloned();
/// assert_eq!(previous, Some(snap(2)));
/// ```
#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<Snapshot>,
    index: usize,
    max_len: usize,
}

impl History {
    /// Start a timeline at `initial`. A `max_len` of zero is treated as one.
    pub fn new(initial: Snapshot, max_len: usize) -> Self {
        let mut entries = VecDeque::with_capacity(max_len.clamp(1, 64));
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            max_len: max_len.max(1),
        }
    }

    /// Rebuild a timeline from stored entries and cursor.
    pub fn from_parts(
        entries: Vec<Snapshot>,
        index: usize,
        max_len: usize,
    ) -> Result<Self, HistoryError> {
        let max_len = max_len.max(1);
        if entries.is_empty() {
            return Err(HistoryError::Empty);
        }
        if entries.len() > max_len {
            return Err(HistoryError::TooLong {
                len: entries.len(),
                max: max_len,
            });
        }
        if index >= entries.len() {
            return Err(HistoryError::IndexOutOfBounds {
                index,
                len: entries.len(),
            });
        }
        Ok(Self {
            entries: entries.into(),
            index,
            max_len,
        })
    }

    /// Record `snapshot` after the cursor, truncating any redo branch.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);

        if self.entries.len() > self.max_len {
            self.entries.pop_front();
        } else {
            self.index += 1;
        }
    }

    /// Step the cursor back, returning the entry it now points at.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step the cursor forward, returning the entry it now points at.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index]
    }

    /// The oldest retained entry.
    pub fn first(&self) -> &Snapshot {
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(n: i64) -> Snapshot {
        Snapshot::try_from(json!({ "n": n })).unwrap()
    }

    fn values(history: &History) -> Vec<i64> {
        history
            .entries()
            .map(|s| s.get("n").and_then(|v| v.as_i64()).unwrap())
            .collect()
    }

    #[test]
    fn new_history_holds_initial_entry() {
        let history = History::new(snap(0), 10);
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_empty());
    }

    #[test]
    fn push_advances_cursor_below_capacity() {
        let mut history = History::new(snap(0), 10);
        history.push(snap(1));
        history.push(snap(2));

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current(), &snap(2));
    }

    #[test]
    fn push_over_capacity_evicts_oldest_and_keeps_cursor() {
        let mut history = History::new(snap(0), 3);
        history.push(snap(1));
        history.push(snap(2));
        assert_eq!(history.index(), 2);

        history.push(snap(3));
        assert_eq!(values(&history), vec![1, 2, 3]);
        assert_eq!(history.index(), 2);
        assert_eq!(history.current(), &snap(3));

        history.push(snap(4));
        assert_eq!(values(&history), vec![2, 3, 4]);
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn push_truncates_redo_branch() {
        let mut history = History::new(snap(0), 10);
        history.push(snap(1));
        history.push(snap(2));
        history.undo();

        history.push(snap(3));

        assert_eq!(values(&history), vec![0, 1, 3]);
        assert!(history.redo().is_none());
    }

    #[test]
    fn undo_and_redo_move_within_bounds() {
        let mut history = History::new(snap(0), 10);
        history.push(snap(1));

        assert_eq!(history.undo(), Some(&snap(0)));
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);

        assert_eq!(history.redo(), Some(&snap(1)));
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn push_after_undo_at_capacity_reuses_freed_slots() {
        let mut history = History::new(snap(0), 3);
        history.push(snap(1));
        history.push(snap(2));
        history.undo();
        history.undo();

        history.push(snap(9));
        assert_eq!(values(&history), vec![0, 9]);
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn single_entry_capacity_keeps_latest_only() {
        let mut history = History::new(snap(0), 1);
        history.push(snap(1));
        assert_eq!(values(&history), vec![1]);
        assert_eq!(history.index(), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn zero_capacity_is_treated_as_one() {
        let history = History::new(snap(0), 0);
        assert_eq!(history.max_len(), 1);
    }

    #[test]
    fn from_parts_validates_invariants() {
        assert_eq!(
            History::from_parts(vec![], 0, 5).unwrap_err(),
            HistoryError::Empty
        );
        assert_eq!(
            History::from_parts(vec![snap(0), snap(1)], 2, 5).unwrap_err(),
            HistoryError::IndexOutOfBounds { index: 2, len: 2 }
        );
        assert_eq!(
            History::from_parts(vec![snap(0), snap(1)], 0, 1).unwrap_err(),
            HistoryError::TooLong { len: 2, max: 1 }
        );

        let history = History::from_parts(vec![snap(0), snap(1)], 0, 5).unwrap();
        assert!(history.can_redo());
        assert_eq!(history.current(), &snap(0));
    }
}
