//! Snapshot-based undo/redo.
//!
//! Every committed mutation appends a full [`DocumentSnapshot`]. A cursor
//! points at the entry that matches the live document; undo and redo move
//! the cursor and hand back the entry to materialize. The list is capped,
//! evicting the oldest entry first.

use std::collections::VecDeque;

use crate::schema::DocumentSnapshot;

/// Default number of retained entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Linear undo/redo history of document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<DocumentSnapshot>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` entries.
    ///
    /// A capacity of 0 is raised to 1 so the current state is always held.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Create a history seeded with the initial document.
    #[must_use]
    pub fn seeded(capacity: usize, initial: DocumentSnapshot) -> Self {
        let mut history = Self::new(capacity);
        history.commit(initial);
        history
    }

    /// Record a new entry.
    ///
    /// Drops every redo entry past the cursor, appends, advances the cursor
    /// and evicts from the front beyond capacity.
    pub fn commit(&mut self, snapshot: DocumentSnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back. Returns the entry to materialize, `None` at the oldest.
    pub fn undo(&mut self) -> Option<&DocumentSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward. Returns the entry to materialize, `None` at the tail.
    pub fn redo(&mut self) -> Option<&DocumentSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Whether undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether redo would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Entry at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&DocumentSnapshot> {
        self.entries.get(self.cursor)
    }

    /// Cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(width: u32) -> DocumentSnapshot {
        DocumentSnapshot {
            width,
            height: 100,
            background_color: "#ffffff".to_string(),
            objects: Vec::new(),
        }
    }

    #[test]
    fn empty_history_cannot_undo_or_redo() {
        let mut history = History::new(10);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn undo_then_redo() {
        let mut history = History::seeded(10, snap(1));
        history.commit(snap(2));
        history.commit(snap(3));

        assert_eq!(history.undo().map(|s| s.width), Some(2));
        assert_eq!(history.undo().map(|s| s.width), Some(1));
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(|s| s.width), Some(2));
        assert_eq!(history.redo().map(|s| s.width), Some(3));
        assert!(history.redo().is_none());
    }

    #[test]
    fn commit_discards_redo_branch() {
        let mut history = History::seeded(10, snap(1));
        history.commit(snap(2));
        history.commit(snap(3));
        history.undo();
        history.undo();

        history.commit(snap(9));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().map(|s| s.width), Some(9));
    }

    #[test]
    fn respects_capacity() {
        let mut history = History::new(50);
        for i in 0..60 {
            history.commit(snap(i));
        }
        assert_eq!(history.len(), 50);

        let mut undos = 0;
        while history.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, 49);
        assert_eq!(history.current().map(|s| s.width), Some(10));
    }
}
