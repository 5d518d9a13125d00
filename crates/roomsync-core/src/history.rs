// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounded undo/redo over committed layout snapshots.

use std::collections::VecDeque;

use crate::state::LayoutSnapshot;

/// Linear history with a cursor.
///
/// Invariants:
/// - `entries` is non-empty once [`History::reset`] or [`History::commit`] ran;
///   `cursor` then indexes the current snapshot.
/// - `entries.len() <= capacity`.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<LayoutSnapshot>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Creates an empty history holding at most `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drops everything and starts over from `base`.
    pub fn reset(&mut self, base: LayoutSnapshot) {
        self.entries.clear();
        self.entries.push_back(base);
        self.cursor = 0;
    }

    /// Records a new snapshot, discarding any redo branch and evicting the
    /// oldest snapshot past capacity.
    pub fn commit(&mut self, snapshot: LayoutSnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Steps back, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<&LayoutSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Steps forward, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<&LayoutSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Returns `true` if [`History::undo`] would succeed.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns `true` if [`History::redo`] would succeed.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Current snapshot.
    pub fn current(&self) -> Option<&LayoutSnapshot> {
        self.entries.get(self.cursor)
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
