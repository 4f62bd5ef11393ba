//! # History
//!
//! A linear undo stack of whole-state snapshots. The present state is always the snapshot
//! under the cursor, so there's no separate "current" copy to drift out of sync.
//!
//! Writing after an undo discards the redo tail, and once the stack holds `capacity`
//! snapshots the oldest is forgotten.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

pub mod writer;

pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

#[derive(Clone, Debug)]
pub struct History<T> {
    snapshots: VecDeque<T>,
    /// Index into `snapshots` of the present. Always in bounds.
    cursor: usize,
    capacity: NonZeroUsize,
}
impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default(), DEFAULT_CAPACITY)
    }
}
impl<T> History<T> {
    /// Start a history whose only entry, and present, is `initial`.
    #[must_use]
    pub fn new(initial: T, capacity: NonZeroUsize) -> Self {
        let mut snapshots = VecDeque::with_capacity(capacity.get());
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity,
        }
    }
    #[must_use]
    pub fn present(&self) -> &T {
        // Cursor is always in bounds, and there is always at least one snapshot.
        &self.snapshots[self.cursor]
    }
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
    /// Number of snapshots held, including the present and any redo tail.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
    /// Never true, a history always has a present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }
    /// Make `snapshot` the new present, discarding anything that was undone.
    pub fn commit(&mut self, snapshot: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity.get() {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        log::debug!(
            "committed snapshot {}/{}",
            self.cursor + 1,
            self.capacity
        );
    }
    /// Step back one snapshot, returning the restored present. None if already at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::trace!("undo to {}", self.cursor);
        Some(self.present())
    }
    /// Step forward one snapshot, returning the restored present. None if nothing was undone.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::trace!("redo to {}", self.cursor);
        Some(self.present())
    }
    /// Forget every other snapshot, keeping just the present.
    pub fn clear(&mut self) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.drain(..self.cursor);
        self.cursor = 0;
    }
    /// Every snapshot, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.snapshots.iter()
    }
}
impl<T: Clone + PartialEq> History<T> {
    /// Edit a copy of the present during the span of the closure. Once it returns, the copy is
    /// committed as a single new snapshot if it differs from the present.
    pub fn write_with<F, R>(&mut self, write: F) -> R
    where
        F: FnOnce(&mut writer::HistoryWriter<'_, T>) -> R,
    {
        let mut writer = writer::HistoryWriter::new(self);
        write(&mut writer)
        // Writer commits on drop.
    }
}
