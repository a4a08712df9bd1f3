//! Identifier allocation.
//!
//! One allocator backs tasks, subtasks and epics, so ids are unique across
//! all three kinds. Each store owns its own allocator.

use crate::model::TaskId;

/// Monotonic id counter starting at 1.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue a fresh id, strictly greater than every id issued or observed so far.
    pub fn next(&mut self) -> TaskId {
        let id = TaskId::new(self.next);
        self.next += 1;
        id
    }

    /// Fast-forward past an id that was loaded rather than minted.
    pub fn observe(&mut self, id: TaskId) {
        if id.get() >= self.next {
            self.next = id.get().saturating_add(1);
        }
    }

    /// The id the next call to [`IdAllocator::next`] will return.
    pub fn peek(&self) -> TaskId {
        TaskId::new(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
