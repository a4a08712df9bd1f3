//! View history.
//!
//! Keeps at most one entry per id, oldest first, with the most recently
//! viewed entity at the tail. Entries live in a slot arena linked as a
//! doubly linked list; an id-to-slot map gives O(1) move-to-end and
//! removal by id.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use crate::model::{Entry, TaskId};

#[derive(Debug, Clone)]
struct Node {
    entry: Entry,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Recently viewed entities, deduplicated by id.
#[derive(Debug, Clone, Default)]
pub struct HistoryTracker {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<TaskId, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    limit: Option<NonZeroUsize>,
}

impl HistoryTracker {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History that drops its oldest entry once `limit` ids are tracked.
    pub fn with_limit(limit: NonZeroUsize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// Append a snapshot at the tail, dropping any earlier entry for the same id.
    pub fn record_access(&mut self, entry: Entry) {
        let id = entry.id();
        if let Some(slot) = self.index.remove(&id) {
            self.unlink(slot);
        } else if let Some(limit) = self.limit {
            if self.index.len() >= limit.get() {
                let oldest = self.head;
                if let Some(evicted) = oldest.and_then(|slot| self.unlink(slot)) {
                    self.index.remove(&evicted.id());
                }
            }
        }
        let slot = self.link_last(entry);
        self.index.insert(id, slot);
    }

    /// Drop the entry for `id`, wherever it sits.
    pub fn remove(&mut self, id: TaskId) -> Option<Entry> {
        let slot = self.index.remove(&id)?;
        self.unlink(slot)
    }

    pub fn remove_all(&mut self, ids: impl IntoIterator<Item = TaskId>) {
        for id in ids {
            self.remove(id);
        }
    }

    /// Entries in visit order, oldest first.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            history: self,
            cursor: self.head,
        }
    }

    fn link_last(&mut self, entry: Entry) -> usize {
        let node = Node {
            entry,
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => {
                if let Some(node) = self.slots[tail].as_mut() {
                    node.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        slot
    }

    /// Detach a live slot from the list and recycle it. The caller keeps the
    /// id index in sync.
    fn unlink(&mut self, slot: usize) -> Option<Entry> {
        let node = self.slots.get_mut(slot)?.take()?;

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.slots[prev].as_mut() {
                    prev_node.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.slots[next].as_mut() {
                    next_node.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.free.push(slot);
        Some(node.entry)
    }
}

/// Iterator over history entries, oldest first.
pub struct Iter<'a> {
    history: &'a HistoryTracker,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.history.slots[self.cursor?].as_ref()?;
        self.cursor = node.next;
        Some(&node.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Status, Task};
    use chrono::Duration;

    fn entry(id: u64) -> Entry {
        Entry::Task(
            Task::new(format!("t{id}"), "", Status::New, Duration::zero(), None)
                .with_id(TaskId::new(id)),
        )
    }

    fn ids(history: &HistoryTracker) -> Vec<u64> {
        history.iter().map(|entry| entry.id().get()).collect()
    }

    #[test]
    fn records_in_visit_order() {
        let mut history = HistoryTracker::new();
        history.record_access(entry(1));
        history.record_access(entry(2));
        history.record_access(entry(3));
        assert_eq!(ids(&history), vec![1, 2, 3]);
    }

    #[test]
    fn revisit_moves_to_tail_without_duplicates() {
        let mut history = HistoryTracker::new();
        history.record_access(entry(1));
        history.record_access(entry(2));
        history.record_access(entry(1));
        assert_eq!(ids(&history), vec![2, 1]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn revisit_keeps_latest_snapshot() {
        let mut history = HistoryTracker::new();
        history.record_access(entry(1));
        let renamed = Entry::Task(
            Task::new("renamed", "", Status::Done, Duration::zero(), None).with_id(TaskId::new(1)),
        );
        history.record_access(renamed);
        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name(), "renamed");
    }

    #[test]
    fn remove_from_head_middle_and_tail() {
        let mut history = HistoryTracker::new();
        for id in 1..=5 {
            history.record_access(entry(id));
        }
        history.remove(TaskId::new(1));
        assert_eq!(ids(&history), vec![2, 3, 4, 5]);
        history.remove(TaskId::new(3));
        assert_eq!(ids(&history), vec![2, 4, 5]);
        history.remove(TaskId::new(5));
        assert_eq!(ids(&history), vec![2, 4]);
        assert!(history.remove(TaskId::new(9)).is_none());

        history.record_access(entry(6));
        assert_eq!(ids(&history), vec![2, 4, 6]);
    }

    #[test]
    fn removing_last_entry_empties_history() {
        let mut history = HistoryTracker::new();
        history.record_access(entry(1));
        history.remove(TaskId::new(1));
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());

        history.record_access(entry(2));
        assert_eq!(ids(&history), vec![2]);
    }

    #[test]
    fn remove_all_drops_every_listed_id() {
        let mut history = HistoryTracker::new();
        for id in 1..=4 {
            history.record_access(entry(id));
        }
        history.remove_all([TaskId::new(2), TaskId::new(4), TaskId::new(8)]);
        assert_eq!(ids(&history), vec![1, 3]);
    }

    #[test]
    fn slots_are_reused() {
        let mut history = HistoryTracker::new();
        for round in 0..100 {
            history.record_access(entry(round % 3));
        }
        assert_eq!(history.len(), 3);
        assert!(history.slots.len() <= 4);
    }

    #[test]
    fn limit_evicts_oldest() {
        let limit = NonZeroUsize::new(2).expect("non-zero");
        let mut history = HistoryTracker::with_limit(limit);
        history.record_access(entry(1));
        history.record_access(entry(2));
        history.record_access(entry(1));
        history.record_access(entry(3));
        assert_eq!(ids(&history), vec![1, 3]);
        assert!(!history.contains(TaskId::new(2)));
    }
}
