//! Prioritized index of scheduled tasks and subtasks.
//!
//! Entries are ordered by start time; equal start times keep insertion
//! order. Only entries with a scheduling window are indexed, so epics and
//! unscheduled tasks never show up here and never take part in overlap
//! checks.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use crate::model::{Entry, TaskId, Window};

type Key = (NaiveDateTime, u64);

#[derive(Debug, Clone, Default)]
pub struct PrioritizedIndex {
    order: BTreeMap<Key, Entry>,
    keys: HashMap<TaskId, Key>,
    seq: u64,
}

impl PrioritizedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Insert or reposition an entry. Returns false (and drops any previous
    /// position for the id) when the entry has no window.
    pub fn insert(&mut self, entry: Entry) -> bool {
        let id = entry.id();
        self.remove(id);

        let Some(window) = entry.window() else {
            return false;
        };
        let key = (window.start, self.seq);
        self.seq += 1;
        self.order.insert(key, entry);
        self.keys.insert(id, key);
        true
    }

    pub fn remove(&mut self, id: TaskId) -> Option<Entry> {
        let key = self.keys.remove(&id)?;
        self.order.remove(&key)
    }

    pub fn remove_all(&mut self, ids: impl IntoIterator<Item = TaskId>) {
        for id in ids {
            self.remove(id);
        }
    }

    /// Entries ordered by start time.
    pub fn all(&self) -> Vec<Entry> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.order.values()
    }

    /// First indexed entry, other than `exempt`, whose window intersects `window`.
    ///
    /// Only entries starting before `window.end` can intersect, so the scan
    /// stops there.
    pub fn find_conflict(&self, window: &Window, exempt: Option<TaskId>) -> Option<&Entry> {
        self.order
            .range(..(window.end, 0))
            .map(|(_, entry)| entry)
            .filter(|entry| Some(entry.id()) != exempt)
            .find(|entry| {
                entry
                    .window()
                    .is_some_and(|existing| window.overlaps(&existing))
            })
    }

    /// Whether `candidate` would overlap anything already indexed. A
    /// candidate never conflicts with its own id.
    pub fn has_conflict(&self, candidate: &Entry) -> bool {
        candidate
            .window()
            .is_some_and(|window| self.find_conflict(&window, Some(candidate.id())).is_some())
    }
}
