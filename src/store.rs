//! In-memory task store.
//!
//! Owns the three id-keyed collections (tasks, subtasks, epics) together
//! with the id allocator, the view history and the prioritized index, and
//! keeps them consistent:
//!
//! - every subtask's epic exists; deleting an epic deletes its subtasks
//! - an epic's status and time span are re-derived after any subtask change
//! - no two scheduled tasks/subtasks have overlapping windows
//! - deleted ids disappear from history and the prioritized index
//!
//! Lookups of missing ids return `None` and updates/deletes of missing ids
//! are no-ops. Only invalid input is an error, and a failed call leaves the
//! store untouched.
//!
//! Values handed out by the getters and recorded in history are copies, so
//! later updates never change them.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::error::{Error, Result};
use crate::history::HistoryTracker;
use crate::ids::IdAllocator;
use crate::model::{self, Entry, Epic, Subtask, Task, TaskId, Window};
use crate::rollup;
use crate::schedule::PrioritizedIndex;

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    ids: IdAllocator,
    tasks: BTreeMap<TaskId, Task>,
    subtasks: BTreeMap<TaskId, Subtask>,
    epics: BTreeMap<TaskId, Epic>,
    history: HistoryTracker,
    prioritized: PrioritizedIndex,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: HistoryTracker) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Total number of stored tasks, subtasks and epics.
    pub fn len(&self) -> usize {
        self.tasks.len() + self.subtasks.len() + self.epics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn list_tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    pub fn create_task(&mut self, task: Task) -> Result<TaskId> {
        validate_schedule(task.start_time(), task.duration())?;
        self.check_schedule(task.window(), None)?;

        let id = self.ids.next();
        let task = task.with_id(id);
        self.prioritized.insert(Entry::Task(task.clone()));
        self.tasks.insert(id, task);

        debug!(%id, "task created");
        Ok(id)
    }

    pub fn get_task(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.get(&id)?.clone();
        self.history.record_access(Entry::Task(task.clone()));
        Some(task)
    }

    pub fn update_task(&mut self, task: Task) -> Result<()> {
        validate_schedule(task.start_time(), task.duration())?;
        self.check_schedule(task.window(), Some(task.id()))?;

        let id = task.id();
        if !self.tasks.contains_key(&id) {
            debug!(%id, "task update ignored, no such task");
            return Ok(());
        }
        self.prioritized.insert(Entry::Task(task.clone()));
        self.tasks.insert(id, task);

        debug!(%id, "task updated");
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) {
        if self.tasks.remove(&id).is_some() {
            self.prioritized.remove(id);
            self.history.remove(id);
            debug!(%id, "task deleted");
        }
    }

    pub fn delete_all_tasks(&mut self) {
        let ids: Vec<TaskId> = self.tasks.keys().copied().collect();
        self.prioritized.remove_all(ids.iter().copied());
        self.history.remove_all(ids.iter().copied());
        self.tasks.clear();
        debug!(count = ids.len(), "all tasks deleted");
    }

    // =========================================================================
    // Subtasks
    // =========================================================================

    pub fn list_subtasks(&self) -> Vec<Subtask> {
        self.subtasks.values().cloned().collect()
    }

    /// Create a subtask under its epic. Returns `Ok(None)` when the epic does
    /// not exist; nothing is stored in that case.
    pub fn create_subtask(&mut self, subtask: Subtask) -> Result<Option<TaskId>> {
        validate_schedule(subtask.start_time(), subtask.duration())?;
        self.check_schedule(subtask.window(), None)?;

        let epic_id = subtask.epic_id();
        let Some(epic) = self.epics.get(&epic_id).cloned() else {
            debug!(%epic_id, "subtask not created, no such epic");
            return Ok(None);
        };

        let id = self.ids.next();
        let subtask = subtask.with_id(id);
        self.prioritized.insert(Entry::Subtask(subtask.clone()));
        self.subtasks.insert(id, subtask);
        self.epics.insert(epic_id, epic.with_subtask(id));
        self.refresh_epic(epic_id);

        debug!(%id, %epic_id, "subtask created");
        Ok(Some(id))
    }

    pub fn get_subtask(&mut self, id: TaskId) -> Option<Subtask> {
        let subtask = self.subtasks.get(&id)?.clone();
        self.history.record_access(Entry::Subtask(subtask.clone()));
        Some(subtask)
    }

    /// Replace a subtask. A changed epic id moves the subtask to that epic,
    /// unless the epic does not exist, in which case nothing happens.
    pub fn update_subtask(&mut self, subtask: Subtask) -> Result<()> {
        validate_schedule(subtask.start_time(), subtask.duration())?;
        self.check_schedule(subtask.window(), Some(subtask.id()))?;

        let id = subtask.id();
        let Some(previous_epic) = self.subtasks.get(&id).map(Subtask::epic_id) else {
            debug!(%id, "subtask update ignored, no such subtask");
            return Ok(());
        };
        let epic_id = subtask.epic_id();
        if !self.epics.contains_key(&epic_id) {
            debug!(%id, %epic_id, "subtask update ignored, no such epic");
            return Ok(());
        }

        self.prioritized.insert(Entry::Subtask(subtask.clone()));
        self.subtasks.insert(id, subtask);

        if previous_epic != epic_id {
            self.relink(previous_epic, |epic| epic.without_subtask(id));
            self.relink(epic_id, |epic| epic.with_subtask(id));
            self.refresh_epic(previous_epic);
        }
        self.refresh_epic(epic_id);

        debug!(%id, %epic_id, "subtask updated");
        Ok(())
    }

    pub fn delete_subtask(&mut self, id: TaskId) {
        let Some(subtask) = self.subtasks.remove(&id) else {
            return;
        };
        self.prioritized.remove(id);
        self.history.remove(id);

        let epic_id = subtask.epic_id();
        self.relink(epic_id, |epic| epic.without_subtask(id));
        self.refresh_epic(epic_id);

        debug!(%id, %epic_id, "subtask deleted");
    }

    /// Remove every subtask; every epic falls back to NEW with no time span.
    pub fn delete_all_subtasks(&mut self) {
        let epic_ids: Vec<TaskId> = self.epics.keys().copied().collect();
        for epic_id in &epic_ids {
            self.relink(*epic_id, Epic::without_subtasks);
        }

        let ids: Vec<TaskId> = self.subtasks.keys().copied().collect();
        self.prioritized.remove_all(ids.iter().copied());
        self.history.remove_all(ids.iter().copied());
        self.subtasks.clear();

        for epic_id in epic_ids {
            self.refresh_epic(epic_id);
        }
        debug!(count = ids.len(), "all subtasks deleted");
    }

    // =========================================================================
    // Epics
    // =========================================================================

    pub fn list_epics(&self) -> Vec<Epic> {
        self.epics.values().cloned().collect()
    }

    /// Store a new, empty epic. Only its name and description are taken from
    /// `epic`; status and time span start out derived from no subtasks.
    pub fn create_epic(&mut self, epic: Epic) -> TaskId {
        let id = self.ids.next();
        let epic = Epic::new(epic.name(), epic.description()).with_id(id);
        self.epics.insert(id, epic);
        debug!(%id, "epic created");
        id
    }

    pub fn get_epic(&mut self, id: TaskId) -> Option<Epic> {
        let epic = self.epics.get(&id)?.clone();
        self.history.record_access(Entry::Epic(epic.clone()));
        Some(epic)
    }

    /// Rename or redescribe an epic. Its subtasks and derived fields stay as
    /// they are.
    pub fn update_epic(&mut self, epic: Epic) {
        let id = epic.id();
        let renamed = self.epics.get(&id).map(|stored| {
            stored
                .clone()
                .with_name(epic.name())
                .with_description(epic.description())
        });
        match renamed {
            Some(renamed) => {
                self.epics.insert(id, renamed);
                self.refresh_epic(id);
                debug!(%id, "epic updated");
            }
            None => debug!(%id, "epic update ignored, no such epic"),
        }
    }

    /// Delete an epic together with all of its subtasks.
    pub fn delete_epic(&mut self, id: TaskId) {
        let Some(epic) = self.epics.remove(&id) else {
            return;
        };
        for subtask_id in epic.subtask_ids() {
            self.subtasks.remove(subtask_id);
            self.prioritized.remove(*subtask_id);
            self.history.remove(*subtask_id);
        }
        self.history.remove(id);
        debug!(%id, subtasks = epic.subtask_ids().len(), "epic deleted");
    }

    pub fn delete_all_epics(&mut self) {
        let subtask_ids: Vec<TaskId> = self.subtasks.keys().copied().collect();
        let epic_ids: Vec<TaskId> = self.epics.keys().copied().collect();
        self.prioritized.remove_all(subtask_ids.iter().copied());
        self.history.remove_all(subtask_ids.iter().copied());
        self.history.remove_all(epic_ids.iter().copied());
        self.subtasks.clear();
        self.epics.clear();
        debug!(
            epics = epic_ids.len(),
            subtasks = subtask_ids.len(),
            "all epics deleted"
        );
    }

    /// Subtasks of an epic in link order, or `None` if the epic does not exist.
    pub fn epic_subtasks(&self, epic_id: TaskId) -> Option<Vec<Subtask>> {
        let epic = self.epics.get(&epic_id)?;
        Some(
            epic.subtask_ids()
                .iter()
                .filter_map(|id| self.subtasks.get(id).cloned())
                .collect(),
        )
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Viewed entities, oldest first.
    pub fn history(&self) -> Vec<Entry> {
        self.history.snapshot()
    }

    /// Scheduled tasks and subtasks ordered by start time.
    pub fn prioritized(&self) -> Vec<Entry> {
        self.prioritized.all()
    }

    pub fn has_schedule(&self) -> bool {
        !self.prioritized.is_empty()
    }

    /// Id the next created entity will receive.
    pub fn next_id(&self) -> TaskId {
        self.ids.peek()
    }

    // =========================================================================
    // Restoring stored entities
    // =========================================================================

    /// Install an entity that already carries an id (loaded from storage).
    ///
    /// Overlap is not re-checked. Epics must be restored before their
    /// subtasks. Fails on unassigned or duplicate ids and on subtasks whose
    /// epic is missing.
    pub fn restore(&mut self, entry: Entry) -> Result<()> {
        let id = entry.id();
        if !id.is_assigned() {
            return Err(Error::Validation(format!(
                "{} has no id assigned",
                entry.kind()
            )));
        }
        if self.contains(id) {
            return Err(Error::Validation(format!("duplicate id {id}")));
        }

        match entry {
            Entry::Task(task) => {
                validate_schedule(task.start_time(), task.duration())?;
                self.prioritized.insert(Entry::Task(task.clone()));
                self.tasks.insert(id, task);
            }
            Entry::Epic(epic) => {
                let epic = Epic::new(epic.name(), epic.description()).with_id(id);
                self.epics.insert(id, epic);
            }
            Entry::Subtask(subtask) => {
                validate_schedule(subtask.start_time(), subtask.duration())?;
                let epic_id = subtask.epic_id();
                if !self.epics.contains_key(&epic_id) {
                    return Err(Error::Validation(format!(
                        "subtask {id} refers to missing epic {epic_id}"
                    )));
                }
                self.prioritized.insert(Entry::Subtask(subtask.clone()));
                self.subtasks.insert(id, subtask);
                self.relink(epic_id, |epic| epic.with_subtask(id));
                self.refresh_epic(epic_id);
            }
        }

        self.ids.observe(id);
        Ok(())
    }

    fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
            || self.subtasks.contains_key(&id)
            || self.epics.contains_key(&id)
    }

    /// Reject a window that overlaps any other scheduled entity.
    fn check_schedule(&self, window: Option<Window>, exempt: Option<TaskId>) -> Result<()> {
        let Some(window) = window else {
            return Ok(());
        };
        match self.prioritized.find_conflict(&window, exempt) {
            Some(conflicting) => Err(Error::Overlap {
                conflicting: conflicting.id(),
            }),
            None => Ok(()),
        }
    }

    /// Replace a stored epic with an edited copy of its subtask links.
    fn relink(&mut self, epic_id: TaskId, edit: impl FnOnce(Epic) -> Epic) {
        if let Some(epic) = self.epics.remove(&epic_id) {
            self.epics.insert(epic_id, edit(epic));
        }
    }

    /// Re-derive an epic's status and time span from its current subtasks.
    fn refresh_epic(&mut self, epic_id: TaskId) {
        let Some(epic) = self.epics.get(&epic_id) else {
            return;
        };
        let derived = rollup::rollup(
            epic.subtask_ids()
                .iter()
                .filter_map(|id| self.subtasks.get(id)),
        );
        let refreshed = epic.clone().with_derived(
            derived.status,
            derived.start_time,
            derived.end_time,
            derived.duration,
        );
        self.epics.insert(epic_id, refreshed);
    }
}

fn validate_schedule(start_time: Option<NaiveDateTime>, duration: Duration) -> Result<()> {
    if duration < Duration::zero() {
        return Err(Error::Validation(format!(
            "duration must not be negative, got {} minutes",
            duration.num_minutes()
        )));
    }
    if let Some(start) = start_time {
        if model::end_of(start, duration).is_none() {
            return Err(Error::Validation(format!(
                "slot starting {} for {} minutes ends past the supported date range",
                model::format_datetime(start),
                duration.num_minutes()
            )));
        }
    }
    Ok(())
}
