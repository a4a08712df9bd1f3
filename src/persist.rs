//! File-backed store.
//!
//! Wraps [`TaskStore`] and writes the whole state back to the data file
//! after every mutation. Reads never touch the disk. The file is written
//! atomically under a `<file>.lock` advisory lock, so concurrent CLI
//! invocations never observe a half-written file.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec;
use crate::error::Result;
use crate::history::HistoryTracker;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{Entry, Epic, Subtask, Task, TaskId};
use crate::store::TaskStore;

/// Knobs for opening a data file.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub lock_timeout_ms: u64,
    /// Cap on remembered views; `None` keeps every distinct entity.
    pub history_limit: Option<NonZeroUsize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            history_limit: None,
        }
    }
}

#[derive(Debug)]
pub struct FileBackedStore {
    store: TaskStore,
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileBackedStore {
    /// Load `path`, or start empty if it does not exist yet. The file is not
    /// created until the first mutation.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let history = match options.history_limit {
            Some(limit) => HistoryTracker::with_limit(limit),
            None => HistoryTracker::new(),
        };

        let store = match lock::read_locked_str(&path, options.lock_timeout_ms)? {
            Some(text) => {
                let store = codec::decode(&text, history)?;
                debug!(path = %path.display(), entities = store.len(), "data file loaded");
                store
            }
            None => {
                debug!(path = %path.display(), "no data file, starting empty");
                TaskStore::with_history(history)
            }
        };

        Ok(Self {
            store,
            path,
            lock_timeout_ms: options.lock_timeout_ms,
        })
    }

    /// Read-only view of the in-memory state.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Write the current state to disk.
    pub fn save(&self) -> Result<()> {
        let text = codec::encode(&self.store);
        lock::write_atomic_locked(&self.path, text.as_bytes(), self.lock_timeout_ms)?;
        debug!(
            path = %self.path.display(),
            entities = self.store.len(),
            "data file saved"
        );
        Ok(())
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn list_tasks(&self) -> Vec<Task> {
        self.store.list_tasks()
    }

    pub fn create_task(&mut self, task: Task) -> Result<TaskId> {
        codec::check_fields(task.name(), task.description())?;
        let id = self.store.create_task(task)?;
        self.save()?;
        Ok(id)
    }

    pub fn get_task(&mut self, id: TaskId) -> Option<Task> {
        self.store.get_task(id)
    }

    pub fn update_task(&mut self, task: Task) -> Result<()> {
        codec::check_fields(task.name(), task.description())?;
        self.store.update_task(task)?;
        self.save()
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.store.delete_task(id);
        self.save()
    }

    pub fn delete_all_tasks(&mut self) -> Result<()> {
        self.store.delete_all_tasks();
        self.save()
    }

    // =========================================================================
    // Subtasks
    // =========================================================================

    pub fn list_subtasks(&self) -> Vec<Subtask> {
        self.store.list_subtasks()
    }

    /// `Ok(None)` when the epic does not exist; the file is left alone then.
    pub fn create_subtask(&mut self, subtask: Subtask) -> Result<Option<TaskId>> {
        codec::check_fields(subtask.name(), subtask.description())?;
        let id = self.store.create_subtask(subtask)?;
        if id.is_some() {
            self.save()?;
        }
        Ok(id)
    }

    pub fn get_subtask(&mut self, id: TaskId) -> Option<Subtask> {
        self.store.get_subtask(id)
    }

    pub fn update_subtask(&mut self, subtask: Subtask) -> Result<()> {
        codec::check_fields(subtask.name(), subtask.description())?;
        self.store.update_subtask(subtask)?;
        self.save()
    }

    pub fn delete_subtask(&mut self, id: TaskId) -> Result<()> {
        self.store.delete_subtask(id);
        self.save()
    }

    pub fn delete_all_subtasks(&mut self) -> Result<()> {
        self.store.delete_all_subtasks();
        self.save()
    }

    // =========================================================================
    // Epics
    // =========================================================================

    pub fn list_epics(&self) -> Vec<Epic> {
        self.store.list_epics()
    }

    pub fn create_epic(&mut self, epic: Epic) -> Result<TaskId> {
        codec::check_fields(epic.name(), epic.description())?;
        let id = self.store.create_epic(epic);
        self.save()?;
        Ok(id)
    }

    pub fn get_epic(&mut self, id: TaskId) -> Option<Epic> {
        self.store.get_epic(id)
    }

    pub fn update_epic(&mut self, epic: Epic) -> Result<()> {
        codec::check_fields(epic.name(), epic.description())?;
        self.store.update_epic(epic);
        self.save()
    }

    pub fn delete_epic(&mut self, id: TaskId) -> Result<()> {
        self.store.delete_epic(id);
        self.save()
    }

    pub fn delete_all_epics(&mut self) -> Result<()> {
        self.store.delete_all_epics();
        self.save()
    }

    pub fn epic_subtasks(&self, epic_id: TaskId) -> Option<Vec<Subtask>> {
        self.store.epic_subtasks(epic_id)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn history(&self) -> Vec<Entry> {
        self.store.history()
    }

    pub fn prioritized(&self) -> Vec<Entry> {
        self.store.prioritized()
    }
}
