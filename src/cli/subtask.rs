//! tracker subtask command implementation

use crate::cli::{
    describe, ClearedReport, EntryView, NewWork, RemovedReport, Session, WorkChanges,
};
use crate::error::{Error, Result};
use crate::model::{Entry, Kind, Subtask, TaskId};
use crate::output::{emit_success, HumanOutput};

fn not_found(id: TaskId) -> Error {
    Error::NotFound {
        kind: Kind::Subtask,
        id,
    }
}

pub fn run_add(session: &Session, epic_id: TaskId, work: NewWork) -> Result<()> {
    let (mut store, config) = session.open()?;
    let duration = work.duration(&config)?;
    let id = store
        .create_subtask(Subtask::new(
            epic_id,
            work.name,
            work.description,
            work.status,
            duration,
            work.start,
        ))?
        .ok_or(Error::NotFound {
            kind: Kind::Epic,
            id: epic_id,
        })?;
    let subtask = store.get_subtask(id).ok_or_else(|| not_found(id))?;

    let entry = Entry::Subtask(subtask);
    let mut human = describe(format!("Subtask {id} created"), &entry);
    human.push_next_step(format!("tracker epic show {}", epic_id.get()));
    emit_success(session.output(), "subtask add", &EntryView::from(&entry), Some(&human))
}

pub fn run_show(session: &Session, id: TaskId) -> Result<()> {
    let (mut store, _) = session.open()?;
    let subtask = store.get_subtask(id).ok_or_else(|| not_found(id))?;

    let entry = Entry::Subtask(subtask);
    let human = describe(format!("Subtask {id}"), &entry);
    emit_success(session.output(), "subtask show", &EntryView::from(&entry), Some(&human))
}

pub fn run_update(
    session: &Session,
    id: TaskId,
    epic: Option<TaskId>,
    changes: WorkChanges,
) -> Result<()> {
    let (mut store, _) = session.open()?;
    let current = store.get_subtask(id).ok_or_else(|| not_found(id))?;

    let (start, duration) = changes.schedule(current.start_time(), current.duration());
    let mut updated = current.with_schedule(start, duration);
    if let Some(epic_id) = epic {
        if store.epic_subtasks(epic_id).is_none() {
            return Err(Error::NotFound {
                kind: Kind::Epic,
                id: epic_id,
            });
        }
        updated = updated.with_epic(epic_id);
    }
    if let Some(name) = changes.name {
        updated = updated.with_name(name);
    }
    if let Some(description) = changes.description {
        updated = updated.with_description(description);
    }
    if let Some(status) = changes.status {
        updated = updated.with_status(status);
    }
    store.update_subtask(updated.clone())?;

    let entry = Entry::Subtask(updated);
    let human = describe(format!("Subtask {id} updated"), &entry);
    emit_success(session.output(), "subtask update", &EntryView::from(&entry), Some(&human))
}

pub fn run_rm(session: &Session, id: TaskId) -> Result<()> {
    let (mut store, _) = session.open()?;
    let subtask = store.get_subtask(id).ok_or_else(|| not_found(id))?;
    store.delete_subtask(id)?;

    let mut human = HumanOutput::new(format!("Subtask {id} deleted"));
    human.push_next_step(format!("tracker epic show {}", subtask.epic_id().get()));
    emit_success(session.output(), "subtask rm", &RemovedReport::new(id), Some(&human))
}

pub fn run_clear(session: &Session) -> Result<()> {
    let (mut store, _) = session.open()?;
    let removed = store.list_subtasks().len();
    store.delete_all_subtasks()?;

    let human = HumanOutput::new(format!("Deleted {removed} subtask(s)"));
    emit_success(session.output(), "subtask clear", &ClearedReport { removed }, Some(&human))
}
