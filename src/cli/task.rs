//! tracker task command implementation

use crate::cli::{
    describe, ClearedReport, EntryView, NewWork, RemovedReport, Session, WorkChanges,
};
use crate::error::{Error, Result};
use crate::model::{Entry, Kind, Task, TaskId};
use crate::output::{emit_success, HumanOutput};

pub fn run_add(session: &Session, work: NewWork) -> Result<()> {
    let (mut store, config) = session.open()?;
    let duration = work.duration(&config)?;
    let id = store.create_task(Task::new(
        work.name,
        work.description,
        work.status,
        duration,
        work.start,
    ))?;
    let task = store.get_task(id).ok_or(Error::NotFound { kind: Kind::Task, id })?;

    let entry = Entry::Task(task);
    let mut human = describe(format!("Task {id} created"), &entry);
    human.push_next_step(format!("tracker task show {}", id.get()));
    emit_success(session.output(), "task add", &EntryView::from(&entry), Some(&human))
}

pub fn run_show(session: &Session, id: TaskId) -> Result<()> {
    let (mut store, _) = session.open()?;
    let task = store.get_task(id).ok_or(Error::NotFound { kind: Kind::Task, id })?;

    let entry = Entry::Task(task);
    let human = describe(format!("Task {id}"), &entry);
    emit_success(session.output(), "task show", &EntryView::from(&entry), Some(&human))
}

pub fn run_update(session: &Session, id: TaskId, changes: WorkChanges) -> Result<()> {
    let (mut store, _) = session.open()?;
    let current = store.get_task(id).ok_or(Error::NotFound { kind: Kind::Task, id })?;

    let (start, duration) = changes.schedule(current.start_time(), current.duration());
    let mut updated = current.with_schedule(start, duration);
    if let Some(name) = changes.name {
        updated = updated.with_name(name);
    }
    if let Some(description) = changes.description {
        updated = updated.with_description(description);
    }
    if let Some(status) = changes.status {
        updated = updated.with_status(status);
    }
    store.update_task(updated.clone())?;

    let entry = Entry::Task(updated);
    let human = describe(format!("Task {id} updated"), &entry);
    emit_success(session.output(), "task update", &EntryView::from(&entry), Some(&human))
}

pub fn run_rm(session: &Session, id: TaskId) -> Result<()> {
    let (mut store, _) = session.open()?;
    if store.get_task(id).is_none() {
        return Err(Error::NotFound { kind: Kind::Task, id });
    }
    store.delete_task(id)?;

    let human = HumanOutput::new(format!("Task {id} deleted"));
    emit_success(session.output(), "task rm", &RemovedReport::new(id), Some(&human))
}

pub fn run_clear(session: &Session) -> Result<()> {
    let (mut store, _) = session.open()?;
    let removed = store.list_tasks().len();
    store.delete_all_tasks()?;

    let human = HumanOutput::new(format!("Deleted {removed} task(s)"));
    emit_success(session.output(), "task clear", &ClearedReport { removed }, Some(&human))
}
