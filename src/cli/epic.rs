//! tracker epic command implementation
//!
//! Epic status and time span are derived from subtasks, so only the name
//! and description can be edited here.

use crate::cli::{describe, entry_line, views, ClearedReport, EntryView, RemovedReport, Session};
use crate::error::{Error, Result};
use crate::model::{Entry, Epic, Kind, TaskId};
use crate::output::{emit_success, HumanOutput};

fn not_found(id: TaskId) -> Error {
    Error::NotFound {
        kind: Kind::Epic,
        id,
    }
}

pub fn run_add(session: &Session, name: String, description: String) -> Result<()> {
    let (mut store, _) = session.open()?;
    let id = store.create_epic(Epic::new(name, description))?;
    let epic = store.get_epic(id).ok_or_else(|| not_found(id))?;

    let entry = Entry::Epic(epic);
    let mut human = describe(format!("Epic {id} created"), &entry);
    human.push_next_step(format!("tracker subtask add {} <name>", id.get()));
    emit_success(session.output(), "epic add", &EntryView::from(&entry), Some(&human))
}

pub fn run_show(session: &Session, id: TaskId) -> Result<()> {
    let (mut store, _) = session.open()?;
    let epic = store.get_epic(id).ok_or_else(|| not_found(id))?;

    let entry = Entry::Epic(epic);
    let human = describe(format!("Epic {id}"), &entry);
    emit_success(session.output(), "epic show", &EntryView::from(&entry), Some(&human))
}

pub fn run_update(
    session: &Session,
    id: TaskId,
    name: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let (mut store, _) = session.open()?;
    let current = store.get_epic(id).ok_or_else(|| not_found(id))?;

    let mut updated = current;
    if let Some(name) = name {
        updated = updated.with_name(name);
    }
    if let Some(description) = description {
        updated = updated.with_description(description);
    }
    store.update_epic(updated)?;
    let epic = store.get_epic(id).ok_or_else(|| not_found(id))?;

    let entry = Entry::Epic(epic);
    let human = describe(format!("Epic {id} updated"), &entry);
    emit_success(session.output(), "epic update", &EntryView::from(&entry), Some(&human))
}

pub fn run_rm(session: &Session, id: TaskId) -> Result<()> {
    let (mut store, _) = session.open()?;
    let epic = store.get_epic(id).ok_or_else(|| not_found(id))?;
    store.delete_epic(id)?;

    let mut human = HumanOutput::new(format!("Epic {id} deleted"));
    let cascaded = epic.subtask_ids().len();
    if cascaded > 0 {
        human.push_summary("subtasks deleted", cascaded.to_string());
    }
    emit_success(session.output(), "epic rm", &RemovedReport::new(id), Some(&human))
}

pub fn run_clear(session: &Session) -> Result<()> {
    let (mut store, _) = session.open()?;
    let removed = store.list_epics().len();
    let subtasks = store.list_subtasks().len();
    store.delete_all_epics()?;

    let mut human = HumanOutput::new(format!("Deleted {removed} epic(s)"));
    if subtasks > 0 {
        human.push_summary("subtasks deleted", subtasks.to_string());
    }
    emit_success(session.output(), "epic clear", &ClearedReport { removed }, Some(&human))
}

pub fn run_subtasks(session: &Session, id: TaskId) -> Result<()> {
    let (store, _) = session.open()?;
    let entries: Vec<Entry> = store
        .epic_subtasks(id)
        .ok_or_else(|| not_found(id))?
        .into_iter()
        .map(Entry::Subtask)
        .collect();

    let mut human = HumanOutput::new(format!("Epic {id}: {} subtask(s)", entries.len()));
    for entry in &entries {
        human.push_detail(entry_line(entry));
    }
    emit_success(session.output(), "epic subtasks", &views(&entries), Some(&human))
}
