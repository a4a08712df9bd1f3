//! tracker list, prioritized and seed commands

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::cli::{entry_line, views, EntryView, Session};
use crate::error::{Error, Result};
use crate::model::{Entry, Epic, Kind, Status, Subtask, Task};
use crate::output::{emit_success, HumanOutput};
use crate::persist::FileBackedStore;

#[derive(Serialize)]
struct ListReport {
    tasks: Vec<EntryView>,
    epics: Vec<EntryView>,
    subtasks: Vec<EntryView>,
}

#[derive(Serialize)]
struct SeedReport {
    created: Vec<EntryView>,
    skipped: bool,
}

pub fn run_list(session: &Session) -> Result<()> {
    let (store, _) = session.open()?;
    let tasks: Vec<Entry> = store.list_tasks().into_iter().map(Entry::Task).collect();
    let epics: Vec<Entry> = store.list_epics().into_iter().map(Entry::Epic).collect();
    let subtasks: Vec<Entry> = store.list_subtasks().into_iter().map(Entry::Subtask).collect();

    let mut human = HumanOutput::new(format!(
        "{} task(s), {} epic(s), {} subtask(s)",
        tasks.len(),
        epics.len(),
        subtasks.len()
    ));
    for entry in tasks.iter().chain(&epics).chain(&subtasks) {
        human.push_detail(entry_line(entry));
    }
    if tasks.is_empty() && epics.is_empty() {
        human.push_next_step("tracker task add <name>");
    }

    let report = ListReport {
        tasks: views(&tasks),
        epics: views(&epics),
        subtasks: views(&subtasks),
    };
    emit_success(session.output(), "list", &report, Some(&human))
}

pub fn run_prioritized(session: &Session) -> Result<()> {
    let (store, _) = session.open()?;
    let entries = store.prioritized();

    let mut human = HumanOutput::new(format!("{} scheduled", entries.len()));
    for entry in &entries {
        human.push_detail(entry_line(entry));
    }
    emit_success(session.output(), "prioritized", &views(&entries), Some(&human))
}

pub fn run_seed(session: &Session) -> Result<()> {
    let (mut store, _) = session.open()?;

    if store.store().has_schedule() {
        let mut human = HumanOutput::new("Nothing seeded");
        human.push_warning("scheduled entries already exist");
        let report = SeedReport {
            created: Vec::new(),
            skipped: true,
        };
        return emit_success(session.output(), "seed", &report, Some(&human));
    }

    let created = seed(&mut store)?;
    info!(count = created.len(), "example set created");

    let mut human = HumanOutput::new(format!("Seeded {} entries", created.len()));
    for entry in &created {
        human.push_detail(entry_line(entry));
    }
    human.push_next_step("tracker prioritized");
    let report = SeedReport {
        created: views(&created),
        skipped: false,
    };
    emit_success(session.output(), "seed", &report, Some(&human))
}

fn seed_start() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2025, 5, 1)
        .and_then(|day| day.and_hms_opt(9, 0, 0))
        .ok_or_else(|| Error::InvalidArgument("invalid seed start".to_string()))
}

/// Two tasks and two epics with one subtask each, in consecutive hour slots.
fn seed(store: &mut FileBackedStore) -> Result<Vec<Entry>> {
    let start = seed_start()?;
    let slot = |hours: i64| Some(start + Duration::hours(hours));
    let length = Duration::minutes(59);

    let plan = Task::new(
        "Plan the week",
        "Review goals and calendar",
        Status::New,
        length,
        slot(0),
    );
    let inbox = Task::new("Inbox zero", "Answer pending mail", Status::Done, length, slot(1));
    let mut ids = vec![store.create_task(plan)?, store.create_task(inbox)?];
    let garden = store.create_epic(Epic::new("Garden", "Get the beds ready for spring"))?;
    let trip = store.create_epic(Epic::new("Trip", "Weekend away"))?;
    ids.push(garden);
    ids.push(trip);

    let subtasks = [
        Subtask::new(garden, "Buy seeds", "Tomatoes and herbs", Status::New, length, slot(2)),
        Subtask::new(trip, "Book hotel", "Two nights", Status::New, length, slot(3)),
    ];
    for subtask in subtasks {
        let epic_id = subtask.epic_id();
        let id = store.create_subtask(subtask)?.ok_or(Error::NotFound {
            kind: Kind::Epic,
            id: epic_id,
        })?;
        ids.push(id);
    }

    // epics re-read last so their derived span includes the new subtasks
    let store = store.store();
    let mut created: Vec<Entry> = store
        .list_tasks()
        .into_iter()
        .map(Entry::Task)
        .chain(store.list_epics().into_iter().map(Entry::Epic))
        .chain(store.list_subtasks().into_iter().map(Entry::Subtask))
        .filter(|entry| ids.contains(&entry.id()))
        .collect();
    created.sort_by_key(Entry::id);
    Ok(created)
}
