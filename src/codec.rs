//! Line-based data file format.
//!
//! One record per line, nine comma-separated columns:
//!
//! ```text
//! id,type,name,status,description,epicId,startTime,durationMinutes,endTime
//! 1,TASK,Write report,NEW,Quarterly numbers,0,2025-05-15T09:00:00,59,0
//! 2,EPIC,Move house,IN_PROGRESS,,0,2025-05-15T10:00:00,118,2025-05-15T11:59:00
//! 3,SUBTASK,Pack books,DONE,,2,2025-05-15T10:00:00,59,0
//! ```
//!
//! `epicId` is `0` except on subtasks. `startTime` is empty when unscheduled.
//! `endTime` is `0` for tasks and subtasks, and the derived end (or empty)
//! for epics. There is no quoting, so names and descriptions may not
//! contain commas or line breaks.

use std::fmt::Write as _;

use chrono::{Duration, NaiveDateTime};

use crate::error::{Error, Result};
use crate::history::HistoryTracker;
use crate::model::{
    self, format_datetime, parse_datetime, Entry, Epic, Kind, Status, Subtask, Task, TaskId,
};
use crate::store::TaskStore;

pub const COLUMNS: usize = 9;

const SEPARATOR: char = ',';

/// Reject text fields the line format cannot carry.
pub fn check_fields(name: &str, description: &str) -> Result<()> {
    for (field, value) in [("name", name), ("description", description)] {
        if value.contains([SEPARATOR, '\n', '\r']) {
            return Err(Error::Validation(format!(
                "{field} may not contain commas or line breaks: '{value}'"
            )));
        }
    }
    Ok(())
}

/// Encode one entity as a line, without the trailing newline.
pub fn encode_entry(entry: &Entry) -> String {
    let task = entry.task();
    let (epic_id, end_time) = match entry {
        Entry::Task(_) => (0, "0".to_string()),
        Entry::Subtask(subtask) => (subtask.epic_id().get(), "0".to_string()),
        Entry::Epic(epic) => (0, optional_datetime(epic.end_time())),
    };

    format!(
        "{},{},{},{},{},{},{},{},{}",
        task.id().get(),
        entry.kind(),
        task.name(),
        task.status(),
        task.description(),
        epic_id,
        optional_datetime(task.start_time()),
        task.duration().num_minutes(),
        end_time,
    )
}

/// Encode the whole store: tasks, then epics, then subtasks, each by id.
pub fn encode(store: &TaskStore) -> String {
    let mut out = String::new();
    let entries = store
        .list_tasks()
        .into_iter()
        .map(Entry::Task)
        .chain(store.list_epics().into_iter().map(Entry::Epic))
        .chain(store.list_subtasks().into_iter().map(Entry::Subtask));
    for entry in entries {
        let _ = writeln!(out, "{}", encode_entry(&entry));
    }
    out
}

/// Decode one line. `line_no` is 1-based and only used for error messages.
pub fn decode_entry(line: &str, line_no: usize) -> Result<Entry> {
    let columns: Vec<&str> = line.split(SEPARATOR).collect();
    if columns.len() != COLUMNS {
        return Err(Error::parse(
            line_no,
            format!("expected {COLUMNS} columns, found {}", columns.len()),
        ));
    }

    let id = parse_id(columns[0], "id", line_no)?;
    if !id.is_assigned() {
        return Err(Error::parse(line_no, "id must be positive"));
    }
    // the allocator needs room for the next id
    if id.get() == u64::MAX {
        return Err(Error::parse(line_no, format!("id {id} out of range")));
    }
    let kind: Kind = columns[1]
        .parse()
        .map_err(|_| Error::parse(line_no, format!("unknown type '{}'", columns[1])))?;
    let name = columns[2];
    let status: Status = columns[3]
        .parse()
        .map_err(|_| Error::parse(line_no, format!("unknown status '{}'", columns[3])))?;
    let description = columns[4];
    let epic_id = parse_id(columns[5], "epic id", line_no)?;
    let start_time = parse_optional_datetime(columns[6], line_no)?;
    let minutes: i64 = columns[7]
        .trim()
        .parse()
        .map_err(|_| Error::parse(line_no, format!("invalid duration '{}'", columns[7])))?;
    if minutes < 0 {
        return Err(Error::parse(line_no, format!("negative duration {minutes}")));
    }
    let duration = Duration::try_minutes(minutes)
        .ok_or_else(|| Error::parse(line_no, format!("duration out of range: {minutes}")))?;
    if let Some(start) = start_time {
        if model::end_of(start, duration).is_none() {
            return Err(Error::parse(
                line_no,
                format!("duration {minutes} ends past the supported date range"),
            ));
        }
    }

    let entry = match kind {
        Kind::Task => {
            Entry::Task(Task::new(name, description, status, duration, start_time).with_id(id))
        }
        Kind::Subtask => {
            if !epic_id.is_assigned() {
                return Err(Error::parse(line_no, "subtask without epic id"));
            }
            Entry::Subtask(
                Subtask::new(epic_id, name, description, status, duration, start_time)
                    .with_id(id),
            )
        }
        // derived columns are recomputed from the subtasks once they are linked
        Kind::Epic => Entry::Epic(Epic::new(name, description).with_id(id)),
    };
    Ok(entry)
}

/// Build a fresh store from file contents. Nothing is returned unless every
/// line decodes and links.
pub fn decode(text: &str, history: HistoryTracker) -> Result<TaskStore> {
    let mut entries = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        entries.push((index + 1, decode_entry(line, index + 1)?));
    }

    // epics first so subtasks can link regardless of line order
    entries.sort_by_key(|(_, entry)| match entry.kind() {
        Kind::Epic => 0,
        Kind::Task => 1,
        Kind::Subtask => 2,
    });

    let mut store = TaskStore::with_history(history);
    for (line_no, entry) in entries {
        store
            .restore(entry)
            .map_err(|err| Error::parse(line_no, restore_message(err)))?;
    }
    Ok(store)
}

fn restore_message(err: Error) -> String {
    match err {
        Error::Validation(message) => message,
        other => other.to_string(),
    }
}

fn parse_id(raw: &str, field: &str, line_no: usize) -> Result<TaskId> {
    raw.trim()
        .parse::<u64>()
        .map(TaskId::new)
        .map_err(|_| Error::parse(line_no, format!("invalid {field} '{raw}'")))
}

fn parse_optional_datetime(raw: &str, line_no: usize) -> Result<Option<NaiveDateTime>> {
    let trimmed = raw.trim();
    // older files wrote a missing start time as "null"
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    parse_datetime(trimmed)
        .map(Some)
        .map_err(|_| Error::parse(line_no, format!("invalid start time '{raw}'")))
}

fn optional_datetime(value: Option<NaiveDateTime>) -> String {
    value.map(format_datetime).unwrap_or_default()
}
