//! Epic aggregation.
//!
//! An epic's status and time span are recomputed from scratch from its
//! current subtasks every time one of them changes. Nothing is carried over
//! from the previous value, so any status can follow any other.

use chrono::{Duration, NaiveDateTime};

use crate::model::{Status, Subtask};

/// Derived fields of an epic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollup {
    pub status: Status,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration: Duration,
}

impl Rollup {
    pub fn empty() -> Self {
        Self {
            status: Status::New,
            start_time: None,
            end_time: None,
            duration: Duration::zero(),
        }
    }
}

/// NEW when empty or all NEW, DONE when all DONE, IN_PROGRESS otherwise.
pub fn status_of(statuses: impl IntoIterator<Item = Status>) -> Status {
    let mut all_new = true;
    let mut all_done = true;

    for status in statuses {
        all_new &= status == Status::New;
        all_done &= status == Status::Done;
        if !all_new && !all_done {
            return Status::InProgress;
        }
    }

    if all_new {
        Status::New
    } else if all_done {
        Status::Done
    } else {
        Status::InProgress
    }
}

/// Aggregate status, earliest start, latest end and total duration.
///
/// Unscheduled subtasks still count towards status and duration.
pub fn rollup<'a>(subtasks: impl IntoIterator<Item = &'a Subtask>) -> Rollup {
    let mut statuses = Vec::new();
    let mut start_time: Option<NaiveDateTime> = None;
    let mut end_time: Option<NaiveDateTime> = None;
    let mut duration = Duration::zero();

    for subtask in subtasks {
        statuses.push(subtask.status());
        duration = duration
            .checked_add(&subtask.duration())
            .unwrap_or(Duration::MAX);
        if let Some(start) = subtask.start_time() {
            start_time = Some(start_time.map_or(start, |current| current.min(start)));
        }
        if let Some(end) = subtask.end_time() {
            end_time = Some(end_time.map_or(end, |current| current.max(end)));
        }
    }

    Rollup {
        status: status_of(statuses),
        start_time,
        end_time,
        duration,
    }
}
