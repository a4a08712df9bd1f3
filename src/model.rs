//! Entity model: tasks, epics and subtasks.
//!
//! All three kinds share the [`Task`] record (id, name, description, status,
//! duration, start time). Values are immutable; changes are made by building
//! a modified copy with the `with_*` methods and handing it back to the store,
//! which replaces the stored value by id.
//!
//! Equality and hashing only look at the id.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Date-time layout used on disk and in CLI output.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identity of a task, subtask or epic.
///
/// Id `0` is the placeholder carried by values that have not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub const UNASSIGNED: TaskId = TaskId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        digits
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| Error::InvalidArgument(format!("invalid id '{s}'")))
    }
}

/// Work status. Epic status is derived, never set by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    New,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "NEW",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NEW" => Ok(Status::New),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "DONE" => Ok(Status::Done),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status '{s}' (expected NEW|IN_PROGRESS|DONE)"
            ))),
        }
    }
}

/// Which of the three entity kinds a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    Task,
    Epic,
    Subtask,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Task => "TASK",
            Kind::Epic => "EPIC",
            Kind::Subtask => "SUBTASK",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "TASK" => Ok(Kind::Task),
            "EPIC" => Ok(Kind::Epic),
            "SUBTASK" => Ok(Kind::Subtask),
            other => Err(Error::InvalidArgument(format!("invalid type '{other}'"))),
        }
    }
}

/// Half-open scheduling window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// Saturates at the last representable date-time. Stored entities never
    /// get that far because their schedule is checked with [`end_of`].
    pub fn new(start: NaiveDateTime, duration: Duration) -> Self {
        Self {
            start,
            end: end_of(start, duration).unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// Windows that merely touch (one ends where the other starts) do not overlap.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// End of a slot, or `None` when it falls outside the date-time range.
pub fn end_of(start: NaiveDateTime, duration: Duration) -> Option<NaiveDateTime> {
    start.checked_add_signed(duration)
}

/// Parse a whole number of minutes into a duration chrono can represent.
pub fn parse_minutes(raw: &str) -> Result<Duration> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid duration '{raw}'")))?;
    Duration::try_minutes(minutes).ok_or_else(|| {
        Error::InvalidArgument(format!("duration out of range: {minutes} minutes"))
    })
}

/// Parse an ISO-8601 local date-time, with or without seconds.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|_| Error::InvalidArgument(format!("invalid date-time '{raw}'")))
}

pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// A plain task, and the record shared by subtasks and epics.
#[derive(Debug, Clone)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    status: Status,
    duration: Duration,
    start_time: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        status: Status,
        duration: Duration,
        start_time: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id: TaskId::UNASSIGNED,
            name: name.into(),
            description: description.into(),
            status,
            duration,
            start_time,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.start_time
            .and_then(|start| end_of(start, self.duration))
    }

    pub fn window(&self) -> Option<Window> {
        self.start_time.map(|start| Window::new(start, self.duration))
    }

    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_schedule(mut self, start_time: Option<NaiveDateTime>, duration: Duration) -> Self {
        self.start_time = start_time;
        self.duration = duration;
        self
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A schedulable unit of work owned by exactly one epic.
#[derive(Debug, Clone)]
pub struct Subtask {
    task: Task,
    epic_id: TaskId,
}

impl Subtask {
    pub fn new(
        epic_id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
        status: Status,
        duration: Duration,
        start_time: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            task: Task::new(name, description, status, duration, start_time),
            epic_id,
        }
    }

    /// The shared task record.
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn epic_id(&self) -> TaskId {
        self.epic_id
    }

    pub fn id(&self) -> TaskId {
        self.task.id()
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn description(&self) -> &str {
        self.task.description()
    }

    pub fn status(&self) -> Status {
        self.task.status()
    }

    pub fn duration(&self) -> Duration {
        self.task.duration()
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.task.start_time()
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.task.end_time()
    }

    pub fn window(&self) -> Option<Window> {
        self.task.window()
    }

    pub fn with_id(self, id: TaskId) -> Self {
        self.map_task(|task| task.with_id(id))
    }

    pub fn with_epic(mut self, epic_id: TaskId) -> Self {
        self.epic_id = epic_id;
        self
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.map_task(|task| task.with_name(name))
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.map_task(|task| task.with_description(description))
    }

    pub fn with_status(self, status: Status) -> Self {
        self.map_task(|task| task.with_status(status))
    }

    pub fn with_schedule(self, start_time: Option<NaiveDateTime>, duration: Duration) -> Self {
        self.map_task(|task| task.with_schedule(start_time, duration))
    }

    fn map_task(self, f: impl FnOnce(Task) -> Task) -> Self {
        Self {
            task: f(self.task),
            epic_id: self.epic_id,
        }
    }
}

impl PartialEq for Subtask {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Subtask {}

impl Hash for Subtask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Container task. Status, start, end and duration are derived from the
/// epic's subtasks and cannot be set directly.
#[derive(Debug, Clone)]
pub struct Epic {
    task: Task,
    subtask_ids: Vec<TaskId>,
    end_time: Option<NaiveDateTime>,
}

impl Epic {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            task: Task::new(name, description, Status::New, Duration::zero(), None),
            subtask_ids: Vec::new(),
            end_time: None,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn id(&self) -> TaskId {
        self.task.id()
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn description(&self) -> &str {
        self.task.description()
    }

    pub fn status(&self) -> Status {
        self.task.status()
    }

    pub fn duration(&self) -> Duration {
        self.task.duration()
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.task.start_time()
    }

    /// Latest subtask end, not `start + duration`: subtasks may leave gaps.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.end_time
    }

    /// Subtask ids in the order they were linked.
    pub fn subtask_ids(&self) -> &[TaskId] {
        &self.subtask_ids
    }

    pub fn with_id(mut self, id: TaskId) -> Self {
        self.task = self.task.with_id(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.task = self.task.with_name(name);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.task = self.task.with_description(description);
        self
    }

    pub(crate) fn with_subtask(mut self, id: TaskId) -> Self {
        if !self.subtask_ids.contains(&id) {
            self.subtask_ids.push(id);
        }
        self
    }

    pub(crate) fn without_subtask(mut self, id: TaskId) -> Self {
        self.subtask_ids.retain(|existing| *existing != id);
        self
    }

    pub(crate) fn without_subtasks(mut self) -> Self {
        self.subtask_ids.clear();
        self
    }

    pub(crate) fn with_derived(
        mut self,
        status: Status,
        start_time: Option<NaiveDateTime>,
        end_time: Option<NaiveDateTime>,
        duration: Duration,
    ) -> Self {
        self.task = self
            .task
            .with_status(status)
            .with_schedule(start_time, duration);
        self.end_time = end_time;
        self
    }
}

impl PartialEq for Epic {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Epic {}

impl Hash for Epic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Any stored entity, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entry {
    Task(Task),
    Subtask(Subtask),
    Epic(Epic),
}

impl Entry {
    pub fn kind(&self) -> Kind {
        match self {
            Entry::Task(_) => Kind::Task,
            Entry::Subtask(_) => Kind::Subtask,
            Entry::Epic(_) => Kind::Epic,
        }
    }

    /// The shared task record of any kind.
    pub fn task(&self) -> &Task {
        match self {
            Entry::Task(task) => task,
            Entry::Subtask(subtask) => subtask.task(),
            Entry::Epic(epic) => epic.task(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.task().id()
    }

    pub fn name(&self) -> &str {
        self.task().name()
    }

    pub fn status(&self) -> Status {
        self.task().status()
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.task().start_time()
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        match self {
            Entry::Epic(epic) => epic.end_time(),
            other => other.task().end_time(),
        }
    }

    /// Scheduling window. Epics are containers and never have one.
    pub fn window(&self) -> Option<Window> {
        match self {
            Entry::Task(task) => task.window(),
            Entry::Subtask(subtask) => subtask.window(),
            Entry::Epic(_) => None,
        }
    }
}

impl From<Task> for Entry {
    fn from(task: Task) -> Self {
        Entry::Task(task)
    }
}

impl From<Subtask> for Entry {
    fn from(subtask: Subtask) -> Self {
        Entry::Subtask(subtask)
    }
}

impl From<Epic> for Entry {
    fn from(epic: Epic) -> Self {
        Entry::Epic(epic)
    }
}
