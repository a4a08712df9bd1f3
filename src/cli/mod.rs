//! Command-line interface for tracker
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::model::{format_datetime, parse_datetime, parse_minutes, Entry, Status, TaskId};
use crate::output::{HumanOutput, OutputOptions};
use crate::persist::FileBackedStore;

mod epic;
mod list;
mod subtask;
mod task;

/// tracker - personal task tracker
///
/// Keeps tasks, epics and their subtasks in a plain data file, rejects
/// overlapping time slots and lists scheduled work in start-time order.
#[derive(Parser, Debug)]
#[command(name = "tracker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data file (defaults to `storage.path` from .tracker.toml)
    #[arg(long, global = true, env = "TRACKER_FILE")]
    pub file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Standalone tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Subtasks belonging to an epic
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Epics and their derived progress
    #[command(subcommand)]
    Epic(EpicCommands),

    /// List all tasks, epics and subtasks
    List,

    /// List scheduled tasks and subtasks by start time
    Prioritized,

    /// Create an example set when nothing is scheduled yet
    Seed,
}

/// Fields shared by task and subtask creation
#[derive(Args, Debug)]
pub struct NewWork {
    /// Name
    pub name: String,

    /// Free-form description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Initial status: NEW, IN_PROGRESS or DONE
    #[arg(long, default_value = "NEW")]
    pub status: Status,

    /// Start time, e.g. 2025-05-15T09:00
    #[arg(long, value_parser = parse_datetime)]
    pub start: Option<NaiveDateTime>,

    /// Duration in minutes (defaults to tasks.default_duration_minutes)
    #[arg(long, value_parser = parse_minutes)]
    pub minutes: Option<Duration>,
}

/// Field changes shared by task and subtask updates
#[derive(Args, Debug)]
pub struct WorkChanges {
    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New status
    #[arg(long)]
    pub status: Option<Status>,

    /// New start time
    #[arg(long, value_parser = parse_datetime, conflicts_with = "unschedule")]
    pub start: Option<NaiveDateTime>,

    /// New duration in minutes
    #[arg(long, value_parser = parse_minutes)]
    pub minutes: Option<Duration>,

    /// Drop the start time
    #[arg(long)]
    pub unschedule: bool,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add(NewWork),

    /// Show a task
    Show { id: TaskId },

    /// Change fields of a task
    Update {
        id: TaskId,
        #[command(flatten)]
        changes: WorkChanges,
    },

    /// Delete a task
    Rm { id: TaskId },

    /// Delete every task
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Create a subtask under an epic
    Add {
        /// Owning epic
        epic_id: TaskId,
        #[command(flatten)]
        work: NewWork,
    },

    /// Show a subtask
    Show { id: TaskId },

    /// Change fields of a subtask
    Update {
        id: TaskId,
        /// Move the subtask to another epic
        #[arg(long)]
        epic: Option<TaskId>,
        #[command(flatten)]
        changes: WorkChanges,
    },

    /// Delete a subtask
    Rm { id: TaskId },

    /// Delete every subtask
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum EpicCommands {
    /// Create an epic
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show an epic
    Show { id: TaskId },

    /// Rename or redescribe an epic
    Update {
        id: TaskId,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an epic and its subtasks
    Rm { id: TaskId },

    /// Delete every epic and subtask
    Clear,

    /// List the subtasks of an epic
    Subtasks { id: TaskId },
}

impl NewWork {
    /// Duration from `--minutes`, else the configured default.
    pub(crate) fn duration(&self, config: &Config) -> Result<Duration> {
        match self.minutes {
            Some(duration) => Ok(duration),
            None => config.tasks.default_duration(),
        }
    }
}

impl WorkChanges {
    /// Start time and duration after applying `--start`, `--unschedule` and
    /// `--minutes` to the current values.
    pub(crate) fn schedule(
        &self,
        start: Option<NaiveDateTime>,
        duration: Duration,
    ) -> (Option<NaiveDateTime>, Duration) {
        let start = if self.unschedule {
            None
        } else {
            self.start.or(start)
        };
        let duration = self.minutes.unwrap_or(duration);
        (start, duration)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let session = Session {
            file: self.file,
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        };

        match self.command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add(work) => task::run_add(&session, work),
                TaskCommands::Show { id } => task::run_show(&session, id),
                TaskCommands::Update { id, changes } => task::run_update(&session, id, changes),
                TaskCommands::Rm { id } => task::run_rm(&session, id),
                TaskCommands::Clear => task::run_clear(&session),
            },
            Commands::Subtask(cmd) => match cmd {
                SubtaskCommands::Add { epic_id, work } => {
                    subtask::run_add(&session, epic_id, work)
                }
                SubtaskCommands::Show { id } => subtask::run_show(&session, id),
                SubtaskCommands::Update { id, epic, changes } => {
                    subtask::run_update(&session, id, epic, changes)
                }
                SubtaskCommands::Rm { id } => subtask::run_rm(&session, id),
                SubtaskCommands::Clear => subtask::run_clear(&session),
            },
            Commands::Epic(cmd) => match cmd {
                EpicCommands::Add { name, description } => {
                    epic::run_add(&session, name, description)
                }
                EpicCommands::Show { id } => epic::run_show(&session, id),
                EpicCommands::Update {
                    id,
                    name,
                    description,
                } => epic::run_update(&session, id, name, description),
                EpicCommands::Rm { id } => epic::run_rm(&session, id),
                EpicCommands::Clear => epic::run_clear(&session),
                EpicCommands::Subtasks { id } => epic::run_subtasks(&session, id),
            },
            Commands::List => list::run_list(&session),
            Commands::Prioritized => list::run_prioritized(&session),
            Commands::Seed => list::run_seed(&session),
        }
    }
}

/// Global flags every command runs with.
pub struct Session {
    file: Option<PathBuf>,
    output: OutputOptions,
}

impl Session {
    pub(crate) fn output(&self) -> OutputOptions {
        self.output
    }

    /// Load config from the working directory and open the data file.
    pub(crate) fn open(&self) -> Result<(FileBackedStore, Config)> {
        let cwd = std::env::current_dir()?;
        let config = Config::load_from_dir(&cwd);
        let path = self
            .file
            .clone()
            .unwrap_or_else(|| config.data_file(&cwd));
        let store = FileBackedStore::open(&path, config.store_options())?;
        Ok((store, config))
    }
}

/// Serializable view of any entity.
#[derive(Debug, Serialize)]
pub(crate) struct EntryView {
    id: u64,
    kind: &'static str,
    name: String,
    description: String,
    status: &'static str,
    start_time: Option<String>,
    duration_minutes: i64,
    end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    epic_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtask_ids: Option<Vec<u64>>,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        let task = entry.task();
        let (epic_id, subtask_ids) = match entry {
            Entry::Task(_) => (None, None),
            Entry::Subtask(subtask) => (Some(subtask.epic_id().get()), None),
            Entry::Epic(epic) => (
                None,
                Some(epic.subtask_ids().iter().map(|id| id.get()).collect()),
            ),
        };
        Self {
            id: entry.id().get(),
            kind: entry.kind().as_str(),
            name: task.name().to_string(),
            description: task.description().to_string(),
            status: entry.status().as_str(),
            start_time: entry.start_time().map(format_datetime),
            duration_minutes: task.duration().num_minutes(),
            end_time: entry.end_time().map(format_datetime),
            epic_id,
            subtask_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RemovedReport {
    id: u64,
    removed: bool,
}

impl RemovedReport {
    pub(crate) fn new(id: TaskId) -> Self {
        Self {
            id: id.get(),
            removed: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ClearedReport {
    pub(crate) removed: usize,
}

pub(crate) fn views<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<EntryView> {
    entries.into_iter().map(EntryView::from).collect()
}

/// One listing line: `#3 SUBTASK [DONE] Pack books  2025-05-15T10:00:00 +59m`
pub(crate) fn entry_line(entry: &Entry) -> String {
    let mut line = format!(
        "{} {} [{}] {}",
        entry.id(),
        entry.kind(),
        entry.status(),
        entry.name()
    );
    if let Some(start) = entry.start_time() {
        line.push_str(&format!(
            "  {} +{}m",
            format_datetime(start),
            entry.task().duration().num_minutes()
        ));
    }
    if let Entry::Subtask(subtask) = entry {
        line.push_str(&format!("  (epic {})", subtask.epic_id()));
    }
    line
}

/// Detailed human rendering of a single entity.
pub(crate) fn describe(header: impl Into<String>, entry: &Entry) -> HumanOutput {
    let task = entry.task();
    let mut human = HumanOutput::new(header);
    human.push_summary("id", entry.id().to_string());
    human.push_summary("name", task.name());
    if !task.description().is_empty() {
        human.push_summary("description", task.description());
    }
    human.push_summary("status", entry.status().as_str());
    match entry.start_time() {
        Some(start) => {
            human.push_summary("start", format_datetime(start));
            human.push_summary("duration", format!("{}m", task.duration().num_minutes()));
            if let Some(end) = entry.end_time() {
                human.push_summary("end", format_datetime(end));
            }
        }
        None => human.push_summary("unscheduled", ""),
    }
    match entry {
        Entry::Subtask(subtask) => human.push_summary("epic", subtask.epic_id().to_string()),
        Entry::Epic(epic) => {
            for id in epic.subtask_ids() {
                human.push_detail(format!("subtask {id}"));
            }
        }
        Entry::Task(_) => {}
    }
    human
}
