//! tracker - personal task tracker library
//!
//! Tasks, epics and subtasks share one id space. Epics carry no schedule
//! of their own: their status and time span are derived from their
//! subtasks. Scheduled tasks and subtasks may not overlap.
//!
//! # Module Organization
//!
//! - `model`: entity values (`Task`, `Subtask`, `Epic`, `Entry`) and ids
//! - `ids`: id allocation
//! - `rollup`: epic status and time span derivation
//! - `history`: recently viewed entities, deduplicated by id
//! - `schedule`: start-time ordered index and overlap detection
//! - `store`: in-memory store keeping the above consistent
//! - `codec`: line-based data file format
//! - `persist`: store that writes through to the data file
//! - `lock`: file locking and atomic writes
//! - `config`: configuration loading from `.tracker.toml`
//! - `output`: human and JSON output for the CLI
//! - `cli`: command-line interface using clap

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod ids;
pub mod lock;
pub mod model;
pub mod output;
pub mod persist;
pub mod rollup;
pub mod schedule;
pub mod store;

pub use error::{Error, Result};
pub use model::{Entry, Epic, Kind, Status, Subtask, Task, TaskId};
pub use persist::{FileBackedStore, StoreOptions};
pub use store::TaskStore;
