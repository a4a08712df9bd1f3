//! Error types for tracker
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (invalid input, bad config, unknown id)
//! - 3: Schedule conflict (time window overlaps an existing task)
//! - 4: Operation failed (I/O, malformed data file, lock contention)

use std::path::PathBuf;
use thiserror::Error;

use crate::model::{Kind, TaskId};

/// Exit codes for the tracker CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const SCHEDULE_CONFLICT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tracker operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: Kind, id: TaskId },

    // Schedule conflicts (exit code 3)
    #[error("Time window overlaps {conflicting}")]
    Overlap { conflicting: TaskId },

    // Operation failures (exit code 4)
    #[error("Malformed data file at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::NotFound { .. } => exit_codes::USER_ERROR,

            Error::Overlap { .. } => exit_codes::SCHEDULE_CONFLICT,

            Error::Parse { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// True for rejected input: absent values, bad fields and schedule overlaps.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Overlap { .. })
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;
