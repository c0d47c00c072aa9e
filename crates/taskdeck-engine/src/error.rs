//! Error types for the orchestration engine

use thiserror::Error;

/// A request was rejected before any run state changed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Another run holds the single-flight slot
    #[error("A run is already in progress")]
    AlreadyRunning,

    /// No tasks were selected, or a task id is not in the catalog
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// A task that requires input has a blank or missing entry
    #[error("Missing input for task: {0}")]
    MissingInput(String),

    /// The account sequence is empty
    #[error("No accounts selected")]
    NoAccounts,

    /// Fewer than two eligible accounts for mutual subscription
    #[error("Need at least 2 eligible accounts, found {0}")]
    InsufficientAccounts(usize),

    /// A numeric run parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors raised by a task executor
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The task failed on this account; recorded and the run continues
    #[error("Task failed: {0}")]
    Task(String),

    /// The executor is unusable; the run ends
    #[error("Executor fault: {0}")]
    Fatal(String),
}

impl ExecutorError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecutorError::Fatal(_))
    }
}

/// Task log store errors
#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("Log store unavailable: {0}")]
    Unavailable(String),
}

/// Terminal error of an accepted run
#[derive(Debug, Error)]
pub enum EngineError {
    /// The executor raised a non-recoverable fault
    #[error("Run aborted: {0}")]
    Fatal(String),

    /// Outcomes could not be recorded
    #[error("Log store error: {0}")]
    Log(#[from] LogStoreError),

    /// The run task panicked or was aborted
    #[error("Run task failed: {0}")]
    Join(String),
}

/// Result type for request validation and run start
pub type RunResult<T> = std::result::Result<T, RunError>;

/// Result type for run execution
pub type EngineResult<T> = std::result::Result<T, EngineError>;
