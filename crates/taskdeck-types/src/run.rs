//! Run requests, progress events and run summaries

use crate::ids::RunId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Request to run a set of tasks across a sequence of accounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Task identifiers, executed per account in this order
    #[serde(default, alias = "tasks")]
    pub task_ids: Vec<String>,

    /// Raw input per task identifier
    #[serde(default)]
    pub inputs: HashMap<String, String>,

    /// Account tokens, executed in this order
    #[serde(default, alias = "accounts")]
    pub account_tokens: Vec<String>,
}

impl BatchRequest {
    pub fn new<T, A>(task_ids: T, account_tokens: A) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            task_ids: task_ids.into_iter().map(Into::into).collect(),
            inputs: HashMap::new(),
            account_tokens: account_tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Builder-style input setter
    pub fn with_input(mut self, task_id: impl Into<String>, raw: impl Into<String>) -> Self {
        self.inputs.insert(task_id.into(), raw.into());
        self
    }
}

/// Request to pair accounts so they follow each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualSubscriptionRequest {
    /// Follows requested per account; capped at `eligible - 1`
    #[serde(alias = "followersPerAccount")]
    pub followers_per_account: i64,

    /// Candidate account tokens; only accounts with status `ok` take part
    #[serde(default, alias = "accounts")]
    pub account_tokens: Vec<String>,
}

/// `(current, total)` milestone emitted once per completed account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub current: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn new(current: usize, total: usize) -> Self {
        Self { current, total }
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }
}

/// One line of the progress wire stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Progress { progress: ProgressEvent },
}

impl From<ProgressEvent> for StreamMessage {
    fn from(progress: ProgressEvent) -> Self {
        StreamMessage::Progress { progress }
    }
}

/// Which orchestration mode a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Batch,
    MutualSubscription,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Batch => f.write_str("batch"),
            RunKind::MutualSubscription => f.write_str("mutual_subscription"),
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub kind: RunKind,

    /// Accounts in the run's sequence
    pub total: usize,

    /// Accounts fully processed before the loop ended
    pub processed: usize,

    /// Log entries with status `success`
    pub succeeded: usize,

    /// Log entries with status `failed`
    pub failed: usize,

    /// Whether the loop stopped on a cancellation request
    pub cancelled: bool,

    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}
