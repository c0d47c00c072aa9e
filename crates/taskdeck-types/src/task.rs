//! Task catalog entries, parsed task inputs and log entries

use crate::account::Account;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog entry describing one task kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Unique task identifier, e.g. `follow`
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description for operators
    pub description: String,

    /// Whether a non-blank input must accompany the task
    pub requires_input: bool,

    /// Shape of the free-form input
    pub input_shape: InputShape,
}

impl TaskSpec {
    /// Spec for a task that takes no input
    pub fn without_input(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            requires_input: false,
            input_shape: InputShape::None,
        }
    }

    /// Spec for a task that requires input of the given shape
    pub fn with_input(id: &str, name: &str, description: &str, shape: InputShape) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            requires_input: true,
            input_shape: shape,
        }
    }
}

/// Shape of a task's free-form input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    None,
    Usernames,
    TweetLink,
    TweetLinks,
}

/// Task input after parsing the raw string by shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskInput {
    None,
    Usernames(Vec<String>),
    TweetLink(String),
    TweetLinks(Vec<String>),
    /// Accounts to follow, produced by a pairing assignment
    FollowTargets(Vec<Account>),
}

impl TaskInput {
    /// Parse a raw input string according to `shape`.
    ///
    /// Items are separated by whitespace or commas. Usernames lose a leading
    /// `@`. A single-link shape keeps the first item only.
    pub fn parse(shape: InputShape, raw: Option<&str>) -> Self {
        let items: Vec<String> = raw
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        match shape {
            InputShape::None => TaskInput::None,
            InputShape::Usernames => TaskInput::Usernames(
                items
                    .into_iter()
                    .map(|u| u.trim_start_matches('@').to_string())
                    .filter(|u| !u.is_empty())
                    .collect(),
            ),
            InputShape::TweetLink => items
                .into_iter()
                .next()
                .map(TaskInput::TweetLink)
                .unwrap_or(TaskInput::None),
            InputShape::TweetLinks => TaskInput::TweetLinks(items),
        }
    }

    /// Number of items carried by the input
    pub fn len(&self) -> usize {
        match self {
            TaskInput::None => 0,
            TaskInput::TweetLink(_) => 1,
            TaskInput::Usernames(items) | TaskInput::TweetLinks(items) => items.len(),
            TaskInput::FollowTargets(targets) => targets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Content-selection flags handed to tweet and comment tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPreferences {
    pub random_text: bool,
    pub random_picture: bool,
}

/// Outcome of a task on one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Success,
    Failed,
}

impl TaskStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded (task, account) outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLogEntry {
    /// Task identity, e.g. `follow` or `mutual_subscription`
    pub task: String,

    /// 1-based position of the account within its run
    pub account_index: usize,

    /// Final outcome after retries
    pub status: TaskStatus,

    /// When the outcome was recorded
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Wall time spent executing, retries and attempt pauses included
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl TaskLogEntry {
    pub fn new(task: impl Into<String>, account_index: usize, status: TaskStatus) -> Self {
        Self {
            task: task.into(),
            account_index,
            status,
            timestamp: chrono::Utc::now(),
            elapsed_ms: 0,
        }
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }
}
