//! Static registry of available task kinds

use crate::error::{RunError, RunResult};
use std::collections::HashSet;
use taskdeck_types::{BatchRequest, InputShape, TaskInput, TaskSpec};

/// Task identity used for mutual subscription log entries
pub const MUTUAL_SUBSCRIPTION_TASK: &str = "mutual_subscription";

/// A catalog task paired with its parsed input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub spec: TaskSpec,
    pub input: TaskInput,
}

/// Registry of task kinds, fixed at process start
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    specs: Vec<TaskSpec>,
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TaskCatalog {
    /// Catalog from an explicit list; later duplicates of an id are dropped
    pub fn new(specs: Vec<TaskSpec>) -> Self {
        let mut seen = HashSet::new();
        let specs = specs
            .into_iter()
            .filter(|spec| seen.insert(spec.id.clone()))
            .collect();
        Self { specs }
    }

    /// The standard task set
    pub fn builtin() -> Self {
        use InputShape::*;
        Self::new(vec![
            TaskSpec::with_input("follow", "Follow", "Follow users", Usernames),
            TaskSpec::with_input("like", "Like", "Like tweets", TweetLinks),
            TaskSpec::with_input("retweet", "Retweet", "Retweet posts", TweetLinks),
            TaskSpec::with_input("comment", "Comment", "Comment on tweets", TweetLink),
            TaskSpec::with_input(
                "comment_image",
                "Comment with Image",
                "Comment with image",
                TweetLink,
            ),
            TaskSpec::without_input("tweet", "Tweet", "Post tweets"),
            TaskSpec::without_input("tweet_image", "Tweet with Image", "Post tweets with images"),
            TaskSpec::with_input("quote", "Quote", "Quote tweets", TweetLinks),
            TaskSpec::with_input("quote_image", "Quote with Image", "Quote with images", TweetLinks),
            TaskSpec::with_input("unfollow", "Unfollow", "Unfollow users", Usernames),
            TaskSpec::without_input("check_valid", "Check Valid", "Validate accounts"),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&TaskSpec> {
        self.specs.iter().find(|spec| spec.id == id)
    }

    pub fn specs(&self) -> &[TaskSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Validate a batch request and resolve its tasks in request order.
    ///
    /// Repeated task ids collapse to their first occurrence.
    pub fn plan(&self, request: &BatchRequest) -> RunResult<Vec<PlannedTask>> {
        if request.task_ids.is_empty() {
            return Err(RunError::UnknownTask("no tasks selected".to_string()));
        }

        let mut seen = HashSet::new();
        let mut planned = Vec::with_capacity(request.task_ids.len());

        for task_id in &request.task_ids {
            if !seen.insert(task_id.as_str()) {
                continue;
            }

            let spec = self
                .get(task_id)
                .ok_or_else(|| RunError::UnknownTask(task_id.clone()))?;

            let raw = request.inputs.get(task_id).map(String::as_str);
            if spec.requires_input && raw.map_or(true, |r| r.trim().is_empty()) {
                return Err(RunError::MissingInput(task_id.clone()));
            }

            planned.push(PlannedTask {
                spec: spec.clone(),
                input: TaskInput::parse(spec.input_shape, raw),
            });
        }

        if request.account_tokens.is_empty() {
            return Err(RunError::NoAccounts);
        }

        Ok(planned)
    }
}
