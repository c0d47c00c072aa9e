//! Pluggable task execution capability

use crate::error::ExecutorError;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use taskdeck_types::{Account, ContentPreferences, TaskInput};

/// One task applied to one account
#[derive(Debug, Clone)]
pub struct TaskInvocation {
    /// Catalog task id, or `mutual_subscription`
    pub task_id: String,

    /// Target account
    pub account: Account,

    /// 1-based position of the account within its run
    pub account_index: usize,

    /// Parsed task input
    pub input: TaskInput,

    /// Content-selection flags for tweet and comment tasks
    pub content: ContentPreferences,

    /// 1-based attempt number
    pub attempt: u32,
}

/// Executes a single task against a single account.
///
/// `Ok(())` is a success. `ExecutorError::Task` is a failure recorded in the
/// log; the run moves on. `ExecutorError::Fatal` ends the run.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, invocation: &TaskInvocation) -> Result<(), ExecutorError>;
}

/// Executor that simulates platform calls with random latency and outcomes
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    success_rate: f64,
    mutual_success_rate: f64,
    latency: (Duration, Duration),
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self {
            success_rate: 0.8,
            mutual_success_rate: 0.9,
            latency: (Duration::from_millis(200), Duration::from_millis(2000)),
        }
    }
}

impl SimulatedExecutor {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    pub fn with_mutual_success_rate(mut self, rate: f64) -> Self {
        self.mutual_success_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.latency = if min <= max { (min, max) } else { (max, min) };
        self
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn execute(&self, invocation: &TaskInvocation) -> Result<(), ExecutorError> {
        let (delay, roll) = {
            let mut rng = rand::thread_rng();
            let (min, max) = self.latency;
            let delay = if max > min { rng.gen_range(min..=max) } else { min };
            (delay, rng.gen::<f64>())
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let rate = match invocation.input {
            TaskInput::FollowTargets(_) => self.mutual_success_rate,
            _ => self.success_rate,
        };

        if roll < rate {
            Ok(())
        } else {
            Err(ExecutorError::Task(format!(
                "simulated {} failure for {}",
                invocation.task_id,
                invocation.account.label()
            )))
        }
    }
}
