//! Run lifecycle and the per-account execution loop
//!
//! Both run kinds share one loop: resolve the request into a sequence of
//! account units, claim the single-flight slot, then for every unit run its
//! steps, append one log entry per step, emit one progress event and pause.
//! The slot is released and the progress stream closed when the loop ends,
//! whatever the reason.

use crate::catalog::{TaskCatalog, MUTUAL_SUBSCRIPTION_TASK};
use crate::error::{EngineError, EngineResult, ExecutorError, RunResult};
use crate::executor::{TaskExecutor, TaskInvocation};
use crate::guard::{RunGuard, RunSlot};
use crate::log::TaskLogStore;
use crate::notify::{NoopNotifier, RunNotifier};
use crate::pacing;
use crate::pairing::assign_pairs;
use crate::progress::{progress_channel, ProgressSender, ProgressStream};
use crate::roster::AccountRoster;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taskdeck_types::{
    Account, BatchRequest, ContentPreferences, MutualSubscriptionRequest, ProgressEvent, RunConfiguration,
    RunId, RunKind, RunSummary, TaskInput, TaskLogEntry, TaskStatus,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Engine tunables that are not part of the run configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single execution attempt
    pub task_timeout: Duration,

    /// Undelivered progress events buffered per run
    pub progress_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            task_timeout: Duration::from_secs(120),
            progress_buffer: 256,
        }
    }
}

/// Orchestrates batch and mutual subscription runs
pub struct Orchestrator {
    catalog: Arc<TaskCatalog>,
    guard: Arc<RunGuard>,
    executor: Arc<dyn TaskExecutor>,
    log: Arc<dyn TaskLogStore>,
    roster: Arc<AccountRoster>,
    run_config: Arc<RwLock<RunConfiguration>>,
    notifier: Arc<dyn RunNotifier>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(
        executor: Arc<dyn TaskExecutor>,
        log: Arc<dyn TaskLogStore>,
        roster: Arc<AccountRoster>,
        run_config: Arc<RwLock<RunConfiguration>>,
    ) -> Self {
        Self {
            catalog: Arc::new(TaskCatalog::builtin()),
            guard: RunGuard::new(),
            executor,
            log,
            roster,
            run_config,
            notifier: Arc::new(NoopNotifier),
            config: EngineConfig::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<TaskCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn RunNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// Whether a run currently holds the single-flight slot
    pub fn is_running(&self) -> bool {
        self.guard.is_active()
    }

    /// Request cooperative cancellation of the active run, if any
    pub fn cancel(&self) {
        let active = self.guard.is_active();
        self.guard.request_cancel();
        info!(active, "Cancellation requested");
    }

    /// Validate and start a batch run.
    ///
    /// Rejections leave run state untouched and open no stream.
    pub async fn start_batch(&self, request: BatchRequest) -> RunResult<RunHandle> {
        let planned = self.catalog.plan(&request)?;
        let run_config = self.run_config.read().await.clone();
        let accounts = self.roster.resolve(&request.account_tokens).await;

        let units = accounts
            .into_iter()
            .map(|account| AccountUnit {
                account,
                steps: planned
                    .iter()
                    .map(|task| Step {
                        task_id: task.spec.id.clone(),
                        input: task.input.clone(),
                        content: run_config.content_for_task(&task.spec.id),
                    })
                    .collect(),
            })
            .collect();

        let slot = self.guard.try_claim()?;
        Ok(self.launch(RunKind::Batch, slot, units, run_config))
    }

    /// Compute a pairing assignment over the eligible accounts and start a
    /// mutual subscription run.
    pub async fn start_mutual_subscription(
        &self,
        request: MutualSubscriptionRequest,
    ) -> RunResult<RunHandle> {
        let run_config = self.run_config.read().await.clone();
        let eligible: Vec<Account> = self
            .roster
            .resolve(&request.account_tokens)
            .await
            .into_iter()
            .filter(Account::is_eligible)
            .collect();

        let assignment = {
            let mut rng = rand::thread_rng();
            assign_pairs(&eligible, request.followers_per_account, &mut rng)?
        };

        let units = assignment
            .into_pairings()
            .into_iter()
            .map(|pairing| AccountUnit {
                account: pairing.source,
                steps: vec![Step {
                    task_id: MUTUAL_SUBSCRIPTION_TASK.to_string(),
                    input: TaskInput::FollowTargets(pairing.targets),
                    content: ContentPreferences::default(),
                }],
            })
            .collect();

        let slot = self.guard.try_claim()?;
        Ok(self.launch(RunKind::MutualSubscription, slot, units, run_config))
    }

    fn launch(
        &self,
        kind: RunKind,
        slot: RunSlot,
        units: Vec<AccountUnit>,
        run_config: RunConfiguration,
    ) -> RunHandle {
        let run_id = RunId::generate();
        let total = units.len();
        let (progress_tx, progress_rx) = progress_channel(self.config.progress_buffer);

        if run_config.settings.threads > 1 {
            info!(
                threads = run_config.settings.threads,
                "THREADS is advisory, accounts run sequentially"
            );
        }

        info!(run_id = %run_id, kind = %kind, total, "Run accepted");

        let run = Run {
            run_id,
            kind,
            executor: self.executor.clone(),
            log: self.log.clone(),
            notifier: self.notifier.clone(),
            run_config,
            config: self.config.clone(),
        };

        let completion = tokio::spawn(run.execute(progress_tx, slot, units));

        RunHandle {
            run_id,
            kind,
            total,
            progress: progress_rx,
            completion,
        }
    }
}

/// Caller's view of an accepted run
#[derive(Debug)]
pub struct RunHandle {
    run_id: RunId,
    kind: RunKind,
    total: usize,
    progress: ProgressStream,
    completion: JoinHandle<EngineResult<RunSummary>>,
}

impl RunHandle {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Accounts in the run's sequence
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn progress_mut(&mut self) -> &mut ProgressStream {
        &mut self.progress
    }

    /// Keep only the progress stream; the run continues detached
    pub fn into_progress(self) -> ProgressStream {
        self.progress
    }

    /// Drain progress until the run ends, then return its outcome
    pub async fn finish(self) -> (Vec<ProgressEvent>, EngineResult<RunSummary>) {
        let events = self.progress.collect().await;
        let outcome = match self.completion.await {
            Ok(outcome) => outcome,
            Err(e) => Err(EngineError::Join(e.to_string())),
        };
        (events, outcome)
    }
}

/// One account position and the steps to run on it
#[derive(Debug)]
struct AccountUnit {
    account: Account,
    steps: Vec<Step>,
}

#[derive(Debug)]
struct Step {
    task_id: String,
    input: TaskInput,
    content: ContentPreferences,
}

#[derive(Debug, Default)]
struct Tally {
    processed: usize,
    succeeded: usize,
    failed: usize,
}

/// State owned by the spawned run task
struct Run {
    run_id: RunId,
    kind: RunKind,
    executor: Arc<dyn TaskExecutor>,
    log: Arc<dyn TaskLogStore>,
    notifier: Arc<dyn RunNotifier>,
    run_config: RunConfiguration,
    config: EngineConfig,
}

impl Run {
    // `slot` is declared after `progress` so that on unwind the slot is
    // released before the stream closes.
    async fn execute(
        self,
        mut progress: ProgressSender,
        slot: RunSlot,
        units: Vec<AccountUnit>,
    ) -> EngineResult<RunSummary> {
        let started_at = chrono::Utc::now();
        let total = units.len();
        let mut tally = Tally::default();

        let outcome = self.drive(&slot, &mut progress, units, &mut tally).await;

        drop(slot);
        drop(progress);

        let cancelled = match outcome {
            Ok(cancelled) => cancelled,
            Err(e) => {
                error!(
                    run_id = %self.run_id,
                    processed = tally.processed,
                    total,
                    error = %e,
                    "Run aborted"
                );
                return Err(e);
            }
        };

        let summary = RunSummary {
            run_id: self.run_id,
            kind: self.kind,
            total,
            processed: tally.processed,
            succeeded: tally.succeeded,
            failed: tally.failed,
            cancelled,
            started_at,
            finished_at: chrono::Utc::now(),
        };

        info!(
            run_id = %self.run_id,
            kind = %self.kind,
            processed = summary.processed,
            total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled,
            "Run finished"
        );

        self.notifier
            .notify(&summary, &self.run_config.settings)
            .await;

        Ok(summary)
    }

    /// Returns whether the loop stopped on a cancellation request
    async fn drive(
        &self,
        slot: &RunSlot,
        progress: &mut ProgressSender,
        units: Vec<AccountUnit>,
        tally: &mut Tally,
    ) -> EngineResult<bool> {
        let settings = &self.run_config.settings;
        let total = units.len();

        pacing::pause(settings.random_initialization_pause, slot).await;

        for (offset, unit) in units.into_iter().enumerate() {
            let index = offset + 1;

            if slot.is_cancelled() {
                info!(run_id = %self.run_id, processed = offset, total, "Run cancelled");
                return Ok(true);
            }

            self.process_account(slot, index, unit, tally).await?;
            tally.processed = index;

            progress.emit(ProgressEvent::new(index, total)).await;

            if index < total {
                pacing::pause(settings.random_pause_between_accounts, slot).await;
            }
        }

        Ok(false)
    }

    async fn process_account(
        &self,
        slot: &RunSlot,
        index: usize,
        unit: AccountUnit,
        tally: &mut Tally,
    ) -> EngineResult<()> {
        let AccountUnit { account, steps } = unit;
        let skip_failed = self.run_config.flow.skip_failed_tasks;
        let step_count = steps.len();

        for (n, step) in steps.into_iter().enumerate() {
            if n > 0 {
                pacing::pause(self.run_config.settings.random_pause_between_actions, slot).await;
            }

            let task_id = step.task_id.clone();
            let started = Instant::now();
            let invocation = TaskInvocation {
                task_id: step.task_id,
                account: account.clone(),
                account_index: index,
                input: step.input,
                content: step.content,
                attempt: 1,
            };

            let status = self.execute_with_retries(slot, invocation).await?;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            self.log
                .append(TaskLogEntry::new(&task_id, index, status).with_elapsed_ms(elapsed_ms))
                .await?;

            match status {
                TaskStatus::Success => tally.succeeded += 1,
                TaskStatus::Failed => tally.failed += 1,
            }

            if status == TaskStatus::Failed && skip_failed && n + 1 < step_count {
                info!(
                    run_id = %self.run_id,
                    account_index = index,
                    task = %task_id,
                    skipped = step_count - n - 1,
                    "Skipping remaining tasks for account after failure"
                );
                break;
            }
        }

        Ok(())
    }

    async fn execute_with_retries(
        &self,
        slot: &RunSlot,
        mut invocation: TaskInvocation,
    ) -> EngineResult<TaskStatus> {
        let attempts = self.run_config.settings.attempts.max(1);

        for attempt in 1..=attempts {
            invocation.attempt = attempt;

            let result =
                tokio::time::timeout(self.config.task_timeout, self.executor.execute(&invocation))
                    .await;

            match result {
                Ok(Ok(())) => {
                    debug!(
                        run_id = %self.run_id,
                        task = %invocation.task_id,
                        account_index = invocation.account_index,
                        attempt,
                        "Task succeeded"
                    );
                    return Ok(TaskStatus::Success);
                }
                Ok(Err(ExecutorError::Fatal(reason))) => {
                    return Err(EngineError::Fatal(reason));
                }
                Ok(Err(ExecutorError::Task(reason))) => {
                    warn!(
                        run_id = %self.run_id,
                        task = %invocation.task_id,
                        account_index = invocation.account_index,
                        attempt,
                        attempts,
                        reason = %reason,
                        "Task attempt failed"
                    );
                }
                Err(_) => {
                    warn!(
                        run_id = %self.run_id,
                        task = %invocation.task_id,
                        account_index = invocation.account_index,
                        attempt,
                        attempts,
                        timeout_secs = self.config.task_timeout.as_secs(),
                        "Task attempt timed out"
                    );
                }
            }

            if attempt < attempts {
                if slot.is_cancelled() {
                    break;
                }
                pacing::pause(self.run_config.settings.pause_between_attempts, slot).await;
            }
        }

        Ok(TaskStatus::Failed)
    }
}
