//! # TaskDeck Engine
//!
//! Single-flight orchestration of per-account task runs.
//!
//! ## Overview
//!
//! The [`Orchestrator`] accepts at most one run at a time, either a batch of
//! catalog tasks or a mutual subscription pass, and drives it sequentially
//! over an ordered account sequence. For every account it:
//!
//! - Executes each planned task through a pluggable [`TaskExecutor`]
//! - Appends one [`TaskLogEntry`](taskdeck_types::TaskLogEntry) per outcome
//! - Emits one progress event on the run's [`ProgressStream`]
//!
//! Cancellation is cooperative and observed between accounts.
//! [`statistics::aggregate`] reduces the task log to per-task breakdowns.
//!
//! ## Key Components
//!
//! - [`RunGuard`]: Single-flight slot and cancellation flag
//! - [`TaskCatalog`]: Known tasks and request planning
//! - [`assign_pairs`]: Follow-target assignment for mutual subscription
//! - [`TaskLogStore`]: Append-only outcome log
//! - [`RunNotifier`]: Run summary delivery
//! - [`AccountValidator`]: Account status checks

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod catalog;
pub mod error;
pub mod executor;
pub mod guard;
pub mod log;
pub mod notify;
pub mod orchestrator;
pub mod pacing;
pub mod pairing;
pub mod progress;
pub mod roster;
pub mod selection;
pub mod statistics;
pub mod validator;

pub use catalog::{PlannedTask, TaskCatalog, MUTUAL_SUBSCRIPTION_TASK};
pub use error::{EngineError, EngineResult, ExecutorError, LogStoreError, RunError, RunResult};
pub use executor::{SimulatedExecutor, TaskExecutor, TaskInvocation};
pub use guard::{RunGuard, RunSlot};
pub use log::{InMemoryTaskLog, LogResult, TaskLogStore};
pub use notify::{NoopNotifier, RunNotifier, TelegramNotifier};
pub use orchestrator::{EngineConfig, Orchestrator, RunHandle};
pub use pairing::{assign_pairs, Pairing, PairingAssignment};
pub use progress::{progress_channel, ProgressSender, ProgressStream};
pub use roster::AccountRoster;
pub use selection::select_accounts;
pub use statistics::{aggregate, RecentActivity, Statistics, TaskBreakdown};
pub use validator::{AccountCheck, AccountValidator, SimulatedValidator};
