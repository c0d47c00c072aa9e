//! TaskDeck Types - Core types for per-account task orchestration
//!
//! TaskDeck runs batches of automated actions ("tasks") across a roster of
//! accounts, streams progress while a batch is in flight and keeps a log of
//! every outcome for later aggregation.
//!
//! ## Key Concepts
//!
//! - **Account**: A roster entry, identified by its auth token
//! - **TaskSpec**: Catalog entry describing one task kind and its input shape
//! - **BatchRequest**: Which tasks to run, with which inputs, on which accounts
//! - **ProgressEvent**: `(current, total)` milestone emitted once per account
//! - **TaskLogEntry**: One recorded outcome of a task on an account
//! - **RunConfiguration**: Tunable pacing, retry and selection parameters

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod account;
pub mod config;
pub mod ids;
pub mod run;
pub mod task;

// Re-export main types
pub use account::{Account, AccountStatus};
pub use config::{
    AccountRange, CommentSettings, ConfigValidationError, FlowSettings, OtherSettings, PauseRange,
    RunConfiguration, Settings, TweetSettings,
};
pub use ids::RunId;
pub use run::{
    BatchRequest, MutualSubscriptionRequest, ProgressEvent, RunKind, RunSummary, StreamMessage,
};
pub use task::{ContentPreferences, InputShape, TaskInput, TaskLogEntry, TaskSpec, TaskStatus};
