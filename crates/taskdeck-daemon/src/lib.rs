//! TaskDeck Daemon library
//!
//! This module provides the core components for the TaskDeck daemon:
//! - REST API handlers and progress streaming
//! - Roster import and task log export
//! - YAML run configuration store
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod roster_import;
pub mod run_config;
pub mod server;

pub use api::{create_router, AppState};
pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, DaemonResult, ExportError, RosterImportError, RunConfigError};
pub use run_config::RunConfigStore;
pub use server::Server;
