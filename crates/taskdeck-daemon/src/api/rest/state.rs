//! Application state for API handlers

use crate::run_config::RunConfigStore;
use std::sync::Arc;
use taskdeck_engine::statistics::DEFAULT_RECENT_LIMIT;
use taskdeck_engine::{
    AccountRoster, AccountValidator, Orchestrator, SimulatedValidator, TaskLogStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Run orchestrator
    pub orchestrator: Arc<Orchestrator>,

    /// Account roster
    pub roster: Arc<AccountRoster>,

    /// Task log
    pub log: Arc<dyn TaskLogStore>,

    /// Live run configuration
    pub run_config: Arc<RunConfigStore>,

    /// Account status checks
    pub validator: Arc<dyn AccountValidator>,

    /// Entries reported in `recent_activity`
    pub recent_activity_limit: usize,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        roster: Arc<AccountRoster>,
        log: Arc<dyn TaskLogStore>,
        run_config: Arc<RunConfigStore>,
    ) -> Self {
        Self {
            orchestrator,
            roster,
            log,
            run_config,
            validator: Arc::new(SimulatedValidator::default()),
            recent_activity_limit: DEFAULT_RECENT_LIMIT,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn with_recent_activity_limit(mut self, limit: usize) -> Self {
        self.recent_activity_limit = limit;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn AccountValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
