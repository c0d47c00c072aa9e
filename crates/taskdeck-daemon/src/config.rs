//! Configuration for taskdeckd

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use taskdeck_engine::EngineConfig;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Engine configuration
    #[serde(default)]
    pub engine: EngineSettings,

    /// Roster loaded at startup
    #[serde(default)]
    pub roster: RosterConfig,

    /// YAML run configuration file
    #[serde(default = "default_run_config_path")]
    pub run_config_path: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            engine: EngineSettings::default(),
            roster: RosterConfig::default(),
            run_config_path: default_run_config_path(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Timeout for non-streaming requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Orchestration engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Upper bound on one task execution attempt, in seconds
    #[serde(default = "default_task_timeout")]
    pub task_timeout_secs: u64,

    /// Undelivered progress events buffered per run
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,

    /// Entries reported in `recent_activity`
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,

    /// Success probability of the simulated executor
    #[serde(default = "default_success_rate")]
    pub simulated_success_rate: f64,

    /// Success probability of simulated mutual follows
    #[serde(default = "default_mutual_success_rate")]
    pub mutual_success_rate: f64,

    /// Probability that simulated account validation reports `ok`
    #[serde(default = "default_validation_ok_rate")]
    pub validation_ok_rate: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            task_timeout_secs: default_task_timeout(),
            progress_buffer: default_progress_buffer(),
            recent_activity_limit: default_recent_activity_limit(),
            simulated_success_rate: default_success_rate(),
            mutual_success_rate: default_mutual_success_rate(),
            validation_ok_rate: default_validation_ok_rate(),
        }
    }
}

impl EngineSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            task_timeout: Duration::from_secs(self.task_timeout_secs.max(1)),
            progress_buffer: self.progress_buffer,
        }
    }
}

/// Roster configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    /// `.xlsx` roster to load at startup
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3001))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_task_timeout() -> u64 {
    120
}

fn default_progress_buffer() -> usize {
    256
}

fn default_recent_activity_limit() -> usize {
    taskdeck_engine::statistics::DEFAULT_RECENT_LIMIT
}

fn default_success_rate() -> f64 {
    0.8
}

fn default_mutual_success_rate() -> f64 {
    0.9
}

fn default_validation_ok_rate() -> f64 {
    0.7
}

fn default_run_config_path() -> PathBuf {
    PathBuf::from("config.yaml")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and
    /// `TASKDECK_`-prefixed environment variables, in that order.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `TASKDECK_SERVER__LISTEN_ADDR`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TASKDECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
