//! TaskDeck Daemon - per-account task orchestration service
//!
//! The TaskDeck daemon provides:
//! - Batch runs of catalog tasks across an account sequence
//! - Mutual subscription runs over the eligible roster
//! - Line-delimited progress streaming
//! - Task log statistics and spreadsheet export

use clap::Parser;
use std::path::PathBuf;
use taskdeck_daemon::{DaemonConfig, DaemonError, DaemonResult, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// TaskDeck Daemon CLI
#[derive(Parser)]
#[command(name = "taskdeckd")]
#[command(about = "TaskDeck Daemon - per-account task orchestration service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TASKDECK_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "TASKDECK_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "TASKDECK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "TASKDECK_LOG_JSON")]
    json: bool,

    /// Roster workbook loaded at startup
    #[arg(long, env = "TASKDECK_ROSTER_PATH")]
    roster: Option<PathBuf>,

    /// YAML run configuration file
    #[arg(long, env = "TASKDECK_RUN_CONFIG")]
    run_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }
    if let Some(roster) = cli.roster {
        config.roster.path = Some(roster);
    }
    if let Some(run_config) = cli.run_config {
        config.run_config_path = run_config;
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    println!(
        r#"
  TaskDeck - per-account task orchestration
  Version: {}
  Listening: {}
  Run config: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.server.listen_addr,
        config.run_config_path.display()
    );

    let server = Server::new(config).await?;
    server.run().await
}
