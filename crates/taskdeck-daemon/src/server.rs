//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::roster_import::read_roster_file;
use crate::run_config::RunConfigStore;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use taskdeck_engine::{
    AccountRoster, InMemoryTaskLog, Orchestrator, SimulatedExecutor, SimulatedValidator,
    TelegramNotifier,
};
use taskdeck_types::Account;
use tokio::net::TcpListener;

/// TaskDeck Daemon Server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let run_config = Arc::new(RunConfigStore::load(&config.run_config_path).await?);

        let accounts = match &config.roster.path {
            Some(path) => load_roster(path.clone()).await?,
            None => Vec::new(),
        };
        let roster = Arc::new(AccountRoster::new(accounts));

        let log = Arc::new(InMemoryTaskLog::new());

        let executor = SimulatedExecutor::new(config.engine.simulated_success_rate)
            .with_mutual_success_rate(config.engine.mutual_success_rate);

        let orchestrator = Orchestrator::new(
            Arc::new(executor),
            log.clone(),
            roster.clone(),
            run_config.shared(),
        )
        .with_notifier(Arc::new(TelegramNotifier::default()))
        .with_config(config.engine.engine_config());

        let state = AppState::new(Arc::new(orchestrator), roster, log, run_config)
            .with_recent_activity_limit(config.engine.recent_activity_limit)
            .with_validator(Arc::new(SimulatedValidator::new(
                config.engine.validation_ok_rate,
            )));

        Ok(Self { config, state })
    }

    /// Run the server until Ctrl+C or SIGTERM
    pub async fn run(self) -> DaemonResult<()> {
        let listener = TcpListener::bind(self.config.server.listen_addr).await?;
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `signal` resolves.
    ///
    /// An active run is cancelled as soon as the signal fires, so its stream
    /// closes and the graceful drain can finish.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> DaemonResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let app = create_router(self.state.clone(), &self.config.server);

        tracing::info!("TaskDeck daemon listening on {}", addr);
        let accounts = self.state.roster.len().await;
        tracing::info!(
            run_config = %self.state.run_config.path().display(),
            accounts = accounts,
            "Daemon ready"
        );

        let orchestrator = self.state.orchestrator.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                if orchestrator.is_running() {
                    tracing::info!("Cancelling active run before shutdown");
                    orchestrator.cancel();
                }
            })
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("TaskDeck daemon shut down");
        Ok(())
    }
}

async fn load_roster(path: PathBuf) -> DaemonResult<Vec<Account>> {
    if !tokio::fs::try_exists(&path).await? {
        tracing::warn!(path = %path.display(), "Roster file not found, starting with an empty roster");
        return Ok(Vec::new());
    }

    let accounts = {
        let path = path.clone();
        tokio::task::spawn_blocking(move || read_roster_file(&path))
            .await
            .map_err(|e| DaemonError::Server(format!("Roster loader failed: {}", e)))??
    };
    tracing::info!(path = %path.display(), accounts = accounts.len(), "Loaded roster");
    Ok(accounts)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
