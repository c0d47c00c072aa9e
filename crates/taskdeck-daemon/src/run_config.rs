//! YAML-backed run configuration

use crate::error::RunConfigError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskdeck_types::RunConfiguration;
use tokio::sync::RwLock;

/// Holds the live run configuration and its backing file.
///
/// The orchestrator shares the inner lock and snapshots it when a run starts,
/// so an update never changes a run already in flight.
#[derive(Debug)]
pub struct RunConfigStore {
    path: PathBuf,
    current: Arc<RwLock<RunConfiguration>>,
}

impl RunConfigStore {
    /// Read and validate `path`. A missing file yields the defaults.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, RunConfigError> {
        let path = path.into();

        let config = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let config: RunConfiguration = serde_yaml::from_str(&raw)?;
                config.validate()?;
                tracing::info!(path = %path.display(), "Loaded run configuration");
                config
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Run configuration not found, using defaults");
                RunConfiguration::default()
            }
            Err(source) => {
                return Err(RunConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Ok(Self::new(path, config))
    }

    pub fn new(path: impl Into<PathBuf>, config: RunConfiguration) -> Self {
        Self {
            path: path.into(),
            current: Arc::new(RwLock::new(config)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock shared with the orchestrator
    pub fn shared(&self) -> Arc<RwLock<RunConfiguration>> {
        self.current.clone()
    }

    pub async fn get(&self) -> RunConfiguration {
        self.current.read().await.clone()
    }

    /// Validate, persist, then swap in `config`.
    ///
    /// A rejected or unwritable configuration leaves the live one unchanged.
    pub async fn update(&self, config: RunConfiguration) -> Result<RunConfiguration, RunConfigError> {
        config.validate()?;

        let yaml = serde_yaml::to_string(&config)?;
        let mut current = self.current.write().await;

        tokio::fs::write(&self.path, yaml)
            .await
            .map_err(|source| RunConfigError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        *current = config.clone();
        tracing::info!(path = %self.path.display(), "Run configuration updated");

        Ok(config)
    }
}
