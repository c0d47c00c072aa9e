//! Append-only task log store

use crate::error::LogStoreError;
use async_trait::async_trait;
use std::sync::Arc;
use taskdeck_types::TaskLogEntry;
use tokio::sync::RwLock;

/// Result type for log store operations
pub type LogResult<T> = Result<T, LogStoreError>;

/// Append-only sequence of execution outcomes
#[async_trait]
pub trait TaskLogStore: Send + Sync {
    /// Append one entry at the end of the log
    async fn append(&self, entry: TaskLogEntry) -> LogResult<()>;

    /// Consistent copy of the whole log, oldest first
    async fn snapshot(&self) -> LogResult<Vec<TaskLogEntry>>;

    /// Most recent `limit` entries, newest first
    async fn recent(&self, limit: usize) -> LogResult<Vec<TaskLogEntry>>;

    /// Number of stored entries
    async fn len(&self) -> LogResult<usize>;
}

/// Volatile log kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct InMemoryTaskLog {
    entries: Arc<RwLock<Vec<TaskLogEntry>>>,
}

impl InMemoryTaskLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskLogStore for InMemoryTaskLog {
    async fn append(&self, entry: TaskLogEntry) -> LogResult<()> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }

    async fn snapshot(&self) -> LogResult<Vec<TaskLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.clone())
    }

    async fn recent(&self, limit: usize) -> LogResult<Vec<TaskLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn len(&self) -> LogResult<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_types::TaskStatus;

    #[tokio::test]
    async fn test_append_and_snapshot_order() {
        let log = InMemoryTaskLog::new();
        for i in 1..=3 {
            log.append(TaskLogEntry::new("like", i, TaskStatus::Success))
                .await
                .unwrap();
        }

        let snapshot = log.snapshot().await.unwrap();
        let indices: Vec<_> = snapshot.iter().map(|e| e.account_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(log.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let log = InMemoryTaskLog::new();
        for i in 1..=5 {
            log.append(TaskLogEntry::new("like", i, TaskStatus::Failed))
                .await
                .unwrap();
        }

        let recent = log.recent(2).await.unwrap();
        let indices: Vec<_> = recent.iter().map(|e| e.account_index).collect();
        assert_eq!(indices, vec![5, 4]);
        assert!(log.recent(0).await.unwrap().is_empty());
    }
}
