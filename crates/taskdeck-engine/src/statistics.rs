//! Summary counters reduced from the task log

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taskdeck_types::{TaskLogEntry, TaskStatus};

/// Default number of entries in `recent_activity`
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Aggregated view of the task log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_tasks: usize,

    /// Percentage of successful entries, rounded; 0 for an empty log
    pub success_rate: u32,

    /// 1 while a run is active, else 0
    pub active_sessions: u32,

    /// Mean `elapsed_ms` over all entries; 0 for an empty log
    pub avg_response_time_ms: u64,

    pub task_stats: BTreeMap<String, TaskBreakdown>,

    /// Newest entries first
    pub recent_activity: Vec<RecentActivity>,
}

impl Statistics {
    pub fn with_active_sessions(mut self, active_sessions: u32) -> Self {
        self.active_sessions = active_sessions;
        self
    }
}

/// Per-task counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub task: String,
    pub account_index: usize,
    pub status: TaskStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<&TaskLogEntry> for RecentActivity {
    fn from(entry: &TaskLogEntry) -> Self {
        Self {
            task: entry.task.clone(),
            account_index: entry.account_index,
            status: entry.status,
            timestamp: entry.timestamp,
        }
    }
}

/// `round(100 * success / total)`, or 0 when `total == 0`
pub fn success_rate(success: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (success as f64 / total as f64 * 100.0).round() as u32
}

/// Reduce a log snapshot (oldest first) into statistics
pub fn aggregate(entries: &[TaskLogEntry], recent_limit: usize) -> Statistics {
    let mut task_stats: BTreeMap<String, TaskBreakdown> = BTreeMap::new();
    let mut successes = 0;
    let mut elapsed_total: u128 = 0;

    for entry in entries {
        let breakdown = task_stats.entry(entry.task.clone()).or_default();
        breakdown.total += 1;
        match entry.status {
            TaskStatus::Success => {
                breakdown.success += 1;
                successes += 1;
            }
            TaskStatus::Failed => breakdown.failed += 1,
        }
        elapsed_total += u128::from(entry.elapsed_ms);
    }

    let avg_response_time_ms = if entries.is_empty() {
        0
    } else {
        (elapsed_total / entries.len() as u128) as u64
    };

    Statistics {
        total_tasks: entries.len(),
        success_rate: success_rate(successes, entries.len()),
        active_sessions: 0,
        avg_response_time_ms,
        task_stats,
        recent_activity: entries
            .iter()
            .rev()
            .take(recent_limit)
            .map(RecentActivity::from)
            .collect(),
    }
}
