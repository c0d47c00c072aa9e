//! Typed run configuration
//!
//! Field names follow the operator-facing YAML layout:
//!
//! ```yaml
//! SETTINGS:
//!   THREADS: 1
//!   ATTEMPTS: 5
//!   ACCOUNTS_RANGE: [0, 0]
//!   RANDOM_PAUSE_BETWEEN_ACCOUNTS: [3, 10]
//! FLOW:
//!   SKIP_FAILED_TASKS: false
//! ```

use crate::task::ContentPreferences;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Run configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("THREADS must be at least 1, got {0}")]
    InvalidThreads(u32),

    #[error("ATTEMPTS must be at least 1, got {0}")]
    InvalidAttempts(u32),

    #[error("{name} must satisfy min <= max, got [{min}, {max}]")]
    InvalidPauseRange {
        name: &'static str,
        min: u64,
        max: u64,
    },

    #[error("{name} may not exceed {limit}s, got {max}s")]
    PauseTooLong {
        name: &'static str,
        max: u64,
        limit: u64,
    },

    #[error("ACCOUNTS_RANGE must satisfy start <= end, got [{start}, {end}]")]
    InvalidAccountRange { start: usize, end: usize },

    #[error("EXACT_ACCOUNTS_TO_USE indices are 1-based, got 0")]
    ZeroExactAccount,
}

/// Tunable parameters read by a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RunConfiguration {
    pub settings: Settings,
    pub flow: FlowSettings,
    pub tweets: TweetSettings,
    pub comments: CommentSettings,
    pub others: OtherSettings,
}

impl RunConfiguration {
    /// Check every invariant of the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let s = &self.settings;
        if s.threads < 1 {
            return Err(ConfigValidationError::InvalidThreads(s.threads));
        }
        if s.attempts < 1 {
            return Err(ConfigValidationError::InvalidAttempts(s.attempts));
        }

        for (name, range) in [
            ("PAUSE_BETWEEN_ATTEMPTS", s.pause_between_attempts),
            ("RANDOM_PAUSE_BETWEEN_ACCOUNTS", s.random_pause_between_accounts),
            ("RANDOM_PAUSE_BETWEEN_ACTIONS", s.random_pause_between_actions),
            ("RANDOM_INITIALIZATION_PAUSE", s.random_initialization_pause),
        ] {
            if !range.is_valid() {
                return Err(ConfigValidationError::InvalidPauseRange {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
            if range.max > PauseRange::MAX_SECS {
                return Err(ConfigValidationError::PauseTooLong {
                    name,
                    max: range.max,
                    limit: PauseRange::MAX_SECS,
                });
            }
        }

        if !s.accounts_range.is_all() && s.accounts_range.start > s.accounts_range.end {
            return Err(ConfigValidationError::InvalidAccountRange {
                start: s.accounts_range.start,
                end: s.accounts_range.end,
            });
        }

        if s.exact_accounts_to_use.contains(&0) {
            return Err(ConfigValidationError::ZeroExactAccount);
        }

        Ok(())
    }

    /// Configuration with every pause set to zero
    pub fn without_pauses() -> Self {
        let mut config = Self::default();
        config.settings.pause_between_attempts = PauseRange::ZERO;
        config.settings.random_pause_between_accounts = PauseRange::ZERO;
        config.settings.random_pause_between_actions = PauseRange::ZERO;
        config.settings.random_initialization_pause = PauseRange::ZERO;
        config
    }

    /// Content flags that apply to `task_id`
    pub fn content_for_task(&self, task_id: &str) -> ContentPreferences {
        if task_id.starts_with("tweet") || task_id.starts_with("quote") {
            ContentPreferences {
                random_text: self.tweets.random_text_for_tweets,
                random_picture: self.tweets.random_picture_for_tweets,
            }
        } else if task_id.starts_with("comment") {
            ContentPreferences {
                random_text: self.comments.random_text_for_comments,
                random_picture: self.comments.random_picture_for_comments,
            }
        } else {
            ContentPreferences::default()
        }
    }
}

/// General run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    /// Intended concurrency; advisory, runs execute sequentially
    pub threads: u32,

    /// Attempts per task execution
    pub attempts: u32,

    /// 1-based inclusive account range, `[0, 0]` selects everything
    pub accounts_range: AccountRange,

    /// 1-based account indices, overriding `accounts_range` when non-empty
    pub exact_accounts_to_use: Vec<usize>,

    pub shuffle_accounts: bool,
    pub pause_between_attempts: PauseRange,
    pub random_pause_between_accounts: PauseRange,
    pub random_pause_between_actions: PauseRange,
    pub random_initialization_pause: PauseRange,

    pub send_telegram_logs: bool,
    pub send_only_summary: bool,
    pub telegram_bot_token: String,
    pub telegram_users_ids: Vec<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: 1,
            attempts: 5,
            accounts_range: AccountRange::ALL,
            exact_accounts_to_use: Vec::new(),
            shuffle_accounts: true,
            pause_between_attempts: PauseRange::new(3, 10),
            random_pause_between_accounts: PauseRange::new(3, 10),
            random_pause_between_actions: PauseRange::new(3, 10),
            random_initialization_pause: PauseRange::new(3, 10),
            send_telegram_logs: false,
            send_only_summary: false,
            telegram_bot_token: String::new(),
            telegram_users_ids: Vec::new(),
        }
    }
}

/// Flow control settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FlowSettings {
    /// Skip an account's remaining tasks after its first failure
    pub skip_failed_tasks: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TweetSettings {
    pub random_text_for_tweets: bool,
    pub random_picture_for_tweets: bool,
}

impl Default for TweetSettings {
    fn default() -> Self {
        Self {
            random_text_for_tweets: false,
            random_picture_for_tweets: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CommentSettings {
    pub random_text_for_comments: bool,
    pub random_picture_for_comments: bool,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            random_text_for_comments: false,
            random_picture_for_comments: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OtherSettings {
    pub ssl_verification: bool,
}

/// `[min, max]` pause in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct PauseRange {
    pub min: u64,
    pub max: u64,
}

impl PauseRange {
    pub const ZERO: PauseRange = PauseRange { min: 0, max: 0 };

    /// Longest accepted pause, one day
    pub const MAX_SECS: u64 = 86_400;

    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn is_zero(&self) -> bool {
        self.max == 0
    }

    pub fn min_duration(&self) -> Duration {
        Duration::from_secs(self.min)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max)
    }
}

impl From<[u64; 2]> for PauseRange {
    fn from([min, max]: [u64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<PauseRange> for [u64; 2] {
    fn from(range: PauseRange) -> Self {
        [range.min, range.max]
    }
}

/// 1-based inclusive `[start, end]` account range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct AccountRange {
    pub start: usize,
    pub end: usize,
}

impl AccountRange {
    pub const ALL: AccountRange = AccountRange { start: 0, end: 0 };

    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `[0, 0]` means "every account"
    pub fn is_all(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

impl From<[usize; 2]> for AccountRange {
    fn from([start, end]: [usize; 2]) -> Self {
        Self { start, end }
    }
}

impl From<AccountRange> for [usize; 2] {
    fn from(range: AccountRange) -> Self {
        [range.start, range.end]
    }
}
