//! Run summary notifications

use async_trait::async_trait;
use serde::Serialize;
use taskdeck_types::{RunSummary, Settings};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Receives a summary of every finished run.
///
/// Implementations must not fail the run; delivery problems are logged.
#[async_trait]
pub trait RunNotifier: Send + Sync {
    async fn notify(&self, summary: &RunSummary, settings: &Settings);
}

/// Notifier that drops every summary
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl RunNotifier for NoopNotifier {
    async fn notify(&self, _summary: &RunSummary, _settings: &Settings) {}
}

/// Posts run summaries to Telegram chats through the Bot API
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
}

impl Default for TelegramNotifier {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// Point the notifier at a different Bot API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn is_enabled(settings: &Settings) -> bool {
        settings.send_telegram_logs
            && !settings.telegram_bot_token.trim().is_empty()
            && !settings.telegram_users_ids.is_empty()
    }

    /// Post one message. The error text never carries the request URL,
    /// which embeds the bot token.
    async fn send(&self, url: &str, chat_id: i64, text: &str) -> Result<(), String> {
        self.client
            .post(url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map(|_| ())
            .map_err(|e| e.without_url().to_string())
    }
}

#[async_trait]
impl RunNotifier for TelegramNotifier {
    async fn notify(&self, summary: &RunSummary, settings: &Settings) {
        if !Self::is_enabled(settings) {
            return;
        }

        let text = format_summary(summary);
        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base,
            settings.telegram_bot_token.trim()
        );

        for chat_id in &settings.telegram_users_ids {
            if let Err(error) = self.send(&url, *chat_id, &text).await {
                tracing::warn!(chat_id, %error, "Failed to deliver run summary");
            }
        }
    }
}

/// Plain-text run summary
pub fn format_summary(summary: &RunSummary) -> String {
    let outcome = if summary.cancelled { "cancelled" } else { "finished" };
    let duration = (summary.finished_at - summary.started_at).num_seconds();
    format!(
        "TaskDeck {} run {}\nAccounts: {}/{}\nSuccess: {}\nFailed: {}\nDuration: {}s",
        summary.kind, outcome, summary.processed, summary.total, summary.succeeded, summary.failed,
        duration
    )
}
