//! Long polling for reaction button presses.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::bot::service::RssBot;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::telegram::Update;

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Server-side long poll timeout.
    pub timeout_secs: u64,
    /// Pause after a failed poll.
    pub retry_delay: Duration,
}

impl PollSettings {
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.poll_timeout_secs,
            retry_delay: Duration::from_secs(config.poll_retry_secs),
        }
    }

    /// Pause before polling again after `error`; a rate limit sets its own.
    pub fn delay_after(&self, error: &AppError) -> Duration {
        error.retry_after().unwrap_or(self.retry_delay)
    }
}

/// Offset acknowledging every update received so far.
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .max(current)
}

/// Polls for callback queries and dispatches them to the bot until shutdown.
pub async fn run_polling(bot: Arc<RssBot>, settings: PollSettings, mut shutdown: watch::Receiver<bool>) {
    tracing::info!(timeout_secs = settings.timeout_secs, "Started polling for updates");
    let chat = Arc::clone(bot.chat());
    let mut offset: Option<i64> = None;

    loop {
        let result = tokio::select! {
            result = chat.get_updates(offset, settings.timeout_secs) => result,
            _ = shutdown.changed() => {
                tracing::info!("Update polling stopped");
                return;
            }
        };

        let updates = match result {
            Ok(updates) => updates,
            Err(e) => {
                let delay = settings.delay_after(&e);
                if e.is_transient() {
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = delay.as_secs(),
                        "Failed to fetch updates"
                    );
                } else {
                    tracing::error!(error = %e, "Bot API rejected getUpdates");
                    sentry::capture_error(&e);
                }
                tokio::select! {
                    () = tokio::time::sleep(delay) => continue,
                    _ = shutdown.changed() => {
                        tracing::info!("Update polling stopped");
                        return;
                    }
                }
            }
        };

        offset = next_offset(offset, &updates);

        for update in updates {
            let Some(query) = update.callback_query else {
                continue;
            };
            if let Err(e) = bot.handle_callback(&query).await {
                tracing::error!(
                    error = %e,
                    update_id = update.update_id,
                    "Failed to handle callback query"
                );
                sentry::capture_error(&e);
            }
        }
    }
}
