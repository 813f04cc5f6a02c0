//! Posting feed entries and handling reactions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::feed::{Blacklist, FeedSource};
use crate::models::{FeedEntry, PostedEntry, Reaction, Reactions};
use crate::storage::EntryStore;
use crate::telegram::{entry_keyboard, CallbackQuery, ChatClient};
use crate::utils::{escape_attr, escape_html};

/// Longest rate limit pause a post waits out before giving up on the run.
const MAX_POST_RETRY_WAIT: Duration = Duration::from_secs(60);

/// What the bot posts and where.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub feed_title: String,
    pub chat_id: String,
    pub open_button_text: String,
    pub blacklist: Blacklist,
}

impl BotSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            feed_title: config.feed_title.clone(),
            chat_id: config.chat_id.clone(),
            open_button_text: config.open_button_text.clone(),
            blacklist: Blacklist::new(
                config.blacklist_words.clone(),
                config.blacklist_urls.clone(),
            ),
        }
    }
}

/// Result of one feed update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Entries present in the feed.
    pub received: usize,
    /// Entries eligible for posting.
    pub collected: usize,
    /// The entry posted by this update, if any.
    pub posted: Option<PostedEntry>,
}

/// Formats the HTML message announcing an entry.
pub fn format_entry_message(feed_title: &str, entry: &FeedEntry) -> String {
    format!(
        "<b>[{}]</b>\n<a href=\"{}\">{}</a>",
        escape_html(feed_title),
        escape_attr(&entry.link),
        escape_html(&entry.title)
    )
}

/// The RSS bot: reads the feed, posts entries and keeps reaction counters.
pub struct RssBot {
    store: Arc<dyn EntryStore>,
    chat: Arc<dyn ChatClient>,
    feed: Arc<dyn FeedSource>,
    settings: BotSettings,
}

impl RssBot {
    pub fn new(
        store: Arc<dyn EntryStore>,
        chat: Arc<dyn ChatClient>,
        feed: Arc<dyn FeedSource>,
        settings: BotSettings,
    ) -> Self {
        Self {
            store,
            chat,
            feed,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn EntryStore> {
        &self.store
    }

    pub fn chat(&self) -> &Arc<dyn ChatClient> {
        &self.chat
    }

    pub const fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Reads the feed and posts the first new entry to the chat.
    ///
    /// At most one entry is posted per update; the rest wait for later runs.
    pub async fn update(&self) -> AppResult<UpdateOutcome> {
        tracing::info!("Started feed update");

        let entries = self.feed.fetch().await?;
        let received = entries.len();
        tracing::info!(
            feed = %self.feed.location(),
            received,
            "Received {received} entries"
        );

        let collected = self.collect_entries(entries).await?;
        tracing::info!("Collected {} entries to post", collected.len());

        let mut outcome = UpdateOutcome {
            received,
            collected: collected.len(),
            posted: None,
        };

        // No entries - no message
        let Some(selected) = collected.into_iter().next() else {
            return Ok(outcome);
        };

        tracing::info!(url = %selected.link, "Posting entry");
        let text = format_entry_message(&self.settings.feed_title, &selected);
        let markup = entry_keyboard(
            &self.settings.open_button_text,
            &selected.link,
            Reactions::default(),
        );
        let message = match self
            .chat
            .send_message(&self.settings.chat_id, &text, &markup)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                // Retry once if the wait fits, otherwise the entry waits for the next run
                let Some(wait) = e.retry_after().filter(|w| *w <= MAX_POST_RETRY_WAIT) else {
                    return Err(e);
                };
                tracing::warn!(
                    retry_after_secs = wait.as_secs(),
                    "Rate limited while posting, retrying"
                );
                tokio::time::sleep(wait).await;
                self.chat
                    .send_message(&self.settings.chat_id, &text, &markup)
                    .await?
            }
        };

        tracing::info!(
            message_id = message.message_id,
            "Message sent, marking the entry as posted"
        );
        let posted = PostedEntry {
            url: selected.link,
            message_id: message.message_id,
            message_text: text,
        };
        self.store.mark_entry_posted(&posted).await?;
        self.store.set_last_post_time(Utc::now()).await?;

        outcome.posted = Some(posted);
        Ok(outcome)
    }

    /// Drops entries that were posted before or hit the blacklist, keeping feed order.
    async fn collect_entries(&self, entries: Vec<FeedEntry>) -> AppResult<Vec<FeedEntry>> {
        let blacklist = &self.settings.blacklist;
        let mut collected = Vec::new();

        for entry in entries {
            if self.store.was_entry_posted(&entry.link).await? {
                continue;
            }

            if blacklist.contains_blacklisted_words(&entry.title) {
                tracing::info!("Title \"{}\" contains blacklisted words, skipping", entry.title);
                continue;
            }

            if blacklist.is_blacklisted_url(&entry.link) {
                tracing::info!("URL \"{}\" is blacklisted, skipping", entry.link);
                continue;
            }

            collected.push(entry);
        }

        Ok(collected)
    }

    /// Handles a press on a like/dislike button.
    pub async fn handle_callback(&self, query: &CallbackQuery) -> AppResult<()> {
        // Stop the button spinner even if the press turns out to be ignored
        if let Err(e) = self.chat.answer_callback_query(&query.id).await {
            tracing::warn!(error = %e, query_id = %query.id, "Failed to answer callback query");
        }

        let Some(reaction) = query
            .data
            .as_deref()
            .and_then(|data| data.parse::<Reaction>().ok())
        else {
            tracing::debug!(data = ?query.data, "Ignoring callback query with unknown data");
            return Ok(());
        };

        let user = &query.from;
        let Some(message_id) = query.message.as_ref().map(|m| m.message_id) else {
            tracing::info!(
                "{reaction} query from user \"{}\" (id {}) without a message",
                user.full_name(),
                user.id
            );
            return Ok(());
        };

        let Some(entry) = self.store.entry_by_message_id(message_id).await? else {
            tracing::info!(
                "{reaction} query from user \"{}\" (id {}) for unknown post (message id {message_id})",
                user.full_name(),
                user.id
            );
            return Ok(());
        };

        tracing::info!(
            "{reaction} query from user \"{}\" (id {}) for post \"{}\" (message id {message_id})",
            user.full_name(),
            user.id,
            entry.url
        );

        self.store
            .toggle_reaction(&entry.url, user.id, reaction)
            .await?;
        self.refresh_entry_message(&entry).await
    }

    /// Re-renders the keyboard of a posted entry with current counters.
    async fn refresh_entry_message(&self, entry: &PostedEntry) -> AppResult<()> {
        let reactions = self.store.reactions(&entry.url).await?;
        let markup = entry_keyboard(&self.settings.open_button_text, &entry.url, reactions);

        self.chat
            .edit_message_reply_markup(&self.settings.chat_id, entry.message_id, &markup)
            .await
    }

    /// Removes all info about posted entries from the storage.
    pub async fn clear(&self) -> AppResult<usize> {
        let removed = self.store.clear_entries().await?;
        self.store.clear_last_post_time().await?;
        tracing::info!("Removed {removed} entries");
        Ok(removed)
    }
}
