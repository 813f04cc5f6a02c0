//! Storage module.
//!
//! Persists posted entries, per-user reactions and the last post time.

pub mod keys;
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{PostedEntry, Reaction, Reactions};

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Storage for everything the bot remembers between runs.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Records a posted entry, indexed by URL and by message id.
    async fn mark_entry_posted(&self, entry: &PostedEntry) -> AppResult<()>;

    async fn entry_by_url(&self, url: &str) -> AppResult<Option<PostedEntry>>;

    async fn entry_by_message_id(&self, message_id: i64) -> AppResult<Option<PostedEntry>>;

    /// Returns true if an entry with the given URL was posted before.
    async fn was_entry_posted(&self, url: &str) -> AppResult<bool> {
        Ok(self.entry_by_url(url).await?.is_some())
    }

    async fn reactions(&self, url: &str) -> AppResult<Reactions>;

    /// Flips a user's reaction.
    ///
    /// Pressing the same reaction twice withdraws it; pressing the other one
    /// moves the user over. A user never counts as both liking and disliking.
    async fn toggle_reaction(&self, url: &str, user_id: i64, reaction: Reaction) -> AppResult<()>;

    /// Removes every posted entry and its reactions, returning how many entries were removed.
    async fn clear_entries(&self) -> AppResult<usize>;

    async fn last_post_time(&self) -> AppResult<Option<DateTime<Utc>>>;

    async fn set_last_post_time(&self, at: DateTime<Utc>) -> AppResult<()>;

    async fn clear_last_post_time(&self) -> AppResult<()>;

    /// Connectivity probe.
    async fn ping(&self) -> AppResult<()>;
}
