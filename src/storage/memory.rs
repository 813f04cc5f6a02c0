//! In-process entry storage.
//!
//! Used for dry runs and tests; nothing survives a restart.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::models::{PostedEntry, Reaction, Reactions};
use crate::storage::EntryStore;

#[derive(Default)]
struct Inner {
    by_url: HashMap<String, PostedEntry>,
    by_message_id: HashMap<i64, PostedEntry>,
    reactions: HashMap<(String, Reaction), HashSet<i64>>,
    last_post_time: Option<DateTime<Utc>>,
}

impl Inner {
    fn count(&self, url: &str, reaction: Reaction) -> u64 {
        self.reactions
            .get(&(url.to_string(), reaction))
            .map_or(0, |users| users.len() as u64)
    }
}

/// Entry storage kept in memory behind an async mutex.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn mark_entry_posted(&self, entry: &PostedEntry) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        inner.by_url.insert(entry.url.clone(), entry.clone());
        inner.by_message_id.insert(entry.message_id, entry.clone());
        Ok(())
    }

    async fn entry_by_url(&self, url: &str) -> AppResult<Option<PostedEntry>> {
        Ok(self.inner.lock().await.by_url.get(url).cloned())
    }

    async fn entry_by_message_id(&self, message_id: i64) -> AppResult<Option<PostedEntry>> {
        Ok(self.inner.lock().await.by_message_id.get(&message_id).cloned())
    }

    async fn reactions(&self, url: &str) -> AppResult<Reactions> {
        let inner = self.inner.lock().await;
        Ok(Reactions {
            likes: inner.count(url, Reaction::Like),
            dislikes: inner.count(url, Reaction::Dislike),
        })
    }

    async fn toggle_reaction(&self, url: &str, user_id: i64, reaction: Reaction) -> AppResult<()> {
        let mut inner = self.inner.lock().await;

        let target = inner
            .reactions
            .entry((url.to_string(), reaction))
            .or_default();
        if target.remove(&user_id) {
            return Ok(());
        }
        target.insert(user_id);

        if let Some(opposite) = inner
            .reactions
            .get_mut(&(url.to_string(), reaction.opposite()))
        {
            opposite.remove(&user_id);
        }
        Ok(())
    }

    async fn clear_entries(&self) -> AppResult<usize> {
        let mut inner = self.inner.lock().await;
        let removed = inner.by_url.len();
        inner.by_url.clear();
        inner.by_message_id.clear();
        inner.reactions.clear();
        Ok(removed)
    }

    async fn last_post_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.inner.lock().await.last_post_time)
    }

    async fn set_last_post_time(&self, at: DateTime<Utc>) -> AppResult<()> {
        self.inner.lock().await.last_post_time = Some(at);
        Ok(())
    }

    async fn clear_last_post_time(&self) -> AppResult<()> {
        self.inner.lock().await.last_post_time = None;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
