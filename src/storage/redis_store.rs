//! Redis-backed entry storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::redis::{self, AsyncCommands};
use deadpool_redis::{Connection, Pool};

use crate::error::AppResult;
use crate::models::{PostedEntry, Reaction, Reactions};
use crate::storage::{keys, EntryStore};

/// Keys fetched per SCAN round trip and deleted per DEL command.
const SCAN_BATCH: usize = 500;

/// Entry storage on top of a `deadpool-redis` pool.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> AppResult<Connection> {
        Ok(self.pool.get().await?)
    }

    async fn get_entry(&self, key: &str) -> AppResult<Option<PostedEntry>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

/// Collects every key matching `pattern` without blocking the server like KEYS would.
async fn scan_keys(conn: &mut Connection, pattern: &str) -> AppResult<Vec<String>> {
    let mut cursor: u64 = 0;
    let mut found = Vec::new();

    loop {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(SCAN_BATCH)
            .query_async(&mut *conn)
            .await?;

        found.extend(keys);
        if next == 0 {
            break;
        }
        cursor = next;
    }

    // SCAN may return a key more than once
    found.sort_unstable();
    found.dedup();
    Ok(found)
}

#[async_trait]
impl EntryStore for RedisStore {
    async fn mark_entry_posted(&self, entry: &PostedEntry) -> AppResult<()> {
        let data = serde_json::to_string(entry)?;
        let mut conn = self.conn().await?;

        let () = redis::pipe()
            .atomic()
            .set(keys::entry_by_url(&entry.url), &data)
            .ignore()
            .set(keys::entry_by_message_id(entry.message_id), &data)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn entry_by_url(&self, url: &str) -> AppResult<Option<PostedEntry>> {
        self.get_entry(&keys::entry_by_url(url)).await
    }

    async fn entry_by_message_id(&self, message_id: i64) -> AppResult<Option<PostedEntry>> {
        self.get_entry(&keys::entry_by_message_id(message_id)).await
    }

    async fn was_entry_posted(&self, url: &str) -> AppResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(keys::entry_by_url(url)).await?;
        Ok(exists)
    }

    async fn reactions(&self, url: &str) -> AppResult<Reactions> {
        let mut conn = self.conn().await?;

        let (likes, dislikes): (u64, u64) = redis::pipe()
            .scard(keys::reaction_users(url, Reaction::Like))
            .scard(keys::reaction_users(url, Reaction::Dislike))
            .query_async(&mut conn)
            .await?;

        Ok(Reactions { likes, dislikes })
    }

    async fn toggle_reaction(&self, url: &str, user_id: i64, reaction: Reaction) -> AppResult<()> {
        let target = keys::reaction_users(url, reaction);
        let opposite = keys::reaction_users(url, reaction.opposite());
        let mut conn = self.conn().await?;

        let already: bool = conn.sismember(&target, user_id).await?;
        if already {
            let () = conn.srem(&target, user_id).await?;
        } else {
            // Both sets change together or not at all
            let () = redis::pipe()
                .atomic()
                .srem(&opposite, user_id)
                .ignore()
                .sadd(&target, user_id)
                .ignore()
                .query_async(&mut conn)
                .await?;
        }

        Ok(())
    }

    async fn clear_entries(&self) -> AppResult<usize> {
        let mut conn = self.conn().await?;
        let mut removed = 0;

        for pattern in keys::ENTRY_PATTERNS {
            let found = scan_keys(&mut conn, pattern).await?;
            if pattern == keys::ENTRY_BY_URL_PATTERN {
                removed = found.len();
            }

            for chunk in found.chunks(SCAN_BATCH) {
                let () = conn.del(chunk).await?;
            }
        }

        Ok(removed)
    }

    async fn last_post_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(keys::LAST_POST_TIME_KEY).await?;

        Ok(value.as_deref().and_then(|raw| {
            let parsed = keys::parse_timestamp(raw);
            if parsed.is_none() {
                tracing::warn!(value = %raw, "Ignoring unreadable last post time");
            }
            parsed
        }))
    }

    async fn set_last_post_time(&self, at: DateTime<Utc>) -> AppResult<()> {
        let mut conn = self.conn().await?;
        let () = conn.set(keys::LAST_POST_TIME_KEY, at.to_rfc3339()).await?;
        Ok(())
    }

    async fn clear_last_post_time(&self) -> AppResult<()> {
        let mut conn = self.conn().await?;
        let () = conn.del(keys::LAST_POST_TIME_KEY).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RedisStore needs a live server; only its compile-time properties are checked here.
    // Behavior shared with MemoryStore is covered by the memory store tests.

    #[test]
    fn test_redis_store_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync + 'static>() {}
        assert_traits::<RedisStore>();
    }

    #[test]
    fn test_redis_store_is_entry_store() {
        fn assert_store<T: EntryStore>() {}
        assert_store::<RedisStore>();
    }
}
