use std::time::Duration;

use app_core::error::AppError;
use async_trait::async_trait;
use bb8_redis::{RedisConnectionManager, bb8};
use dashmap::DashMap;
use redis::AsyncCommands;
use tokio::time::Instant;

/// Short-lived storage of request-token secrets between the start of a login
/// and the identity provider's callback.
///
/// Entries expire after a fixed time-to-live and are consumed by [`take`],
/// so each request token can complete at most one login.
///
/// [`take`]: PendingTokenStore::take
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PendingTokenStore: Send + Sync {
    /// Remembers `secret` for `token`, replacing any previous value.
    async fn put(&self, token: &str, secret: &str) -> Result<(), AppError>;

    /// Removes and returns the secret for `token`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(secret))` for a known, unexpired token.
    /// * `Ok(None)` if the token is unknown, expired or already taken.
    async fn take(&self, token: &str) -> Result<Option<String>, AppError>;
}

struct PendingEntry {
    secret: String,
    created_at: Instant,
}

/// In-process store bounded both in time and in size.
pub struct MemoryPendingStore {
    entries: DashMap<String, PendingEntry>,
    ttl: Duration,
    capacity: usize,
}

impl MemoryPendingStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self { entries: DashMap::new(), ttl, capacity: capacity.max(1) }
    }

    fn is_live(&self, entry: &PendingEntry, now: Instant) -> bool {
        now.duration_since(entry.created_at) < self.ttl
    }

    fn make_room(&self, now: Instant) {
        self.entries.retain(|_, entry| self.is_live(entry, now));

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.created_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(key) => {
                    tracing::warn!("Pending login store is full, evicting the oldest request token");
                    self.entries.remove(&key);
                },
                None => break,
            }
        }
    }
}

#[async_trait]
impl PendingTokenStore for MemoryPendingStore {
    async fn put(&self, token: &str, secret: &str) -> Result<(), AppError> {
        let now = Instant::now();
        if !self.entries.contains_key(token) && self.entries.len() >= self.capacity {
            self.make_room(now);
        }

        self.entries
            .insert(token.to_string(), PendingEntry { secret: secret.to_string(), created_at: now });
        Ok(())
    }

    async fn take(&self, token: &str) -> Result<Option<String>, AppError> {
        let now = Instant::now();

        Ok(self
            .entries
            .remove(token)
            .filter(|(_, entry)| self.is_live(entry, now))
            .map(|(_, entry)| entry.secret))
    }
}

/// Redis-backed store, shared between application instances.
pub struct RedisPendingStore {
    pool: bb8::Pool<RedisConnectionManager>,
    ttl: Duration,
}

impl RedisPendingStore {
    pub fn new(pool: bb8::Pool<RedisConnectionManager>, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    fn key(token: &str) -> String {
        format!("pending_login:{token}")
    }
}

#[async_trait]
impl PendingTokenStore for RedisPendingStore {
    async fn put(&self, token: &str, secret: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(Self::key(token), secret, self.ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn take(&self, token: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.pool.get().await?;
        let secret: Option<String> = conn.get_del(Self::key(token)).await?;
        Ok(secret)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_take_returns_secret_once() {
        let store = MemoryPendingStore::new(Duration::from_secs(600), 10);

        store.put("token", "secret").await.unwrap();

        assert_eq!(store.take("token").await.unwrap().as_deref(), Some("secret"));
        assert_eq!(store.take("token").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_token() {
        let store = MemoryPendingStore::new(Duration::from_secs(600), 10);

        assert_eq!(store.take("never-issued").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryPendingStore::new(Duration::from_secs(600), 10);
        store.put("fresh", "a").await.unwrap();
        store.put("stale", "b").await.unwrap();

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(store.take("fresh").await.unwrap().as_deref(), Some("a"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.take("stale").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let store = MemoryPendingStore::new(Duration::from_secs(600), 2);

        store.put("first", "1").await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        store.put("second", "2").await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        store.put("third", "3").await.unwrap();

        assert_eq!(store.entries.len(), 2);
        assert_eq!(store.take("first").await.unwrap(), None);
        assert_eq!(store.take("second").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.take("third").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_store_drops_expired_before_evicting() {
        let store = MemoryPendingStore::new(Duration::from_secs(10), 2);

        store.put("expired", "x").await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        store.put("live", "y").await.unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        store.put("new", "z").await.unwrap();

        assert_eq!(store.take("live").await.unwrap().as_deref(), Some("y"));
        assert_eq!(store.take("new").await.unwrap().as_deref(), Some("z"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_take_has_single_winner() {
        let store = Arc::new(MemoryPendingStore::new(Duration::from_secs(600), 10));
        store.put("token", "secret").await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take("token").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
