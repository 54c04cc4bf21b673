//! Token bucket storage backends
//!
//! Every decision is a single atomic `take` on the store:
//! - Redis runs the whole refill-check-write sequence as a Lua script
//! - In-memory applies the same rule while holding a mutex

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::errors::RateLimitError;
use super::lua_scripts;
use super::types::{Decision, TokenBucketSettings, TokenBucketState, refill_and_take};

/// Atomic token bucket storage
#[async_trait]
pub trait TokenBucketStore: Send + Sync {
    /// Refill the bucket at `key` up to `now` and try to take one token
    async fn take(
        &self,
        key: &str,
        settings: &TokenBucketSettings,
        now: i64,
    ) -> Result<Decision, RateLimitError>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}

/// Redis-backed store, shared by every server instance
pub struct RedisTokenBucketStore {
    connection_manager: ConnectionManager,
    script: Arc<redis::Script>,
}

impl RedisTokenBucketStore {
    /// Connect to Redis and verify the connection with `PING`
    pub async fn connect(url: &str) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(url).map_err(|e| {
            warn!("Failed to create Redis client for rate limiting: {}", e);
            e
        })?;

        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            warn!(
                "Failed to create connection manager for rate limiting: {}",
                e
            );
            e
        })?;

        let mut conn = connection_manager.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| {
                warn!("Failed to ping Redis for rate limiting: {}", e);
                e
            })?;

        debug!("Connected to Redis for rate limiting");

        Ok(Self::from_connection_manager(connection_manager))
    }

    /// Use an existing connection manager, e.g. one shared with a cache
    pub fn from_connection_manager(connection_manager: ConnectionManager) -> Self {
        Self {
            connection_manager,
            script: Arc::new(redis::Script::new(lua_scripts::TOKEN_BUCKET)),
        }
    }
}

#[async_trait]
impl TokenBucketStore for RedisTokenBucketStore {
    async fn take(
        &self,
        key: &str,
        settings: &TokenBucketSettings,
        now: i64,
    ) -> Result<Decision, RateLimitError> {
        let mut conn = self.connection_manager.clone();

        let (allowed, retry_after_ms, remaining): (i64, i64, String) = self
            .script
            .key(key)
            .arg(settings.rate())
            .arg(settings.capacity())
            .arg(settings.interval_millis())
            .arg(now)
            .invoke_async(&mut conn)
            .await?;

        let remaining: f64 = remaining.parse().map_err(|_| {
            RateLimitError::unexpected_reply(format!(
                "token count '{}' is not a number",
                remaining
            ))
        })?;

        match allowed {
            1 => Ok(Decision::allowed(remaining)),
            0 => {
                let wait = u64::try_from(retry_after_ms).map_err(|_| {
                    RateLimitError::unexpected_reply(format!(
                        "negative retry delay {}",
                        retry_after_ms
                    ))
                })?;
                Ok(Decision::denied(Duration::from_millis(wait), remaining))
            }
            other => Err(RateLimitError::unexpected_reply(format!(
                "allowed flag {}",
                other
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// In-memory entry with expiration
#[derive(Debug, Clone, Copy)]
struct MemoryEntry {
    state: TokenBucketState,
    expires_at: i64,
}

/// In-memory store for development and single-instance deployments
///
/// Entries expire one interval after their last update, mirroring the Redis
/// `PEXPIRE`. Expired entries are ignored on access; `purge_expired` drops
/// them for good.
#[derive(Default)]
pub struct InMemoryTokenBucketStore {
    buckets: Mutex<HashMap<String, MemoryEntry>>,
}

impl InMemoryTokenBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop entries that expired at or before `now`, returning how many were removed
    pub async fn purge_expired(&self, now: i64) -> usize {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, entry| entry.expires_at > now);
        let removed = before - buckets.len();
        debug!(removed, "Purged expired token buckets");
        removed
    }

    /// Number of stored buckets, expired or not
    pub async fn len(&self) -> usize {
        self.buckets.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.buckets.lock().await.is_empty()
    }
}

#[async_trait]
impl TokenBucketStore for InMemoryTokenBucketStore {
    async fn take(
        &self,
        key: &str,
        settings: &TokenBucketSettings,
        now: i64,
    ) -> Result<Decision, RateLimitError> {
        let mut buckets = self.buckets.lock().await;

        let current = buckets
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.state);

        let (state, decision) = refill_and_take(current, now, settings);
        buckets.insert(
            key.to_string(),
            MemoryEntry {
                state,
                expires_at: now.saturating_add(settings.interval_millis()),
            },
        );

        Ok(decision)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
