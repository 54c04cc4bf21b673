//! Token Bucket Rate Limiter
//!
//! Tokens refill continuously at `rate` per `interval` up to a capacity of
//! `rate`, and every admitted request consumes one. Refill is computed lazily
//! when a request arrives; nothing runs in the background.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::clock::{Clock, SystemClock};
use super::errors::RateLimitError;
use super::storage::TokenBucketStore;
use super::types::{Decision, TokenBucketSettings, bucket_key};

/// Default bound on a single store round trip
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Admission control for a caller identity
#[async_trait]
pub trait Limiter: Send + Sync {
    /// Decide whether `identity` may perform one more request
    ///
    /// An `Err` means the decision could not be made and is distinct from a
    /// denial; callers treat it as a failed check, never as an implicit allow.
    async fn allow(&self, identity: &str) -> Result<Decision, RateLimitError>;
}

/// Token bucket rate limiter over a [`TokenBucketStore`]
pub struct TokenBucket {
    store: Arc<dyn TokenBucketStore>,
    key_prefix: String,
    settings: TokenBucketSettings,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl TokenBucket {
    /// Create a limiter storing buckets under `key_prefix:identity`
    ///
    /// # Errors
    /// Returns [`RateLimitError::InvalidConfig`] for an empty prefix.
    pub fn new(
        store: Arc<dyn TokenBucketStore>,
        key_prefix: &str,
        settings: TokenBucketSettings,
    ) -> Result<Self, RateLimitError> {
        if key_prefix.trim().is_empty() {
            return Err(RateLimitError::invalid_config("key prefix must not be empty"));
        }

        Ok(Self {
            store,
            key_prefix: key_prefix.to_string(),
            settings,
            clock: Arc::new(SystemClock),
            timeout: DEFAULT_STORE_TIMEOUT,
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Bound every store round trip by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn settings(&self) -> &TokenBucketSettings {
        &self.settings
    }
}

#[async_trait]
impl Limiter for TokenBucket {
    async fn allow(&self, identity: &str) -> Result<Decision, RateLimitError> {
        let key = bucket_key(&self.key_prefix, identity);
        let now = self.clock.now_millis();

        let outcome =
            tokio::time::timeout(self.timeout, self.store.take(&key, &self.settings, now)).await;

        let decision = match outcome {
            Ok(Ok(decision)) => decision,
            Ok(Err(e)) => {
                error!(
                    key = %key,
                    backend = self.store.backend(),
                    error = %e,
                    "Token bucket check failed"
                );
                return Err(e);
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                error!(
                    key = %key,
                    backend = self.store.backend(),
                    timeout_ms,
                    "Token bucket check timed out"
                );
                return Err(RateLimitError::Timeout { key, timeout_ms });
            }
        };

        if decision.allowed {
            debug!(
                key = %key,
                remaining = decision.remaining,
                "Rate limit check passed"
            );
        } else {
            warn!(
                key = %key,
                retry_after_ms = u64::try_from(decision.retry_after.as_millis()).unwrap_or(u64::MAX),
                "Rate limit exceeded"
            );
        }

        Ok(decision)
    }
}

/// Limiter that admits everything, used when rate limiting is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

#[async_trait]
impl Limiter for Unlimited {
    async fn allow(&self, _identity: &str) -> Result<Decision, RateLimitError> {
        Ok(Decision::allowed(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rate_limiter::clock::ManualClock;
    use crate::infrastructure::rate_limiter::storage::InMemoryTokenBucketStore;

    struct StalledStore;

    #[async_trait]
    impl TokenBucketStore for StalledStore {
        async fn take(
            &self,
            _key: &str,
            _settings: &TokenBucketSettings,
            _now: i64,
        ) -> Result<Decision, RateLimitError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Decision::allowed(0.0))
        }

        fn backend(&self) -> &'static str {
            "stalled"
        }
    }

    struct FailingStore;

    #[async_trait]
    impl TokenBucketStore for FailingStore {
        async fn take(
            &self,
            _key: &str,
            _settings: &TokenBucketSettings,
            _now: i64,
        ) -> Result<Decision, RateLimitError> {
            Err(RateLimitError::unexpected_reply("boom"))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    fn settings() -> TokenBucketSettings {
        TokenBucketSettings::new(1, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let store = Arc::new(InMemoryTokenBucketStore::new());
        let result = TokenBucket::new(store, "  ", settings());
        assert!(matches!(result, Err(RateLimitError::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_keys_are_prefixed_per_identity() {
        let store = Arc::new(InMemoryTokenBucketStore::new());
        let clock = Arc::new(ManualClock::new(0));
        let limiter = TokenBucket::new(store.clone(), "reports", settings())
            .unwrap()
            .with_clock(clock);

        assert!(limiter.allow("alice").await.unwrap().allowed);
        assert!(!limiter.allow("alice").await.unwrap().allowed);
        assert!(limiter.allow("bob").await.unwrap().allowed);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_store_timeout_is_an_error() {
        let limiter = TokenBucket::new(Arc::new(StalledStore), "videos:upload", settings())
            .unwrap()
            .with_timeout(Duration::from_millis(50));

        let result = limiter.allow("user-1").await;
        match result {
            Err(RateLimitError::Timeout { key, timeout_ms }) => {
                assert_eq!(key, "videos:upload:user-1");
                assert_eq!(timeout_ms, 50);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_store_error_is_propagated() {
        let limiter = TokenBucket::new(Arc::new(FailingStore), "reports", settings()).unwrap();
        let result = limiter.allow("user-1").await;
        assert!(matches!(result, Err(RateLimitError::UnexpectedReply { .. })));
    }

    #[tokio::test]
    async fn test_unlimited_always_allows() {
        for _ in 0..100 {
            assert!(Unlimited.allow("anyone").await.unwrap().allowed);
        }
    }
}
