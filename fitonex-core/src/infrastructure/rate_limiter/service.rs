//! Rate Limiter Service
//!
//! Builds one token bucket per protected endpoint from configuration, over a
//! single shared store.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::clock::{Clock, SystemClock};
use super::errors::RateLimitError;
use super::storage::{InMemoryTokenBucketStore, RedisTokenBucketStore, TokenBucketStore};
use super::token_bucket::{Limiter, TokenBucket, Unlimited};
use super::types::{Decision, TokenBucketSettings};
use crate::config::{RateLimitConfig, RateLimitStorageBackend, TokenBucketConfig};

/// Endpoints guarded by a token bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectedEndpoint {
    /// Issuing a signed video upload URL
    VideoUpload,
    /// Filing an abuse report
    Reports,
}

impl ProtectedEndpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectedEndpoint::VideoUpload => "video_upload",
            ProtectedEndpoint::Reports => "reports",
        }
    }
}

impl fmt::Display for ProtectedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main rate limiter service
#[derive(Clone)]
pub struct RateLimiterService {
    video_upload: Arc<dyn Limiter>,
    reports: Arc<dyn Limiter>,
    /// Set when the service owns a process-local store that needs purging
    memory_store: Option<Arc<InMemoryTokenBucketStore>>,
    enabled: bool,
}

impl RateLimiterService {
    /// Create the service, connecting to Redis when that backend is configured
    ///
    /// A Redis backend that cannot be reached is an error, not a silent
    /// downgrade to per-instance limits.
    pub async fn new_with_url(
        config: &RateLimitConfig,
        redis_url: &str,
    ) -> Result<Self, RateLimitError> {
        if !config.enabled {
            info!("Rate limiting is disabled");
            return Ok(Self::disabled());
        }

        match config.storage_backend {
            RateLimitStorageBackend::Redis => {
                let store = RedisTokenBucketStore::connect(redis_url).await?;
                info!("Rate limiter using Redis storage backend");
                Self::with_storage(Arc::new(store), config)
            }
            RateLimitStorageBackend::Memory => {
                info!("Rate limiter using in-memory storage backend");
                let store = Arc::new(InMemoryTokenBucketStore::new());
                let mut service = Self::with_storage(store.clone(), config)?;
                service.memory_store = Some(store);
                Ok(service)
            }
        }
    }

    /// Create with a custom storage backend
    pub fn with_storage(
        store: Arc<dyn TokenBucketStore>,
        config: &RateLimitConfig,
    ) -> Result<Self, RateLimitError> {
        Self::with_storage_and_clock(store, config, Arc::new(SystemClock))
    }

    /// Create with a custom storage backend and time source
    pub fn with_storage_and_clock(
        store: Arc<dyn TokenBucketStore>,
        config: &RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RateLimitError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let build = |bucket: &TokenBucketConfig| -> Result<Arc<dyn Limiter>, RateLimitError> {
            let settings = TokenBucketSettings::new(bucket.rate, bucket.interval())?;
            let limiter = TokenBucket::new(Arc::clone(&store), &bucket.key_prefix, settings)?
                .with_clock(Arc::clone(&clock))
                .with_timeout(config.store_timeout());
            Ok(Arc::new(limiter))
        };

        Ok(Self {
            video_upload: build(&config.video_upload)?,
            reports: build(&config.reports)?,
            memory_store: None,
            enabled: true,
        })
    }

    /// A service that admits every request
    pub fn disabled() -> Self {
        Self {
            video_upload: Arc::new(Unlimited),
            reports: Arc::new(Unlimited),
            memory_store: None,
            enabled: false,
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The process-local store, when the memory backend is in use
    pub fn memory_store(&self) -> Option<Arc<InMemoryTokenBucketStore>> {
        self.memory_store.clone()
    }

    /// The limiter guarding `endpoint`
    pub fn limiter(&self, endpoint: ProtectedEndpoint) -> Arc<dyn Limiter> {
        match endpoint {
            ProtectedEndpoint::VideoUpload => Arc::clone(&self.video_upload),
            ProtectedEndpoint::Reports => Arc::clone(&self.reports),
        }
    }

    /// Check `identity` against the bucket of `endpoint`
    pub async fn allow(
        &self,
        endpoint: ProtectedEndpoint,
        identity: &str,
    ) -> Result<Decision, RateLimitError> {
        match endpoint {
            ProtectedEndpoint::VideoUpload => self.video_upload.allow(identity).await,
            ProtectedEndpoint::Reports => self.reports.allow(identity).await,
        }
    }
}
