use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use fitonex_core::Config;
use fitonex_core::infrastructure::rate_limiter::{
    Clock, InMemoryTokenBucketStore, RateLimiterService, SystemClock,
};
use tokio_util::sync::CancellationToken;

use crate::presentation::{AppState, create_router};

/// Application handle containing router and shutdown coordination
pub struct AppHandle {
    pub router: Router,
    pub shutdown_token: CancellationToken,
}

/// Spawns a background worker that drops expired in-memory buckets.
/// Only the memory backend needs this; Redis expires keys itself.
fn spawn_bucket_cleanup_worker(
    store: Arc<InMemoryTokenBucketStore>,
    every: Duration,
    shutdown_token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(every);
        // First tick completes immediately
        interval_timer.tick().await;

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    let purged = store.purge_expired(SystemClock.now_millis()).await;
                    if purged > 0 {
                        tracing::debug!(purged, "Purged expired rate limit buckets");
                    }
                }
                _ = shutdown_token.cancelled() => {
                    tracing::info!("Bucket cleanup worker shutting down gracefully");
                    return;
                }
            }
        }
    });
}

/// Create the application router and return an AppHandle for shutdown coordination
pub async fn create_app(
    config: Config,
) -> Result<AppHandle, Box<dyn std::error::Error + Send + Sync>> {
    let startup_time = Instant::now();
    let shutdown_token = CancellationToken::new();

    tracing::info!(
        enabled = config.rate_limit.enabled,
        backend = ?config.rate_limit.storage_backend,
        "Initializing rate limiter"
    );
    let rate_limiter =
        RateLimiterService::new_with_url(&config.rate_limit, &config.cache.redis_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to initialize rate limiter: {}", e);
                e
            })?;

    if let Some(store) = rate_limiter.memory_store() {
        spawn_bucket_cleanup_worker(
            store,
            config.rate_limit.cleanup_interval(),
            shutdown_token.clone(),
        );
    }

    for (endpoint, policy) in config.pagination.policies() {
        tracing::debug!(
            endpoint,
            default_limit = policy.default_limit,
            max_limit = policy.max_limit,
            "Page size policy"
        );
    }

    let state = AppState::new(Arc::new(config), rate_limiter);
    let router = create_router(state);

    tracing::info!(
        elapsed_ms = startup_time.elapsed().as_millis() as u64,
        "Application initialized"
    );

    Ok(AppHandle {
        router,
        shutdown_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitonex_core::config::RateLimitStorageBackend;
    use fitonex_core::infrastructure::rate_limiter::{Limiter, ProtectedEndpoint};

    #[tokio::test]
    async fn test_create_app_with_memory_backend() {
        let mut config = Config::default();
        config.rate_limit.storage_backend = RateLimitStorageBackend::Memory;

        let handle = create_app(config).await.unwrap();
        assert!(!handle.shutdown_token.is_cancelled());
        handle.shutdown_token.cancel();
    }

    #[tokio::test]
    async fn test_cleanup_worker_purges_and_stops() {
        let store = Arc::new(InMemoryTokenBucketStore::new());
        let mut config = Config::default();
        config.rate_limit.storage_backend = RateLimitStorageBackend::Memory;
        // A bucket that expired long ago
        config.rate_limit.video_upload.interval_seconds = 1;
        let service = RateLimiterService::with_storage_and_clock(
            store.clone(),
            &config.rate_limit,
            Arc::new(fitonex_core::infrastructure::rate_limiter::ManualClock::new(0)),
        )
        .unwrap();
        service
            .limiter(ProtectedEndpoint::VideoUpload)
            .allow("user-1")
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);

        let token = CancellationToken::new();
        spawn_bucket_cleanup_worker(store.clone(), Duration::from_millis(10), token.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.is_empty().await);
        token.cancel();
    }
}
