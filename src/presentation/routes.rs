//! Route definitions and shared handler state

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router, middleware};
use chrono::Utc;
use fitonex_core::Config;
use fitonex_core::infrastructure::rate_limiter::{Limiter, ProtectedEndpoint, RateLimiterService};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::models::HealthResponse;
use super::rate_limit::{RateLimitGuard, rate_limit_middleware};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiterService,
}

impl AppState {
    pub fn new(config: Arc<Config>, rate_limiter: RateLimiterService) -> Self {
        Self {
            config,
            rate_limiter,
        }
    }

    pub fn limiter(&self, endpoint: ProtectedEndpoint) -> Arc<dyn Limiter> {
        self.rate_limiter.limiter(endpoint)
    }
}

/// Liveness check
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = if !state.rate_limiter.is_enabled() {
        "disabled"
    } else if state.rate_limiter.memory_store().is_some() {
        "memory"
    } else {
        "redis"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        details: Some(serde_json::json!({
            "rate_limiter": { "backend": backend },
        })),
    })
}

/// Guard every route of `router` with the limiter of `endpoint`
///
/// Protected handlers (video upload URL issuance, abuse reports) are
/// mounted through this so each request consumes one token of the caller's
/// bucket before the handler runs.
pub fn protect<S>(router: Router<S>, state: &AppState, endpoint: ProtectedEndpoint) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = RateLimitGuard::new(state.limiter(endpoint))
        .trusting_user_id_header(state.config.rate_limit.trust_user_id_header);
    router.route_layer(middleware::from_fn_with_state(guard, rate_limit_middleware))
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.server.request_timeout();

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                // HTTP tracing
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}
