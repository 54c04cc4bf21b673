//! Rate limit enforcement for HTTP handlers

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use fitonex_core::infrastructure::rate_limiter::{Decision, Limiter};

use super::errors::ApiError;

/// Header a trusted gateway may use to pass the caller identity
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, inserted into request extensions by authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

/// State of [`rate_limit_middleware`]: the limiter of one endpoint and
/// where caller identities may come from
#[derive(Clone)]
pub struct RateLimitGuard {
    limiter: Arc<dyn Limiter>,
    trust_user_id_header: bool,
}

impl RateLimitGuard {
    /// Guard keyed only by the [`CallerId`] extension
    pub fn new(limiter: Arc<dyn Limiter>) -> Self {
        Self {
            limiter,
            trust_user_id_header: false,
        }
    }

    /// Also accept [`USER_ID_HEADER`] when no [`CallerId`] is attached
    pub fn trusting_user_id_header(mut self, trust: bool) -> Self {
        self.trust_user_id_header = trust;
        self
    }

    fn caller_identity(&self, request: &Request) -> Option<String> {
        if let Some(CallerId(id)) = request.extensions().get::<CallerId>()
            && !id.trim().is_empty()
        {
            return Some(id.clone());
        }

        if !self.trust_user_id_header {
            return None;
        }

        request
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Run one admission check for `identity`
///
/// A denial becomes `429` with the retry delay; a limiter failure becomes
/// `500` and the request is not admitted.
pub async fn enforce_rate_limit(limiter: &dyn Limiter, identity: &str) -> Result<Decision, ApiError> {
    let decision = limiter.allow(identity).await?;
    if !decision.allowed {
        return Err(ApiError::RateLimited {
            retry_after_secs: decision.retry_after_secs(),
        });
    }
    Ok(decision)
}

/// Rate limiting middleware
///
/// Use with `axum::middleware::from_fn_with_state(guard, rate_limit_middleware)`.
/// Requests without a caller identity are rejected with `401` before any
/// token is spent.
pub async fn rate_limit_middleware(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = guard.caller_identity(&request) else {
        return ApiError::Unauthorized.into_response();
    };

    match enforce_rate_limit(guard.limiter.as_ref(), &identity).await {
        Ok(decision) => {
            let mut response = next.run(request).await;
            // Unlimited decisions carry an infinite remainder; no header then
            if decision.remaining.is_finite() {
                let remaining = decision.remaining.max(0.0).floor() as u64;
                response
                    .headers_mut()
                    .insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            }
            response
        }
        Err(e) => e.into_response(),
    }
}
