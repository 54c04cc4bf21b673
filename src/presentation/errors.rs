//! HTTP mapping of domain and infrastructure errors

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use fitonex_core::domain::pagination::PaginationError;
use fitonex_core::infrastructure::rate_limiter::RateLimitError;
use tracing::error;

use super::models::ErrorResponse;

/// Error returned by handlers and middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Rate limit exceeded. Try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Rate limit check failed: {0}")]
    RateLimitCheck(#[from] RateLimitError),

    #[error("Authentication required")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pagination(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pagination(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::RateLimitCheck(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Pagination(PaginationError::InvalidCursor) => "INVALID_CURSOR",
            ApiError::Pagination(PaginationError::InvalidLimit) => "INVALID_LIMIT",
            ApiError::Pagination(_) => "INTERNAL_ERROR",
            ApiError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            ApiError::RateLimitCheck(_) => "RATE_LIMIT_CHECK_FAILED",
            ApiError::Unauthorized => "UNAUTHORIZED",
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::Pagination(e) if e.is_client_error() => e.to_string(),
            ApiError::Pagination(_) => "An internal error occurred".to_string(),
            ApiError::RateLimitCheck(_) => "Unable to verify rate limit, please retry later".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed with internal error");
        }

        let mut body = ErrorResponse::new(self.code(), self.client_message());
        if let ApiError::RateLimited { retry_after_secs } = &self {
            body = body.with_details(serde_json::json!({ "retry_after": retry_after_secs }));
        }

        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
