//! Rate limiter errors

use thiserror::Error;

/// Failures of the rate limiter itself, as opposed to a denied request
#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Invalid rate limiter configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Rate limit store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Rate limit store did not answer within {timeout_ms}ms for key {key}")]
    Timeout { key: String, timeout_ms: u64 },

    #[error("Unexpected reply from rate limit store: {message}")]
    UnexpectedReply { message: String },
}

impl RateLimitError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn unexpected_reply(message: impl Into<String>) -> Self {
        Self::UnexpectedReply {
            message: message.into(),
        }
    }
}
