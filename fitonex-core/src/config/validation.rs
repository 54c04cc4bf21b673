//! Configuration validation module

use crate::config::{
    CacheConfig, LoggingConfig, PaginationConfig, RateLimitConfig, ServerConfig,
    TokenBucketConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Cache configuration error: {message}")]
    Cache { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Pagination configuration error: {message}")]
    Pagination { message: String },

    #[error("Rate limit configuration error: {message}")]
    RateLimit { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // u16 cannot exceed 65535, so only 0 is out of range
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://") {
            return Err(ValidationError::cache(format!(
                "Redis URL must start with redis:// or rediss://, got '{}'",
                self.redis_url
            )));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "Log format must be 'json' or 'pretty', got '{}'",
                other
            ))),
        }
    }
}

impl Validate for PaginationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        for (endpoint, policy) in self.policies() {
            if policy.default_limit < 1 {
                return Err(ValidationError::pagination(format!(
                    "{}: default_limit must be at least 1, got {}",
                    endpoint, policy.default_limit
                )));
            }
            if policy.default_limit > policy.max_limit {
                return Err(ValidationError::pagination(format!(
                    "{}: default_limit ({}) must not exceed max_limit ({})",
                    endpoint, policy.default_limit, policy.max_limit
                )));
            }
        }

        Ok(())
    }
}

fn validate_bucket(name: &str, bucket: &TokenBucketConfig) -> Result<(), ValidationError> {
    if bucket.key_prefix.trim().is_empty() {
        return Err(ValidationError::rate_limit(format!(
            "{}: key_prefix cannot be empty",
            name
        )));
    }
    if bucket.rate == 0 {
        return Err(ValidationError::rate_limit(format!(
            "{}: rate must be greater than 0",
            name
        )));
    }
    if bucket.interval_seconds == 0 {
        return Err(ValidationError::rate_limit(format!(
            "{}: interval_seconds must be greater than 0",
            name
        )));
    }
    Ok(())
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.store_timeout_ms == 0 {
            return Err(ValidationError::rate_limit(
                "store_timeout_ms must be greater than 0",
            ));
        }

        if self.cleanup_interval_seconds == 0 {
            return Err(ValidationError::rate_limit(
                "cleanup_interval_seconds must be greater than 0",
            ));
        }

        validate_bucket("video_upload", &self.video_upload)?;
        validate_bucket("reports", &self.reports)?;

        Ok(())
    }
}
