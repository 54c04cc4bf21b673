//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    pub pagination: PaginationConfig,
    pub rate_limit: RateLimitConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Shared store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub redis_url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Page size policy of one list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPolicy {
    /// Page size when the client sends none
    pub default_limit: i64,
    /// Larger requested sizes are clamped to this
    pub max_limit: i64,
}

impl LimitPolicy {
    pub const fn new(default_limit: i64, max_limit: i64) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }
}

/// Per-endpoint page size policies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub gyms_nearby: LimitPolicy,
    pub videos: LimitPolicy,
    pub exercises: LimitPolicy,
    pub comments: LimitPolicy,
    pub search: LimitPolicy,
    pub checkins: LimitPolicy,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            gyms_nearby: LimitPolicy::new(20, 50),
            videos: LimitPolicy::new(20, 50),
            exercises: LimitPolicy::new(20, 50),
            comments: LimitPolicy::new(20, 50),
            search: LimitPolicy::new(10, 50),
            checkins: LimitPolicy::new(10, 50),
        }
    }
}

impl PaginationConfig {
    /// All policies with their endpoint names, for validation and logging
    pub fn policies(&self) -> [(&'static str, LimitPolicy); 6] {
        [
            ("gyms_nearby", self.gyms_nearby),
            ("videos", self.videos),
            ("exercises", self.exercises),
            ("comments", self.comments),
            ("search", self.search),
            ("checkins", self.checkins),
        ]
    }
}

/// Storage backend for rate limiting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStorageBackend {
    /// Shared Redis store (required when running more than one instance)
    #[default]
    Redis,
    /// Process-local store (development/single instance)
    Memory,
}

impl RateLimitStorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitStorageBackend::Redis => "redis",
            RateLimitStorageBackend::Memory => "memory",
        }
    }
}

/// One token bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBucketConfig {
    /// Store key prefix; buckets live under `{key_prefix}:{identity}`
    pub key_prefix: String,
    /// Requests admitted per interval, also the burst capacity
    pub rate: u32,
    pub interval_seconds: u64,
}

impl TokenBucketConfig {
    pub fn new(key_prefix: impl Into<String>, rate: u32, interval_seconds: u64) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            rate,
            interval_seconds,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    pub storage_backend: RateLimitStorageBackend,
    /// Bound on a single store round trip in milliseconds
    pub store_timeout_ms: u64,
    /// How often expired in-memory buckets are purged (memory backend only)
    pub cleanup_interval_seconds: u64,
    /// Accept the `x-user-id` header as caller identity when authentication
    /// has not attached one. Only for deployments behind a gateway that
    /// strips client-supplied values and sets its own.
    pub trust_user_id_header: bool,
    /// Video upload URL issuance
    pub video_upload: TokenBucketConfig,
    /// Abuse reports
    pub reports: TokenBucketConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            storage_backend: RateLimitStorageBackend::Redis,
            store_timeout_ms: 500,
            cleanup_interval_seconds: 300,
            trust_user_id_header: false,
            video_upload: TokenBucketConfig::new("videos:upload", 5, 60),
            reports: TokenBucketConfig::new("reports", 5, 60),
        }
    }
}

impl RateLimitConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.cache.validate()?;
        self.logging.validate()?;
        self.pagination.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FITONEX").separator("__"));

        let mut config: Config = builder.build()?.try_deserialize()?;

        if let Ok(redis_url) = std::env::var("REDIS_URL") {
            config.cache.redis_url = redis_url;
        }

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
