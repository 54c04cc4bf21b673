//! Rate Limiting Infrastructure
//!
//! Token bucket admission control keyed by caller identity:
//! - Redis storage running the bucket update as one atomic Lua script
//! - In-memory storage for development and single-instance deployments
//! - Injectable clock so refill can be simulated in tests

pub mod clock;
pub mod errors;
pub mod lua_scripts;
pub mod service;
pub mod storage;
pub mod token_bucket;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::RateLimitError;
pub use service::{ProtectedEndpoint, RateLimiterService};
pub use storage::{InMemoryTokenBucketStore, RedisTokenBucketStore, TokenBucketStore};
pub use token_bucket::{DEFAULT_STORE_TIMEOUT, Limiter, TokenBucket, Unlimited};
pub use types::{Decision, TokenBucketSettings, TokenBucketState, bucket_key, refill_and_take};
