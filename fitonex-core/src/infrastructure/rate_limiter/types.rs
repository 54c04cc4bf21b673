//! Rate limiter types and the token bucket refill rule

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::RateLimitError;

/// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// How long to wait before the next token is available (zero when allowed)
    pub retry_after: Duration,
    /// Tokens left in the bucket after this decision
    pub remaining: f64,
}

impl Decision {
    pub fn allowed(remaining: f64) -> Self {
        Self {
            allowed: true,
            retry_after: Duration::ZERO,
            remaining,
        }
    }

    pub fn denied(retry_after: Duration, remaining: f64) -> Self {
        Self {
            allowed: false,
            retry_after,
            remaining,
        }
    }

    /// `Retry-After` value in whole seconds, rounded up and at least one
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.retry_after.as_millis();
        let secs = millis.div_ceil(1000);
        u64::try_from(secs).unwrap_or(u64::MAX).max(1)
    }
}

/// Persisted state of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenBucketState {
    /// Tokens currently in the bucket (fractional between refills)
    pub tokens: f64,
    /// Last refill time in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl TokenBucketState {
    /// A full bucket as of `now`
    pub fn full(capacity: f64, now: i64) -> Self {
        Self {
            tokens: capacity,
            timestamp: now,
        }
    }
}

/// Validated bucket parameters
///
/// The bucket holds at most one interval's worth of tokens, so the capacity
/// always equals the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketSettings {
    rate: u32,
    interval: Duration,
}

impl TokenBucketSettings {
    /// # Errors
    /// Returns [`RateLimitError::InvalidConfig`] when `rate` is zero or the
    /// interval is shorter than one millisecond.
    pub fn new(rate: u32, interval: Duration) -> Result<Self, RateLimitError> {
        if rate == 0 {
            return Err(RateLimitError::invalid_config("rate must be positive"));
        }
        if interval.as_millis() == 0 {
            return Err(RateLimitError::invalid_config(
                "interval must be at least one millisecond",
            ));
        }
        Ok(Self { rate, interval })
    }

    /// Tokens added per interval
    pub fn rate(&self) -> f64 {
        f64::from(self.rate)
    }

    pub fn capacity(&self) -> f64 {
        f64::from(self.rate)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_millis(&self) -> i64 {
        i64::try_from(self.interval.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Store key of the bucket for `identity`
pub fn bucket_key(prefix: &str, identity: &str) -> String {
    format!("{}:{}", prefix, identity)
}

/// Refill `state` up to `now` and try to take one token
///
/// A missing state starts as a full bucket. Elapsed time that is zero or
/// negative (clock skew between instances) adds nothing and keeps the
/// stored timestamp. A denied decision persists the refilled, undecremented
/// token count.
pub fn refill_and_take(
    state: Option<TokenBucketState>,
    now: i64,
    settings: &TokenBucketSettings,
) -> (TokenBucketState, Decision) {
    let capacity = settings.capacity();
    let rate = settings.rate();
    let interval = settings.interval_millis() as f64;

    let mut state = state.unwrap_or_else(|| TokenBucketState::full(capacity, now));

    let delta = now.saturating_sub(state.timestamp);
    if delta > 0 {
        let refill = delta as f64 * rate / interval;
        state.tokens = capacity.min(state.tokens + refill);
        state.timestamp = now;
    }

    if state.tokens < 1.0 {
        let deficit = 1.0 - state.tokens;
        let wait_ms = (deficit * interval / rate).ceil() as u64;
        return (
            state,
            Decision::denied(Duration::from_millis(wait_ms), state.tokens),
        );
    }

    state.tokens -= 1.0;
    (state, Decision::allowed(state.tokens))
}
