//! Infrastructure layer: SQL pagination helpers and the rate limiter

pub mod pagination;
pub mod rate_limiter;
