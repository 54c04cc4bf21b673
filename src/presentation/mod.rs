//! HTTP presentation layer

pub mod errors;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod routes;


pub use errors::ApiError;
pub use models::{ErrorResponse, HealthResponse};
pub use pagination::{PageQuery, PageRequest};
pub use rate_limit::{
    CallerId, RateLimitGuard, USER_ID_HEADER, enforce_rate_limit, rate_limit_middleware,
};
pub use routes::{AppState, create_router, health_check, protect};
