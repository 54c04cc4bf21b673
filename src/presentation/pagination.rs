//! Page query parameters
//!
//! List endpoints accept `?limit=N&cursor=...`. The limit falls back to the
//! endpoint's default and is clamped to its maximum; the cursor is decoded
//! into the ordering the endpoint serves.

use fitonex_core::config::LimitPolicy;
use fitonex_core::domain::pagination::{PageCursor, PaginationError, decode_cursor};
use serde::Deserialize;

/// Raw `limit` and `cursor` query parameters
///
/// `limit` is kept as text so a non-numeric value is reported as
/// `INVALID_LIMIT` instead of a generic query rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

/// Validated page request for cursors of type `C`
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<C> {
    pub limit: i64,
    pub cursor: Option<C>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl<C: PageCursor> PageRequest<C> {
    pub fn parse(query: &PageQuery, policy: &LimitPolicy) -> Result<Self, PaginationError> {
        let limit = match non_blank(query.limit.as_deref()) {
            None => policy.default_limit,
            Some(raw) => {
                let requested: i64 = raw.parse().map_err(|_| PaginationError::InvalidLimit)?;
                if requested <= 0 {
                    return Err(PaginationError::InvalidLimit);
                }
                requested.min(policy.max_limit)
            }
        };

        let cursor = non_blank(query.cursor.as_deref())
            .map(decode_cursor::<C>)
            .transpose()?;

        Ok(Self { limit, cursor })
    }
}
