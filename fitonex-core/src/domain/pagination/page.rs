//! Page assembly from an over-fetched result set
//!
//! Queries fetch `limit + 1` rows in canonical order. The extra row only
//! signals that another page exists; it is dropped here and the cursor is
//! taken from the last row that is actually returned.

use serde::{Deserialize, Serialize};
use tracing::error;

use super::cursor::{DistanceAscCursor, PageCursor, ScoreDescCursor, TimeDescCursor, encode_cursor};
use super::errors::PaginationError;

/// Standard paginated response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// A page with no items and no continuation
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items, keeping the continuation untouched
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build a page from an over-fetched, already ordered row set
///
/// # Arguments
/// * `items` - Rows in canonical order, at most `limit + 1` of them
/// * `limit` - Requested page size, must be positive
/// * `extract` - Builds the cursor of a row
///
/// # Errors
/// * [`PaginationError::InvalidLimit`] when `limit <= 0`, whatever the input
/// * [`PaginationError::InvalidCursorValue`] when the boundary row yields a
///   malformed cursor
/// * [`PaginationError::Encode`] when the cursor cannot be serialized
pub fn build_page<T, C, F>(mut items: Vec<T>, limit: i64, extract: F) -> Result<Page<T>, PaginationError>
where
    C: PageCursor,
    F: Fn(&T) -> C,
{
    if limit <= 0 {
        return Err(PaginationError::InvalidLimit);
    }

    if items.is_empty() {
        return Ok(Page::empty());
    }

    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let has_more = items.len() > limit;
    if !has_more {
        return Ok(Page {
            items,
            next_cursor: None,
            has_more: false,
        });
    }

    items.truncate(limit);

    // Non-empty after truncation since limit >= 1
    let Some(last) = items.last() else {
        return Ok(Page::empty());
    };

    let cursor = extract(last);
    if let Err(e) = cursor.validate() {
        error!(
            ordering = %C::ORDERING,
            error = %e,
            "Refusing to build page from malformed boundary row"
        );
        return Err(e);
    }
    let next_cursor = encode_cursor(&cursor)?;

    Ok(Page {
        items,
        next_cursor: Some(next_cursor),
        has_more: true,
    })
}

/// Build a page for lists ordered by `created_at DESC, id DESC`
pub fn time_desc_page<T, F>(items: Vec<T>, limit: i64, extract: F) -> Result<Page<T>, PaginationError>
where
    F: Fn(&T) -> TimeDescCursor,
{
    build_page(items, limit, extract)
}

/// Build a page for lists ordered by `distance_m ASC, id ASC`
pub fn distance_asc_page<T, F>(
    items: Vec<T>,
    limit: i64,
    extract: F,
) -> Result<Page<T>, PaginationError>
where
    F: Fn(&T) -> DistanceAscCursor,
{
    build_page(items, limit, extract)
}

/// Build a page for lists ordered by `score DESC, id ASC`
pub fn score_desc_page<T, F>(items: Vec<T>, limit: i64, extract: F) -> Result<Page<T>, PaginationError>
where
    F: Fn(&T) -> ScoreDescCursor,
{
    build_page(items, limit, extract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pagination::cursor::decode_cursor;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct TimeItem {
        id: &'static str,
        created_at: DateTime<Utc>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct DistanceItem {
        id: &'static str,
        distance_m: f64,
    }

    fn time_cursor(item: &TimeItem) -> TimeDescCursor {
        TimeDescCursor::new(item.created_at, item.id)
    }

    fn distance_cursor(item: &DistanceItem) -> DistanceAscCursor {
        DistanceAscCursor::new(item.distance_m, item.id)
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_time_desc_page_has_more() {
        let items = vec![
            TimeItem { id: "1", created_at: day(3) },
            TimeItem { id: "2", created_at: day(2) },
            TimeItem { id: "3", created_at: day(1) },
        ];

        let page = time_desc_page(items.clone(), 2, time_cursor).unwrap();

        assert_eq!(page.items, items[..2].to_vec());
        assert!(page.has_more);
        let cursor: TimeDescCursor = decode_cursor(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(cursor.id, "2");
        assert_eq!(cursor.created_at, day(2));
    }

    #[test]
    fn test_time_desc_page_no_more() {
        let items = vec![
            TimeItem { id: "1", created_at: day(2) },
            TimeItem { id: "2", created_at: day(1) },
        ];

        let page = time_desc_page(items.clone(), 5, time_cursor).unwrap();

        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
        assert_eq!(page.items, items);
    }

    #[test]
    fn test_exact_limit_has_no_more() {
        let items = vec![
            TimeItem { id: "1", created_at: day(2) },
            TimeItem { id: "2", created_at: day(1) },
        ];

        let page = time_desc_page(items, 2, time_cursor).unwrap();

        assert_eq!(page.len(), 2);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_empty_input_yields_empty_page() {
        let page = time_desc_page(Vec::<TimeItem>::new(), 10, time_cursor).unwrap();
        assert!(page.is_empty());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_invalid_limit_is_rejected_regardless_of_input() {
        for limit in [0, -1, i64::MIN] {
            let result = time_desc_page(Vec::<TimeItem>::new(), limit, time_cursor);
            assert!(matches!(result, Err(PaginationError::InvalidLimit)));

            let items = vec![TimeItem { id: "1", created_at: day(1) }];
            let result = time_desc_page(items, limit, time_cursor);
            assert!(matches!(result, Err(PaginationError::InvalidLimit)));
        }
    }

    #[test]
    fn test_malformed_boundary_row_is_an_error() {
        let items = vec![
            TimeItem { id: "", created_at: day(2) },
            TimeItem { id: "2", created_at: day(1) },
        ];
        let result = time_desc_page(items, 1, time_cursor);
        assert!(matches!(
            result,
            Err(PaginationError::InvalidCursorValue { .. })
        ));
    }

    #[test]
    fn test_malformed_row_on_last_page_is_not_inspected() {
        let items = vec![TimeItem { id: "", created_at: day(1) }];
        let page = time_desc_page(items, 1, time_cursor).unwrap();
        assert!(!page.has_more);
    }

    #[test]
    fn test_distance_asc_page_has_more() {
        let items = vec![
            DistanceItem { id: "a", distance_m: 10.0 },
            DistanceItem { id: "b", distance_m: 20.0 },
            DistanceItem { id: "c", distance_m: 30.0 },
        ];

        let page = distance_asc_page(items, 2, distance_cursor).unwrap();

        assert_eq!(page.len(), 2);
        assert!(page.has_more);
        let cursor: DistanceAscCursor = decode_cursor(page.next_cursor.as_deref().unwrap()).unwrap();
        assert_eq!(cursor, DistanceAscCursor::new(20.0, "b"));
    }

    #[test]
    fn test_distance_asc_page_rejects_nan_distance() {
        let items = vec![
            DistanceItem { id: "a", distance_m: f64::NAN },
            DistanceItem { id: "b", distance_m: 1.0 },
        ];
        let result = distance_asc_page(items, 1, distance_cursor);
        assert!(matches!(
            result,
            Err(PaginationError::InvalidCursorValue { .. })
        ));
    }

    #[test]
    fn test_score_desc_page_rejects_infinite_score() {
        let items = vec![("a", f64::INFINITY), ("b", 0.5)];
        let result = score_desc_page(items, 1, |(id, score)| ScoreDescCursor::new(*score, *id));
        assert!(matches!(
            result,
            Err(PaginationError::InvalidCursorValue { .. })
        ));
    }

    #[test]
    fn test_page_serialization_omits_missing_cursor() {
        let page: Page<u32> = Page {
            items: vec![1, 2],
            next_cursor: None,
            has_more: false,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({ "items": [1, 2], "has_more": false }));
    }

    #[test]
    fn test_page_map_keeps_cursor() {
        let page = Page {
            items: vec![1, 2],
            next_cursor: Some("abc".to_string()),
            has_more: true,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.next_cursor.as_deref(), Some("abc"));
        assert!(mapped.has_more);
    }
}
