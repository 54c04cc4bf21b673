//! Property-based tests for cursors and page assembly

mod common;

use chrono::{DateTime, Duration, Utc};
use common::*;
use fitonex_core::domain::pagination::{
    DistanceAscCursor, PaginationError, ScoreDescCursor, TimeDescCursor, decode_cursor,
    encode_cursor, time_desc_page,
};
use proptest::prelude::*;

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    // 2001-09-09 .. 2033-05-18, with sub-second precision
    (1_000_000_000i64..2_000_000_000i64, 0u32..1_000_000_000u32)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9\\-]{1,36}"
}

proptest! {
    #[test]
    fn test_time_desc_cursor_roundtrip(created_at in timestamp(), id in identifier()) {
        let cursor = TimeDescCursor::new(created_at, id);
        let decoded: TimeDescCursor = decode_cursor(&encode_cursor(&cursor).unwrap()).unwrap();
        prop_assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_distance_cursor_roundtrip(distance in 0.0f64..40_075_000.0, id in identifier()) {
        let cursor = DistanceAscCursor::new(distance, id);
        let decoded: DistanceAscCursor = decode_cursor(&encode_cursor(&cursor).unwrap()).unwrap();
        prop_assert_eq!(decoded.distance_m.to_bits(), cursor.distance_m.to_bits());
        prop_assert_eq!(decoded.id, cursor.id);
    }

    #[test]
    fn test_score_cursor_roundtrip(score in -1.0e6f64..1.0e6, id in identifier()) {
        let cursor = ScoreDescCursor::new(score, id);
        let decoded: ScoreDescCursor = decode_cursor(&encode_cursor(&cursor).unwrap()).unwrap();
        prop_assert_eq!(decoded.score.to_bits(), cursor.score.to_bits());
        prop_assert_eq!(decoded.id, cursor.id);
    }

    #[test]
    fn test_page_invariants(len in 0usize..40, limit in 1i64..15) {
        let rows = comments_newest_first(len);
        let page = time_desc_page(rows.clone(), limit, Comment::cursor).unwrap();

        prop_assert!(page.items.len() as i64 <= limit);
        prop_assert_eq!(page.has_more, len as i64 > limit);
        prop_assert_eq!(page.next_cursor.is_some(), page.has_more);
        prop_assert!(page.next_cursor.as_deref() != Some(""));
        prop_assert_eq!(&page.items[..], &rows[..page.items.len()]);
    }

    #[test]
    fn test_non_positive_limit_always_fails(len in 0usize..10, limit in i64::MIN..=0i64) {
        let rows = comments_newest_first(len);
        let result = time_desc_page(rows, limit, Comment::cursor);
        prop_assert!(matches!(result, Err(PaginationError::InvalidLimit)));
    }

    #[test]
    fn test_walk_visits_every_row_once(
        offsets in prop::collection::vec(0i64..5, 0..30),
        limit in 1i64..7,
    ) {
        // Few distinct timestamps so many rows tie on the sort key
        let rows: Vec<Comment> = offsets
            .iter()
            .enumerate()
            .map(|(i, minutes)| Comment::new(&format!("r{:02}", i), base_time() + Duration::minutes(*minutes)))
            .collect();

        let pages = walk_pages(&rows, limit, Comment::cursor);
        let mut seen: Vec<String> = pages.into_iter().flat_map(|p| p.items).map(|c| c.id).collect();
        prop_assert_eq!(seen.len(), rows.len());

        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), rows.len());
    }
}
