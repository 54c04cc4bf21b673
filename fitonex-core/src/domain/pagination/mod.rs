//! Cursor-based pagination
//!
//! - [`cursor`]: the three cursor kinds and the opaque base64/JSON codec
//! - [`page`]: overfetch-trim-and-cursor page assembly
//! - [`errors`]: client and internal pagination failures
//!
//! Cursors embed the sort key of the boundary row instead of an offset, so
//! pages stay stable while rows are inserted or deleted concurrently.

pub mod cursor;
pub mod errors;
pub mod page;

pub use cursor::{
    Cursor, CursorOrdering, DistanceAscCursor, PageCursor, ScoreDescCursor, TimeDescCursor,
    decode_cursor, encode_cursor,
};
pub use errors::PaginationError;
pub use page::{Page, build_page, distance_asc_page, score_desc_page, time_desc_page};
