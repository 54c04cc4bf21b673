//! Pagination support for data-access code

pub mod keyset;

pub use keyset::{
    KeysetColumns, KeysetCursor, overfetch, push_keyset_predicate, push_order_and_limit,
    push_page_tail,
};
