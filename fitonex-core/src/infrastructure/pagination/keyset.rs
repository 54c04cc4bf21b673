//! Keyset predicates for PostgreSQL list queries
//!
//! Translates a decoded cursor into the `WHERE` fragment and `ORDER BY ...
//! LIMIT` tail that keep a paginated query consistent with the cursor's
//! ordering. The query fetches one row more than the page size so the page
//! builder can tell whether another page exists.

use sqlx::{Postgres, QueryBuilder};

use crate::domain::pagination::{
    CursorOrdering, DistanceAscCursor, PageCursor, PaginationError, ScoreDescCursor,
    TimeDescCursor,
};

/// Column names of the sort key and the tie-breaking identifier
#[derive(Debug, Clone, Copy)]
pub struct KeysetColumns<'a> {
    pub sort: &'a str,
    pub id: &'a str,
}

impl<'a> KeysetColumns<'a> {
    pub const fn new(sort: &'a str, id: &'a str) -> Self {
        Self { sort, id }
    }
}

/// A cursor whose sort key can be bound to a PostgreSQL query
pub trait KeysetCursor: PageCursor {
    fn bind_sort_key<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>);
}

impl KeysetCursor for TimeDescCursor {
    fn bind_sort_key<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        builder.push_bind(self.created_at);
    }
}

impl KeysetCursor for DistanceAscCursor {
    fn bind_sort_key<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        builder.push_bind(self.distance_m);
    }
}

impl KeysetCursor for ScoreDescCursor {
    fn bind_sort_key<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        builder.push_bind(self.score);
    }
}

/// Comparison operators for (sort key, identifier) when resuming after a cursor
fn comparison_operators(ordering: CursorOrdering) -> (&'static str, &'static str) {
    match ordering {
        CursorOrdering::TimeDesc => ("<", "<"),
        CursorOrdering::DistanceAsc => (">", ">"),
        CursorOrdering::ScoreDesc => ("<", ">"),
    }
}

/// Sort directions for (sort key, identifier)
fn sort_directions(ordering: CursorOrdering) -> (&'static str, &'static str) {
    match ordering {
        CursorOrdering::TimeDesc => ("DESC", "DESC"),
        CursorOrdering::DistanceAsc => ("ASC", "ASC"),
        CursorOrdering::ScoreDesc => ("DESC", "ASC"),
    }
}

/// Number of rows to fetch for a page of `limit` items
pub fn overfetch(limit: i64) -> Result<i64, PaginationError> {
    if limit <= 0 {
        return Err(PaginationError::InvalidLimit);
    }
    Ok(limit.saturating_add(1))
}

/// Append `AND (sort <op> $a OR (sort = $b AND id <op> $c))` for `cursor`
///
/// The builder must already contain a `WHERE` clause.
pub fn push_keyset_predicate<'args, C: KeysetCursor>(
    builder: &mut QueryBuilder<'args, Postgres>,
    columns: KeysetColumns<'_>,
    cursor: &C,
) {
    let (sort_op, id_op) = comparison_operators(C::ORDERING);

    builder
        .push(" AND (")
        .push(columns.sort)
        .push(format!(" {sort_op} "));
    cursor.bind_sort_key(builder);
    builder.push(" OR (").push(columns.sort).push(" = ");
    cursor.bind_sort_key(builder);
    builder
        .push(" AND ")
        .push(columns.id)
        .push(format!(" {id_op} "));
    builder.push_bind(cursor.id().to_owned());
    builder.push("))");
}

/// Append the canonical `ORDER BY` for `C` and `LIMIT limit + 1`
pub fn push_order_and_limit<'args, C: KeysetCursor>(
    builder: &mut QueryBuilder<'args, Postgres>,
    columns: KeysetColumns<'_>,
    limit: i64,
) -> Result<(), PaginationError> {
    let fetch = overfetch(limit)?;
    let (sort_dir, id_dir) = sort_directions(C::ORDERING);

    builder
        .push(" ORDER BY ")
        .push(columns.sort)
        .push(format!(" {sort_dir}, "))
        .push(columns.id)
        .push(format!(" {id_dir} LIMIT "));
    builder.push_bind(fetch);
    Ok(())
}

/// Append the optional cursor predicate followed by ordering and limit
pub fn push_page_tail<'args, C: KeysetCursor>(
    builder: &mut QueryBuilder<'args, Postgres>,
    columns: KeysetColumns<'_>,
    cursor: Option<&C>,
    limit: i64,
) -> Result<(), PaginationError> {
    if limit <= 0 {
        return Err(PaginationError::InvalidLimit);
    }
    if let Some(cursor) = cursor {
        push_keyset_predicate(builder, columns, cursor);
    }
    push_order_and_limit::<C>(builder, columns, limit)
}
