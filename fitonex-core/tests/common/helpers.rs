//! In-memory stand-in for a keyset-paginated query

use fitonex_core::domain::pagination::{
    Page, PageCursor, PaginationError, build_page, decode_cursor,
};
use fitonex_core::infrastructure::pagination::overfetch;

/// Run one paginated "query" over `rows`
///
/// Sorts by the cursor's canonical order, keeps rows strictly after the
/// decoded cursor, fetches `limit + 1` of them and hands them to the page
/// builder, the same steps a SQL collaborator performs.
pub fn query_page<T, C, F>(
    rows: &[T],
    cursor: Option<&str>,
    limit: i64,
    extract: F,
) -> Result<Page<T>, PaginationError>
where
    T: Clone,
    C: PageCursor,
    F: Fn(&T) -> C,
{
    let fetch = usize::try_from(overfetch(limit)?).unwrap_or(usize::MAX);
    let after: Option<C> = cursor.map(decode_cursor::<C>).transpose()?;

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| extract(a).cmp_position(&extract(b)));

    let window: Vec<T> = sorted
        .into_iter()
        .filter(|row| after.as_ref().is_none_or(|c| c.precedes(&extract(row))))
        .take(fetch)
        .collect();

    build_page(window, limit, extract)
}

/// Follow `next_cursor` until the last page, returning every page
pub fn walk_pages<T, C, F>(rows: &[T], limit: i64, extract: F) -> Vec<Page<T>>
where
    T: Clone,
    C: PageCursor,
    F: Fn(&T) -> C,
{
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = query_page(rows, cursor.as_deref(), limit, &extract).expect("page query failed");
        let next = page.next_cursor.clone();
        let has_more = page.has_more;
        pages.push(page);

        if !has_more {
            break;
        }
        cursor = next;
        assert!(pages.len() <= rows.len() + 1, "pagination did not terminate");
    }

    pages
}
