//! Shared helpers for Diesel repository implementations.
//!
//! Pagination arithmetic lives here so every repository converts between
//! the domain's unsigned page numbers and PostgreSQL's `BIGINT` the same way.

use crate::domain::PageRequest;

/// `LIMIT` and `OFFSET` for a page request.
///
/// Returns an error message when the offset does not fit in a `BIGINT`,
/// which only happens for absurd page numbers.
pub fn limit_offset(page: PageRequest) -> Result<(i64, i64), String> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| format!("page {} is out of range", page.page()))?;
    Ok((i64::from(page.page_size()), offset))
}

/// Convert a `COUNT(*)` result into the domain's unsigned total.
pub fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}
