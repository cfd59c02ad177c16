//! Assertion macros for emulog harnesses.
//!
//! Failure messages print the query and the record so a broken filter shows
//! exactly which side disagreed.

/// Assert that `$record` matches the query string `$query`.
///
/// ```rust
/// assert_matches_query!(record, "level=error user.id=7");
/// ```
#[macro_export]
macro_rules! assert_matches_query {
    ($record:expr, $query:expr) => {{
        let record: &emulog_core::LogRecord = &$record;
        let query: &str = $query;
        let parsed = emulog_core::parse_query(query);
        let mut cache = emulog_core::AccessorCache::new();
        if !emulog_core::is_query_match(&parsed.filters, record, &mut cache) {
            panic!(
                "assert_matches_query! failed: record did not match\n  query:   {:?}\n  filters: {:?}\n  record:  {}",
                query,
                parsed.filters,
                record.to_value()
            );
        }
    }};
}

/// Assert that `$record` does NOT match the query string `$query`.
#[macro_export]
macro_rules! assert_rejects_query {
    ($record:expr, $query:expr) => {{
        let record: &emulog_core::LogRecord = &$record;
        let query: &str = $query;
        let parsed = emulog_core::parse_query(query);
        let mut cache = emulog_core::AccessorCache::new();
        if emulog_core::is_query_match(&parsed.filters, record, &mut cache) {
            panic!(
                "assert_rejects_query! failed: record unexpectedly matched\n  query:   {:?}\n  filters: {:?}\n  record:  {}",
                query,
                parsed.filters,
                record.to_value()
            );
        }
    }};
}

/// Assert that re-joining a query's tokens reproduces the input exactly.
#[macro_export]
macro_rules! assert_lossless {
    ($query:expr) => {{
        let query: &str = $query;
        let rebuilt = emulog_core::parse_query(query).raw();
        pretty_assertions::assert_eq!(rebuilt, query, "tokenizer dropped or altered text");
    }};
}

/// Indices of `records` matching `query`, for comparing filtered views.
pub fn matching(records: &[emulog_core::LogRecord], query: &str) -> Vec<usize> {
    let filters = emulog_core::parse_query(query).filters;
    let mut cache = emulog_core::AccessorCache::new();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| emulog_core::is_query_match(&filters, r, &mut cache))
        .map(|(i, _)| i)
        .collect()
}
