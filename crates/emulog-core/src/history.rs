//! History: the append-only, insertion-ordered sequence of received records.
//!
//! The history is the single source of truth; the UI reads from it, never
//! from the feed directly. Filtering re-evaluates the whole history each time
//! the query changes instead of maintaining an incremental match set.

use crate::accessor::AccessorCache;
use crate::filter::StructuredFilter;
use crate::matcher::is_query_match;
use crate::types::LogRecord;

#[derive(Debug, Default, Clone)]
pub struct LogHistory {
    records: Vec<LogRecord>,
}

impl LogHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LogRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    /// Indices of every record matching `filter`, oldest first.
    pub fn matching_indices(&self, filter: &StructuredFilter, cache: &mut AccessorCache) -> Vec<usize> {
        self.matching_from(0, filter, cache)
    }

    /// Indices at or after `start` matching `filter`; used to extend an
    /// existing result when records are appended under an unchanged query.
    pub fn matching_from(&self, start: usize, filter: &StructuredFilter, cache: &mut AccessorCache) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, record)| is_query_match(filter, record, cache))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Extend<LogRecord> for LogHistory {
    fn extend<I: IntoIterator<Item = LogRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<LogRecord> for LogHistory {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::parse_query;

    fn history() -> LogHistory {
        ["info", "warn", "info", "error"]
            .iter()
            .enumerate()
            .map(|(i, level)| LogRecord::new(*level, format!("message {i}"), i as i64))
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything_in_order() {
        let h = history();
        let all = h.matching_indices(&Default::default(), &mut AccessorCache::new());
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn filters_by_level() {
        let h = history();
        let q = parse_query("level=info").filters;
        assert_eq!(h.matching_indices(&q, &mut AccessorCache::new()), vec![0, 2]);
    }

    #[test]
    fn matching_from_only_scans_tail() {
        let mut h = history();
        h.push(LogRecord::new("info", "late", 10));
        let q = parse_query("level=info").filters;
        assert_eq!(h.matching_from(3, &q, &mut AccessorCache::new()), vec![4]);
    }
}
