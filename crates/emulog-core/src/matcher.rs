//! Match engine: evaluates a [`StructuredFilter`] against one [`LogRecord`].
//!
//! - `search` requires its (lower-cased) term to occur in the record's
//!   lower-cased JSON serialization.
//! - Every other key is a property path. Paths under `user` and `metadata`
//!   live in the record's `data` object and are rewritten to `data.…` before
//!   lookup. The field must be present and truthy; unless the expected value
//!   is the wildcard `*`, its string form must equal the field's string form.
//!
//! A record matches when every filter passes, so an empty filter matches all.

use std::borrow::Cow;

use crate::accessor::AccessorCache;
use crate::coerce::{js_string, js_truthy};
use crate::filter::{StructuredFilter, SEARCH_KEY};
use crate::types::LogRecord;

const DATA_PREFIXES: &[&str] = &["user.", "user[", "metadata.", "metadata["];

/// Whether `record` satisfies every filter in `query`.
pub fn is_query_match(query: &StructuredFilter, record: &LogRecord, cache: &mut AccessorCache) -> bool {
    if query.is_empty() {
        return true;
    }
    let root = record.to_value();

    query.filters.iter().all(|(key, expected)| {
        if key == SEARCH_KEY {
            let haystack = root.to_string().to_lowercase();
            return haystack.contains(&expected.js_string().to_lowercase());
        }

        let path = record_path(key);
        let Some(actual) = cache.get_or_compile(&path, &root) else {
            return false;
        };
        if !js_truthy(actual) {
            return false;
        }
        expected.is_wildcard() || expected.js_string() == js_string(actual)
    })
}

/// Map a filter key to a path rooted at the record.
pub fn record_path(key: &str) -> Cow<'_, str> {
    if DATA_PREFIXES.iter().any(|p| key.starts_with(p)) {
        Cow::Owned(format!("data.{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::parse_query;
    use rstest::rstest;
    use serde_json::json;

    fn record() -> LogRecord {
        let mut rec = LogRecord::new("info", "I like vegan fishsticks", 1_700_000_000_000);
        rec.data.insert(
            "user".into(),
            json!({"adorable": true, "name": "Ada", "count": 0, "tags": ["a", "b"]}),
        );
        rec.data.insert(
            "metadata".into(),
            json!({"emulator": {"name": "functions"}, "function": {"name": "helloWorld"}}),
        );
        rec
    }

    fn matches(q: &str) -> bool {
        is_query_match(&parse_query(q).filters, &record(), &mut AccessorCache::new())
    }

    #[rstest]
    #[case("", true)]
    #[case("fish", true)]
    #[case("FISHSTICKS", true)]
    #[case("chicken", false)]
    #[case("user.adorable=true", true)]
    #[case("user.adorable=false", false)]
    #[case("user.adorable=*", true)]
    #[case("user.missing=*", false)]
    #[case("level=info", true)]
    #[case("level=warn", false)]
    #[case("metadata.emulator.name=functions", true)]
    #[case("metadata.function.name=helloWorld fish", true)]
    #[case("metadata.function.name=helloWorld chicken", false)]
    #[case("user.count=0", false)]
    #[case("user.tags=a,b", true)]
    #[case("user.tags[1]=b", true)]
    #[case("user['name']=Ada", true)]
    fn query_cases(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(matches(query), expected, "query {query:?}");
    }

    #[test]
    fn invalid_pairs_do_not_constrain() {
        assert!(matches("evil=true"));
    }

    #[test]
    fn search_sees_data_fields() {
        assert!(matches("helloworld"));
    }

    #[test]
    fn numbers_compare_by_string_form() {
        let mut rec = record();
        rec.data.insert("user".into(), json!({"port": 8080}));
        let mut cache = AccessorCache::new();
        assert!(is_query_match(&parse_query("user.port=8080").filters, &rec, &mut cache));
        assert!(is_query_match(&parse_query("user.port=\"8080\"").filters, &rec, &mut cache));
        assert!(!is_query_match(&parse_query("user.port=80").filters, &rec, &mut cache));
    }

    #[test]
    fn record_path_prefixes_data() {
        assert_eq!(record_path("user.a"), "data.user.a");
        assert_eq!(record_path("user[0]"), "data.user[0]");
        assert_eq!(record_path("metadata.emulator"), "data.metadata.emulator");
        assert_eq!(record_path("level"), "level");
        assert_eq!(record_path("userx"), "userx");
    }
}
