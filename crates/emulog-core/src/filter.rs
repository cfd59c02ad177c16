//! Structured filters and their canonical query-string form.
//!
//! A [`StructuredFilter`] is what the query bar compiles to: a mapping from
//! field path to expected value. The reserved key [`SEARCH_KEY`] carries the
//! aggregated free-text term. [`filters_to_query_string`] is the inverse
//! projection used when click-to-filter synthesizes a new query.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Number, Value};

use crate::coerce::{js_number, js_string};
use crate::tokenizer::parse_query;

/// Reserved filter key collecting free text.
pub const SEARCH_KEY: &str = "search";

/// Value meaning "field must be present", whatever it holds.
pub const WILDCARD: &str = "*";

/// A typed filter value, as recovered by JSON-parsing the text after `=`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Number(Number),
    Bool(bool),
}

impl FilterValue {
    pub fn wildcard() -> Self {
        FilterValue::String(WILDCARD.to_string())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, FilterValue::String(s) if s == WILDCARD)
    }

    /// Convert a resolved JSON value. Values with no scalar filter form
    /// (`null`, arrays, objects) are kept as their JSON text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => FilterValue::String(s.clone()),
            Value::Number(n) => FilterValue::Number(n.clone()),
            Value::Bool(b) => FilterValue::Bool(*b),
            other => FilterValue::String(other.to_string()),
        }
    }

    /// Parse the raw text after `=`, falling back to the text itself.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(s)) => FilterValue::String(s),
            Ok(Value::Number(n)) => FilterValue::Number(n),
            Ok(Value::Bool(b)) => FilterValue::Bool(b),
            _ => FilterValue::String(raw.to_string()),
        }
    }

    /// `JSON.stringify(v)`.
    pub fn to_json(&self) -> String {
        match self {
            FilterValue::String(s) => Value::String(s.clone()).to_string(),
            FilterValue::Number(n) => js_number(n),
            FilterValue::Bool(b) => b.to_string(),
        }
    }

    /// `String(v)`, the form compared against record fields.
    pub fn js_string(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Number(n) => js_number(n),
            FilterValue::Bool(b) => b.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Number(n) => Value::Number(n.clone()),
            FilterValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<u64> for FilterValue {
    fn from(n: u64) -> Self {
        FilterValue::Number(n.into())
    }
}

impl From<&Value> for FilterValue {
    fn from(v: &Value) -> Self {
        FilterValue::from_value(v)
    }
}

/// The compiled form of a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredFilter {
    /// Field path → expected value. At most one value per key.
    pub filters: BTreeMap<String, FilterValue>,
    /// The chunks that were joined into the `search` filter, in order: an
    /// explicit `search=` value first, then every free-text span.
    pub search_terms: Vec<String>,
}

impl StructuredFilter {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }

    /// The aggregated free-text term, if any.
    pub fn search(&self) -> Option<String> {
        self.filters.get(SEARCH_KEY).map(FilterValue::js_string)
    }

    /// Insert or overwrite a pair.
    pub fn insert(&mut self, key: impl Into<String>, value: FilterValue) {
        self.filters.insert(key.into(), value);
    }

    /// The canonical query string for this filter.
    pub fn to_query_string(&self) -> String {
        filters_to_query_string(&self.filters)
    }
}

/// Render filters as `key=<JSON value>` lines, sorted by the whole line.
pub fn filters_to_query_string(filters: &BTreeMap<String, FilterValue>) -> String {
    let mut lines: Vec<String> = filters
        .iter()
        .map(|(key, value)| format!("{key}={}", value.to_json()))
        .collect();
    lines.sort();
    lines.join("\n")
}

/// Add (or replace) one pair in `query` and return the regenerated query.
///
/// Free text survives as a `search=` pair; invalid pairs are dropped.
pub fn append_filter(query: &str, key: &str, value: FilterValue) -> String {
    let mut parsed = parse_query(query).filters;
    tracing::debug!(key, value = %value, "appending filter");
    parsed.insert(key, value);
    parsed.to_query_string()
}
