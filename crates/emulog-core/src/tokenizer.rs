//! Query tokenizer: turns the raw query bar text into tokens and filters.
//!
//! # Syntax
//!
//! - `key=value` pairs constrain a record field. The value is JSON-parsed when
//!   possible (`user.n=3` is numeric, `level="info"` and `level=info` are the
//!   same string).
//! - Anything else is free text and is matched case-insensitively against the
//!   whole record.
//! - Double quotes keep spaces together (`user.name="Ada Lovelace"`) and a
//!   backslash protects the character after it.
//! - Only known keys form filters: `level`, `search`, `metadata.emulator`,
//!   `metadata.emulator.name`, `metadata.function`, `metadata.function.name`
//!   and anything under `user.` / `user[`. Other pairs are kept as
//!   [`Token::InvalidPair`] so the query bar can show them as errors.
//!
//! Tokenization is lossless: the `raw` text of the tokens concatenates back
//! to the input.

use std::sync::LazyLock;

use regex::Regex;

use crate::filter::{FilterValue, StructuredFilter, SEARCH_KEY};

/// Keys accepted verbatim in `key=value` pairs.
pub const KNOWN_KEYS: &[&str] = &[
    "level",
    SEARCH_KEY,
    "metadata.emulator",
    "metadata.emulator.name",
    "metadata.function",
    "metadata.function.name",
];

/// Stands in for a space inside double quotes.
const QUOTED_SPACE: char = '\u{1}';
/// Stands in for each byte of a backslash-escaped character.
const ESCAPED: char = '\u{2}';

static PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s]+\s?=\s?[^\s]+").expect("pair pattern is valid"));

/// One lexical unit of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Free text.
    Text { raw: String },
    /// A `key=value` pair with a known key.
    Pair {
        raw: String,
        key: String,
        raw_value: String,
        value: FilterValue,
    },
    /// A `key=value` shape whose key is not accepted.
    InvalidPair { raw: String },
    Newline,
}

impl Token {
    /// The exact source text of this token.
    pub fn raw(&self) -> &str {
        match self {
            Token::Text { raw } | Token::Pair { raw, .. } | Token::InvalidPair { raw } => raw,
            Token::Newline => "\n",
        }
    }
}

/// Tokens plus the filter they compile to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub tokens: Vec<Token>,
    pub filters: StructuredFilter,
}

impl ParsedQuery {
    /// Reassemble the source text from the tokens.
    pub fn raw(&self) -> String {
        self.tokens.iter().map(Token::raw).collect()
    }

    pub fn invalid_pairs(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::InvalidPair { raw } => Some(raw.as_str()),
            _ => None,
        })
    }
}

/// Whether `key` may appear on the left of a filter pair.
pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.contains(&key) || key.starts_with("user.") || key.starts_with("user[")
}

/// Tokenize `raw` and compile its filters.
pub fn parse_query(raw: &str) -> ParsedQuery {
    let masked = mask(raw);
    debug_assert_eq!(masked.len(), raw.len());

    let mut tokens = Vec::new();
    let mut line_start = 0;
    for (n, line) in masked.split('\n').enumerate() {
        if n > 0 {
            tokens.push(Token::Newline);
        }
        let mut cursor = 0;
        for m in PAIR.find_iter(line) {
            if m.start() > cursor {
                tokens.push(text(raw, line_start + cursor, line_start + m.start()));
            }
            tokens.push(pair(raw, line, line_start, m.start(), m.end()));
            cursor = m.end();
        }
        if cursor < line.len() {
            tokens.push(text(raw, line_start + cursor, line_start + line.len()));
        }
        line_start += line.len() + 1;
    }

    let filters = compile(&tokens);
    ParsedQuery { tokens, filters }
}

/// Replace quoted spaces and escaped characters with non-whitespace
/// sentinels, byte for byte, so offsets into the result are offsets into `raw`.
fn mask(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_quotes = false;
    let mut escaped = false;
    for c in raw.chars() {
        if escaped {
            out.extend(std::iter::repeat_n(ESCAPED, c.len_utf8()));
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            ' ' if in_quotes => out.push(QUOTED_SPACE),
            _ => out.push(c),
        }
    }
    out
}

fn text(raw: &str, start: usize, end: usize) -> Token {
    Token::Text { raw: raw[start..end].to_string() }
}

fn pair(raw: &str, masked_line: &str, line_start: usize, start: usize, end: usize) -> Token {
    let span = &raw[line_start + start..line_start + end];
    // The regex guarantees an unmasked '=' that is neither first nor last.
    let Some(eq) = masked_line[start..end].find('=') else {
        return Token::Text { raw: span.to_string() };
    };
    let key = span[..eq].trim();
    let raw_value = span[eq + 1..].trim();
    if !is_known_key(key) {
        tracing::debug!(key, "query pair with unknown key");
        return Token::InvalidPair { raw: span.to_string() };
    }
    Token::Pair {
        raw: span.to_string(),
        key: key.to_string(),
        raw_value: raw_value.to_string(),
        value: FilterValue::parse(raw_value),
    }
}

fn compile(tokens: &[Token]) -> StructuredFilter {
    let mut filter = StructuredFilter::default();
    let mut free_text = Vec::new();

    for token in tokens {
        match token {
            Token::Pair { key, value, .. } => filter.insert(key.clone(), value.clone()),
            Token::Text { raw } => free_text.push(raw.clone()),
            Token::InvalidPair { .. } | Token::Newline => {}
        }
    }

    // Free text and an explicit `search=` pair merge into a single term.
    let mut chunks = Vec::with_capacity(free_text.len() + 1);
    if let Some(explicit) = filter.filters.remove(SEARCH_KEY) {
        chunks.push(explicit.js_string());
    }
    chunks.extend(free_text);

    let search = chunks.join(" ").trim().to_string();
    filter.search_terms = chunks
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if !search.is_empty() {
        filter.insert(SEARCH_KEY, FilterValue::String(search));
    }
    filter
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn filters(q: &str) -> BTreeMap<String, FilterValue> {
        parse_query(q).filters.filters
    }

    fn map(pairs: &[(&str, FilterValue)]) -> BTreeMap<String, FilterValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn single_pair() {
        assert_eq!(filters("level=info"), map(&[("level", "info".into())]));
    }

    #[test]
    fn unknown_key_is_dropped_but_kept_as_token() {
        let parsed = parse_query("level=info evil=true");
        assert_eq!(parsed.filters.filters, map(&[("level", "info".into())]));
        assert_eq!(parsed.invalid_pairs().collect::<Vec<_>>(), vec!["evil=true"]);
        assert_eq!(parsed.raw(), "level=info evil=true");
    }

    #[test]
    fn user_prefixed_keys_are_accepted() {
        assert_eq!(
            filters("level=info user.cat=hat"),
            map(&[("level", "info".into()), ("user.cat", "hat".into())])
        );
    }

    #[test]
    fn free_text_keeps_surrounding_spaces() {
        assert_eq!(parse_query("whats level=info up").filters.search().as_deref(), Some("whats   up"));
    }

    #[test]
    fn bracket_paths_with_escapes() {
        assert_eq!(
            filters("user['...'].fish['\\asd']=1234"),
            map(&[("user['...'].fish['\\asd']", 1234i64.into())])
        );
    }

    #[test]
    fn quoted_spaces_stay_in_one_pair() {
        let parsed = parse_query("user.name=\"Ada Lovelace\" rocks");
        assert_eq!(parsed.filters.get("user.name"), Some(&"Ada Lovelace".into()));
        assert_eq!(parsed.filters.search().as_deref(), Some("rocks"));
    }

    #[test]
    fn escaped_space_does_not_split() {
        let parsed = parse_query("user.a=b\\ c");
        assert_eq!(parsed.filters.get("user.a"), Some(&"b\\ c".into()));
        assert_eq!(parsed.filters.search(), None);
    }

    #[test]
    fn spaces_around_equals_are_allowed() {
        assert_eq!(filters("level = warn"), map(&[("level", "warn".into())]));
    }

    #[test]
    fn explicit_search_merges_with_free_text() {
        let parsed = parse_query("search=foo bar");
        assert_eq!(parsed.filters.search().as_deref(), Some("foo  bar"));
        assert_eq!(parsed.filters.search_terms, vec!["foo", "bar"]);
    }

    #[test]
    fn duplicate_keys_last_wins() {
        assert_eq!(filters("level=info level=warn"), map(&[("level", "warn".into())]));
    }

    #[test]
    fn typed_values() {
        let f = filters("user.n=3 user.ok=true user.s=\"3\"");
        assert_eq!(f["user.n"], 3i64.into());
        assert_eq!(f["user.ok"], true.into());
        assert_eq!(f["user.s"], "3".into());
    }

    #[test]
    fn lines_produce_newline_tokens() {
        let parsed = parse_query("hello=\"world\"\nwhats.up=\"firebase\"");
        assert_eq!(parsed.tokens.len(), 3);
        assert_eq!(parsed.tokens[1], Token::Newline);
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn dangling_equals_is_free_text() {
        let parsed = parse_query("=foo foo=");
        assert_eq!(parsed.invalid_pairs().count(), 0);
        assert_eq!(parsed.filters.search().as_deref(), Some("=foo foo="));
    }

    #[test]
    fn empty_query_has_no_tokens() {
        let parsed = parse_query("");
        assert!(parsed.tokens.is_empty());
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn lossless_with_multibyte_escapes() {
        let q = "user.é=\"ü ö\" \\€x\nmore  text";
        assert_eq!(parse_query(q).raw(), q);
    }
}
