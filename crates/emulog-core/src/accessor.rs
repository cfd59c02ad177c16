//! Path accessor cache: compiles and memoizes property-path lookups.
//!
//! A path such as `data.user['first name'].pets[2]` is compiled once into a
//! list of property names and then evaluated against any number of JSON
//! values. Lookups never fail: a malformed path compiles to an accessor that
//! always yields `None`, and a lookup that steps through a missing or scalar
//! value yields `None` for that call only.
//!
//! # Grammar
//!
//! ```text
//! path    := ident ( '.' ident | '[' ws* (integer | string) ws* ']' )*
//! ident   := [A-Za-z_$] [A-Za-z0-9_$]*
//! string  := '\'' chars '\'' | '"' chars '"'     (JS escapes)
//! ```

use std::collections::HashMap;

use serde_json::Value;

use crate::error::PathError;

/// A compiled path: one property name per step. Numeric bracket keys are
/// stored in canonical decimal form, so `[02]` and `[2]` are the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Compiled {
    Steps(Vec<String>),
    /// Compilation failed; every lookup yields `None`.
    Invalid,
}

/// Memoized path compiler/evaluator.
///
/// Construct one per session (or per test) and pass it to the matcher and the
/// hierarchy renderer. Entries are kept in first-compile order and never
/// evicted; the set of distinct paths is bounded by what the user types.
#[derive(Debug, Default)]
pub struct AccessorCache {
    index: HashMap<String, usize>,
    entries: Vec<(String, Compiled)>,
}

impl AccessorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `path` against `root`, compiling and caching the path on first use.
    pub fn get_or_compile<'v>(&mut self, path: &str, root: &'v Value) -> Option<&'v Value> {
        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => self.compile(path),
        };
        match &self.entries[slot].1 {
            Compiled::Steps(steps) => evaluate(steps, root),
            Compiled::Invalid => None,
        }
    }

    /// Number of distinct paths compiled so far, valid or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compiled paths in first-compile order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// Whether `path` has been compiled and was rejected as malformed.
    pub fn is_invalid(&self, path: &str) -> bool {
        self.index
            .get(path)
            .is_some_and(|&slot| self.entries[slot].1 == Compiled::Invalid)
    }

    fn compile(&mut self, path: &str) -> usize {
        let compiled = match parse_path(path) {
            Ok(steps) => {
                tracing::debug!(path, steps = steps.len(), "accessor compiled");
                Compiled::Steps(steps)
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "invalid property path; lookups will yield nothing");
                Compiled::Invalid
            }
        };
        let slot = self.entries.len();
        self.entries.push((path.to_string(), compiled));
        self.index.insert(path.to_string(), slot);
        slot
    }
}

fn evaluate<'v>(steps: &[String], root: &'v Value) -> Option<&'v Value> {
    steps.iter().try_fold(root, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => array_index(key).and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Canonical array index: digits only, no leading zeros except `"0"`.
fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

// ---------------------------------------------------------------------------
// Path parser
// ---------------------------------------------------------------------------

/// Parse a property path into its steps.
pub fn parse_path(path: &str) -> Result<Vec<String>, PathError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let mut p = PathParser { src: path, pos: 0 };
    let mut steps = vec![p.ident()?];
    while let Some(c) = p.peek() {
        match c {
            '.' => {
                p.bump();
                steps.push(p.ident()?);
            }
            '[' => steps.push(p.bracket()?),
            found => return Err(PathError::Unexpected { offset: p.pos, found }),
        }
    }
    Ok(steps)
}

struct PathParser<'a> {
    src: &'a str,
    pos: usize,
}

impl PathParser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                self.bump();
            }
            _ => return Err(PathError::ExpectedIdentifier(start)),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.bump();
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn bracket(&mut self) -> Result<String, PathError> {
        let open = self.pos;
        self.bump();
        self.skip_ws();
        let key = match self.peek() {
            Some(q @ ('\'' | '"')) => self.string(q)?,
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                let digits = self.src[start..self.pos].trim_start_matches('0');
                if digits.is_empty() { "0".to_string() } else { digits.to_string() }
            }
            Some(found) => return Err(PathError::Unexpected { offset: self.pos, found }),
            None => return Err(PathError::UnterminatedBracket(open)),
        };
        self.skip_ws();
        match self.bump() {
            Some(']') => Ok(key),
            Some(found) => Err(PathError::Unexpected { offset: self.pos - found.len_utf8(), found }),
            None => Err(PathError::UnterminatedBracket(open)),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, PathError> {
        let open = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let at = self.pos;
            match self.bump() {
                None => return Err(PathError::UnterminatedString(open)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape(at)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, at: usize) -> Result<char, PathError> {
        let c = self.bump().ok_or(PathError::UnterminatedString(at))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'x' => self.hex(2, at)?,
            'u' => self.hex(4, at)?,
            other => other,
        })
    }

    fn hex(&mut self, len: usize, at: usize) -> Result<char, PathError> {
        let digits = self
            .src
            .get(self.pos..self.pos + len)
            .ok_or(PathError::InvalidEscape(at))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| PathError::InvalidEscape(at))?;
        self.pos += len;
        char::from_u32(code).ok_or(PathError::InvalidEscape(at))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
