//! JSON hierarchy renderer: annotates pretty-printed JSON, line by line,
//! with the property path each line belongs to.
//!
//! The detail pane shows a record's `data.user` payload exactly as
//! `serde_json::to_string_pretty` prints it (two-space indent, `": "`
//! separators, the same layout as `JSON.stringify(v, null, 2)`). Keys and
//! leaf values are selectable; selecting one appends a filter pair whose key
//! is the path of that line (`user.pets[1].name`).
//!
//! Paths are recovered from the printed text rather than from a separate walk
//! of the value, so every click target lines up with the text it was printed
//! from. A stack of [`HierarchyRef`] frames tracks the current position:
//!
//! - the root frame names the payload (`user`);
//! - `"key": {` pushes a [`RefMode::Dot`] or [`RefMode::Bracket`] frame;
//! - `"key": [` pushes that frame plus an [`RefMode::Increment`] frame whose
//!   index advances on every element;
//! - a keyless `{` / `[` (an array element) advances the enclosing index and
//!   pushes an anonymous frame (plus an index frame for arrays);
//! - `}` pops one frame and `]` pops two;
//! - `{}` / `[]` open and close on the same line and leave the stack alone.

use serde_json::{Map, Value};

use crate::accessor::AccessorCache;
use crate::filter::FilterValue;

/// Name of the synthetic root frame for record payloads.
pub const ROOT_NAME: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefMode {
    /// Printed verbatim (the root name, or nothing for an anonymous element).
    None,
    /// `.key`
    Dot,
    /// `["key"]`
    Bracket,
    /// `[n]`, advanced once per array element.
    Increment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKey {
    Name(String),
    Index(i64),
}

/// One nesting level of the path being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRef {
    pub mode: RefMode,
    pub key: RefKey,
}

impl HierarchyRef {
    pub fn root(name: &str) -> Self {
        Self { mode: RefMode::None, key: RefKey::Name(name.to_string()) }
    }

    fn element() -> Self {
        Self { mode: RefMode::None, key: RefKey::Name(String::new()) }
    }

    fn increment() -> Self {
        Self { mode: RefMode::Increment, key: RefKey::Index(-1) }
    }

    /// This frame's contribution to a path.
    pub fn segment(&self) -> String {
        let key = match &self.key {
            RefKey::Name(name) => name.clone(),
            RefKey::Index(i) => i.to_string(),
        };
        match self.mode {
            RefMode::None => key,
            RefMode::Dot => format!(".{key}"),
            RefMode::Bracket => format!("[{}]", Value::String(key)),
            RefMode::Increment => format!("[{key}]"),
        }
    }
}

/// The frame for a child key: dot access for plain identifiers, bracket
/// access for everything else.
pub fn to_hierarchy_step(key: &str) -> HierarchyRef {
    let plain = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic() || c == '_');
    HierarchyRef {
        mode: if plain { RefMode::Dot } else { RefMode::Bracket },
        key: RefKey::Name(key.to_string()),
    }
}

/// Concatenate the frames of `stack` into a path.
pub fn hierarchy_path(stack: &[HierarchyRef]) -> String {
    stack.iter().map(HierarchyRef::segment).collect()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// First line, opening the root object/array.
    Start,
    /// Last line, closing the root.
    End,
    /// `"key": {`, `"key": [`, `"key": {}` or `"key": []`.
    KeyedOpen,
    /// `{`, `[`, `{}` or `[]` as an array element.
    KeylessOpen,
    /// A scalar, keyed or not.
    Literal,
    /// `}` or `]` (with or without a trailing comma).
    Close,
    /// Anything the heuristics do not recognise.
    Generic,
}

/// Styling hint for a segment of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    Plain,
    Key,
    String,
    Number,
    /// `true`, `false` or `null`.
    Keyword,
    /// Braces, brackets, `: ` and commas.
    Punct,
}

/// What selecting a segment does: append `path=value` to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickAction {
    pub path: String,
    pub value: FilterValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub role: SegmentRole,
    pub action: Option<ClickAction>,
}

impl Segment {
    fn plain(text: &str, role: SegmentRole) -> Self {
        Self { text: text.to_string(), role, action: None }
    }

    fn clickable(text: &str, role: SegmentRole, action: ClickAction) -> Self {
        Self { text: text.to_string(), role, action: Some(action) }
    }
}

/// One printed line and its hierarchy annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLine {
    pub kind: LineKind,
    /// Frames on the stack when the line was reached.
    pub depth: usize,
    /// The path this line refers to (the key's path for keyed lines, the
    /// element's path for array elements, the enclosing path otherwise).
    pub path: String,
    /// Segments concatenate to the printed line.
    pub segments: Vec<Segment>,
}

impl JsonLine {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// The action on the key, if the line has a clickable key.
    pub fn key_action(&self) -> Option<&ClickAction> {
        self.segments
            .iter()
            .filter(|s| s.role == SegmentRole::Key || s.role == SegmentRole::Punct)
            .find_map(|s| s.action.as_ref())
    }

    /// The action on the leaf value, if the line has one.
    pub fn value_action(&self) -> Option<&ClickAction> {
        self.segments
            .iter()
            .filter(|s| matches!(s.role, SegmentRole::String | SegmentRole::Number | SegmentRole::Keyword))
            .find_map(|s| s.action.as_ref())
    }

    /// The value action when present, otherwise the key action.
    pub fn primary_action(&self) -> Option<&ClickAction> {
        self.value_action().or_else(|| self.key_action())
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Render `data` as the payload of [`ROOT_NAME`].
pub fn render_hierarchy(data: &Value, cache: &mut AccessorCache) -> Vec<JsonLine> {
    render_hierarchy_named(data, ROOT_NAME, cache)
}

/// Render `data` with an explicit root name.
pub fn render_hierarchy_named(data: &Value, root_name: &str, cache: &mut AccessorCache) -> Vec<JsonLine> {
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    let mut wrapper = Map::with_capacity(1);
    wrapper.insert(root_name.to_string(), data.clone());
    let root = Value::Object(wrapper);

    let mut walker = Walker {
        stack: vec![HierarchyRef::root(root_name)],
        root_open: None,
        root: &root,
        cache,
    };
    let lines: Vec<&str> = pretty.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| walker.line(line, idx == 0, idx == last))
        .collect()
}

struct Walker<'a> {
    stack: Vec<HierarchyRef>,
    /// `{` or `[` once the first line opened the root.
    root_open: Option<char>,
    root: &'a Value,
    cache: &'a mut AccessorCache,
}

/// A `"key": rest` line split into its parts.
struct Keyed<'l> {
    key_text: &'l str,
    key: String,
    rest: &'l str,
}

impl Walker<'_> {
    fn line(&mut self, line: &str, first: bool, last: bool) -> JsonLine {
        let depth = self.stack.len();
        let indent_len = line.len() - line.trim_start().len();
        let (indent, body) = line.split_at(indent_len);

        if first && (body.starts_with('{') || body.starts_with('[')) {
            let open = if body.starts_with('{') { '{' } else { '[' };
            self.root_open = Some(open);
            if body == "[" {
                self.stack.push(HierarchyRef::increment());
            }
            return self.structural(LineKind::Start, depth, indent, body);
        }
        if last && !first && self.is_root_close(body) {
            return self.structural(LineKind::End, depth, indent, body);
        }

        let keyed = if body.matches('"').count() >= 2 { split_key(body) } else { None };
        match keyed {
            Some(keyed) => self.keyed_line(depth, indent, keyed),
            None => self.keyless_line(depth, indent, body),
        }
    }

    fn is_root_close(&self, body: &str) -> bool {
        matches!((self.root_open, body), (Some('{'), "}") | (Some('['), "]"))
    }

    fn keyed_line(&mut self, depth: usize, indent: &str, keyed: Keyed<'_>) -> JsonLine {
        let (value, comma) = split_comma(keyed.rest);
        let step = to_hierarchy_step(&keyed.key);
        let key_path = format!("{}{}", self.path(), step.segment());
        let key_action = ClickAction { path: key_path.clone(), value: FilterValue::wildcard() };

        let mut segments = vec![
            Segment::plain(indent, SegmentRole::Plain),
            Segment::clickable(keyed.key_text, SegmentRole::Key, key_action),
            Segment::plain(": ", SegmentRole::Punct),
        ];

        let kind = match value {
            "{" => {
                self.stack.push(step);
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::KeyedOpen
            }
            "[" => {
                self.stack.push(step);
                self.stack.push(HierarchyRef::increment());
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::KeyedOpen
            }
            "{}" | "[]" => {
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::KeyedOpen
            }
            "}" | "]" => {
                segments.push(Segment::plain(value, SegmentRole::Plain));
                LineKind::Generic
            }
            literal => {
                self.advance_index();
                let action = self.value_action(&key_path);
                segments.push(literal_segment(literal, action));
                LineKind::Literal
            }
        };
        if !comma.is_empty() {
            segments.push(Segment::plain(comma, SegmentRole::Punct));
        }
        JsonLine { kind, depth, path: key_path, segments }
    }

    fn keyless_line(&mut self, depth: usize, indent: &str, body: &str) -> JsonLine {
        let (value, comma) = split_comma(body);
        let mut segments = vec![Segment::plain(indent, SegmentRole::Plain)];

        let kind = match value {
            "{" => {
                self.advance_index();
                self.stack.push(HierarchyRef::element());
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::KeylessOpen
            }
            "[" => {
                self.advance_index();
                self.stack.push(HierarchyRef::element());
                self.stack.push(HierarchyRef::increment());
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::KeylessOpen
            }
            "{}" | "[]" => {
                self.advance_index();
                let action = ClickAction { path: self.path(), value: FilterValue::wildcard() };
                segments.push(Segment::clickable(value, SegmentRole::Punct, action));
                LineKind::KeylessOpen
            }
            "}" => {
                self.pop();
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::Close
            }
            "]" => {
                self.pop();
                self.pop();
                segments.push(Segment::plain(value, SegmentRole::Punct));
                LineKind::Close
            }
            literal if is_literal(literal) => {
                self.advance_index();
                let path = self.path();
                let action = self.value_action(&path);
                segments.push(literal_segment(literal, action));
                LineKind::Literal
            }
            other => {
                segments.push(Segment::plain(other, SegmentRole::Plain));
                LineKind::Generic
            }
        };
        if !comma.is_empty() {
            segments.push(Segment::plain(comma, SegmentRole::Punct));
        }
        let path = match kind {
            // Closing lines report the path they return to.
            LineKind::Close => self.path(),
            _ => self.element_path(),
        };
        JsonLine { kind, depth, path, segments }
    }

    fn path(&self) -> String {
        hierarchy_path(&self.stack)
    }

    /// The path of the element just opened or printed: open lines have pushed
    /// their frames, so drop a trailing index frame that is still at -1.
    fn element_path(&self) -> String {
        match self.stack.last() {
            Some(HierarchyRef { mode: RefMode::Increment, key: RefKey::Index(-1) }) => {
                hierarchy_path(&self.stack[..self.stack.len() - 1])
            }
            _ => self.path(),
        }
    }

    fn advance_index(&mut self) {
        if let Some(HierarchyRef { mode: RefMode::Increment, key: RefKey::Index(i) }) = self.stack.last_mut() {
            *i += 1;
        }
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn value_action(&mut self, path: &str) -> Option<ClickAction> {
        let value = self.cache.get_or_compile(path, self.root)?;
        Some(ClickAction { path: path.to_string(), value: FilterValue::from_value(value) })
    }

    fn structural(&self, kind: LineKind, depth: usize, indent: &str, body: &str) -> JsonLine {
        JsonLine {
            kind,
            depth,
            path: hierarchy_path(&self.stack[..1]),
            segments: vec![
                Segment::plain(indent, SegmentRole::Plain),
                Segment::plain(body, SegmentRole::Punct),
            ],
        }
    }
}

/// Split `"key": rest` at the end of the quoted key.
fn split_key(body: &str) -> Option<Keyed<'_>> {
    if !body.starts_with('"') {
        return None;
    }
    let mut escaped = false;
    let close = body
        .char_indices()
        .skip(1)
        .find(|&(_, c)| {
            if escaped {
                escaped = false;
                return false;
            }
            if c == '\\' {
                escaped = true;
                return false;
            }
            c == '"'
        })
        .map(|(i, _)| i)?;
    let key_text = &body[..=close];
    let rest = body[close + 1..].strip_prefix(": ")?;
    let key = serde_json::from_str::<String>(key_text).ok()?;
    Some(Keyed { key_text, key, rest })
}

fn split_comma(s: &str) -> (&str, &str) {
    match s.strip_suffix(',') {
        Some(value) => (value, ","),
        None => (s, ""),
    }
}

fn is_literal(s: &str) -> bool {
    matches!(s.chars().next(), Some('"' | '-' | '0'..='9'))
        || matches!(s, "true" | "false" | "null")
}

fn literal_segment(text: &str, action: Option<ClickAction>) -> Segment {
    let role = match text.chars().next() {
        Some('"') => SegmentRole::String,
        Some('-' | '0'..='9') => SegmentRole::Number,
        _ => SegmentRole::Keyword,
    };
    Segment { text: text.to_string(), role, action }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(v: &Value) -> Vec<JsonLine> {
        render_hierarchy(v, &mut AccessorCache::new())
    }

    fn value_paths(lines: &[JsonLine]) -> Vec<(String, FilterValue)> {
        lines
            .iter()
            .filter_map(|l| l.value_action())
            .map(|a| (a.path.clone(), a.value.clone()))
            .collect()
    }

    fn key_paths(lines: &[JsonLine]) -> Vec<String> {
        lines.iter().filter_map(|l| l.key_action()).map(|a| a.path.clone()).collect()
    }

    #[test]
    fn step_modes() {
        assert_eq!(to_hierarchy_step("name").mode, RefMode::Dot);
        assert_eq!(to_hierarchy_step("snake_case").mode, RefMode::Dot);
        assert_eq!(to_hierarchy_step("a1").mode, RefMode::Bracket);
        assert_eq!(to_hierarchy_step("first name").mode, RefMode::Bracket);
        assert_eq!(to_hierarchy_step("").mode, RefMode::Bracket);
    }

    #[test]
    fn path_segments() {
        let stack = vec![
            HierarchyRef::root("user"),
            to_hierarchy_step("pets"),
            HierarchyRef { mode: RefMode::Increment, key: RefKey::Index(2) },
            HierarchyRef::element(),
            to_hierarchy_step("first name"),
        ];
        assert_eq!(hierarchy_path(&stack), "user.pets[2][\"first name\"]");
    }

    #[test]
    fn lines_reassemble_pretty_text() {
        let v = json!({"a": [1, {"b": "x"}, []], "c": {}, "d": null});
        let pretty = serde_json::to_string_pretty(&v).unwrap();
        let rendered: Vec<String> = render(&v).iter().map(JsonLine::text).collect();
        assert_eq!(rendered.join("\n"), pretty);
    }

    #[test]
    fn flat_object_paths_and_values() {
        let lines = render(&json!({"name": "Ada", "age": 36, "admin": true}));
        assert_eq!(lines.first().unwrap().kind, LineKind::Start);
        assert_eq!(lines.last().unwrap().kind, LineKind::End);
        assert_eq!(
            value_paths(&lines),
            vec![
                ("user.name".to_string(), "Ada".into()),
                ("user.age".to_string(), 36i64.into()),
                ("user.admin".to_string(), true.into()),
            ]
        );
        assert!(lines[1].key_action().unwrap().value.is_wildcard());
    }

    #[test]
    fn arrays_track_indices() {
        let lines = render(&json!({"tags": ["a", "b"], "pets": [{"kind": "cat"}, {"kind": "dog"}]}));
        assert_eq!(
            value_paths(&lines),
            vec![
                ("user.tags[0]".to_string(), "a".into()),
                ("user.tags[1]".to_string(), "b".into()),
                ("user.pets[0].kind".to_string(), "cat".into()),
                ("user.pets[1].kind".to_string(), "dog".into()),
            ]
        );
    }

    #[test]
    fn nested_arrays() {
        let lines = render(&json!({"grid": [[1, 2], [3]]}));
        assert_eq!(
            value_paths(&lines),
            vec![
                ("user.grid[0][0]".to_string(), 1i64.into()),
                ("user.grid[0][1]".to_string(), 2i64.into()),
                ("user.grid[1][0]".to_string(), 3i64.into()),
            ]
        );
    }

    #[test]
    fn empty_containers_do_not_change_depth() {
        let lines = render(&json!({"a": {}, "b": [], "c": 1}));
        assert_eq!(key_paths(&lines), vec!["user.a", "user.b", "user.c"]);
        assert!(lines[1..4].iter().all(|l| l.depth == 1));
        assert_eq!(lines[1].kind, LineKind::KeyedOpen);
    }

    #[test]
    fn empty_container_elements_advance_index() {
        let lines = render(&json!({"xs": [{}, [], 5]}));
        assert_eq!(value_paths(&lines), vec![("user.xs[2]".to_string(), 5i64.into())]);
        assert_eq!(lines[2].key_action().unwrap().path, "user.xs[0]");
        assert_eq!(lines[3].key_action().unwrap().path, "user.xs[1]");
    }

    #[test]
    fn depth_returns_after_close() {
        let lines = render(&json!({"o": {"p": {"q": 1}}, "r": 2}));
        let r = lines.iter().find(|l| l.path == "user.r").unwrap();
        assert_eq!(r.depth, 1);
        let q = lines.iter().find(|l| l.path == "user.o.p.q").unwrap();
        assert_eq!(q.depth, 3);
    }

    #[test]
    fn odd_keys_use_brackets() {
        let lines = render(&json!({"first name": "Ada", "x-y": {"z1": 1}}));
        assert_eq!(
            value_paths(&lines),
            vec![
                ("user[\"first name\"]".to_string(), "Ada".into()),
                ("user[\"x-y\"][\"z1\"]".to_string(), 1i64.into()),
            ]
        );
    }

    #[test]
    fn keys_with_quotes_resolve() {
        let lines = render(&json!({"say \"hi\"": "ok"}));
        assert_eq!(value_paths(&lines), vec![("user[\"say \\\"hi\\\"\"]".to_string(), "ok".into())]);
    }

    #[test]
    fn string_values_with_structural_text() {
        let lines = render(&json!({"a": "{", "b": "]", "c": ["}"]}));
        assert_eq!(
            value_paths(&lines),
            vec![
                ("user.a".to_string(), "{".into()),
                ("user.b".to_string(), "]".into()),
                ("user.c[0]".to_string(), "}".into()),
            ]
        );
    }

    #[test]
    fn array_root() {
        let lines = render(&json!(["x", {"y": 1}]));
        assert_eq!(
            value_paths(&lines),
            vec![("user[0]".to_string(), "x".into()), ("user[1].y".to_string(), 1i64.into())]
        );
        assert_eq!(lines.last().unwrap().kind, LineKind::End);
    }

    #[test]
    fn scalar_root() {
        let lines = render(&json!("hello"));
        assert_eq!(lines.len(), 1);
        assert_eq!(value_paths(&lines), vec![("user".to_string(), "hello".into())]);
    }

    #[test]
    fn empty_root_object() {
        let lines = render(&json!({}));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, LineKind::Start);
    }

    #[test]
    fn null_leaf_keeps_text_value() {
        let lines = render(&json!({"gone": null}));
        assert_eq!(value_paths(&lines), vec![("user.gone".to_string(), "null".into())]);
    }
}
