//! JavaScript-compatible value coercions.
//!
//! Filter values typed into the query bar are compared with record fields by
//! their string forms, exactly as the browser log viewer did with `String(v)`.
//! These helpers reproduce `String(v)`, `JSON.stringify(n)` for numbers and
//! JS truthiness over `serde_json` values.

use serde_json::{Number, Value};

/// `String(v)` for a JSON value.
///
/// Arrays join their elements with `,` (nulls become empty), objects become
/// `[object Object]`.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => js_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Number formatting as JS prints it: integral floats lose their `.0`.
pub fn js_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// JS truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn js_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
