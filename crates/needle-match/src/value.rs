//! Helpers over `serde_json::Value` shared by the comparator and the matchers.

use serde_json::{Number, Value};

const DESCRIBE_MAX_CHARS: usize = 80;

/// Name of the JSON type of a value.
///
/// Integers and floats are reported separately (`integer` / `double`) since
/// `serde_json` keeps track of which representation a number was decoded from.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a value is a boolean, number or string.
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Numeric equality irrespective of integer/float representation (`1 == 1.0`).
pub fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    if a.is_f64() || b.is_f64() {
        return match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    // One side negative i64, the other a u64 above i64::MAX
    false
}

/// Type and value equality for leaf values.
///
/// Containers never compare equal here; the comparator walks them itself.
pub fn scalars_equal(needle: &Value, haystack: &Value) -> bool {
    match (needle, haystack) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// Compact single-line rendering for messages, truncated when long.
pub fn describe(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= DESCRIBE_MAX_CHARS {
        return rendered;
    }
    let truncated: String = rendered.chars().take(DESCRIBE_MAX_CHARS).collect();
    format!("{truncated}...")
}

/// Plain-text rendering: strings without quotes, everything else as JSON.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => describe(other),
    }
}
