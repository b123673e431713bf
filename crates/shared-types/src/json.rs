//! # Loose JSON Helpers
//!
//! Payloads and settings arrive from clients that mix strings, numbers and
//! booleans freely. These helpers read them the way those clients wrote them.

use serde_json::Value;

/// JavaScript truthiness: `false`, `0`, `""`, `null` and NaN are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a scalar as text; `null` becomes the empty string.
pub fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
