//! Tolerant unwrapping of `{data: T}` response envelopes.
//!
//! Some endpoints wrap their payload in `data`, others return it bare. Both
//! shapes are accepted everywhere.

use serde_json::Value;

/// Return `body.data` when present and non-null, otherwise the body itself.
///
/// # Examples
/// ```
/// use client::domain::envelope::unwrap_data;
/// use serde_json::json;
///
/// assert_eq!(unwrap_data(json!({ "data": { "id": 1 } })), json!({ "id": 1 }));
/// assert_eq!(unwrap_data(json!({ "id": 1 })), json!({ "id": 1 }));
/// ```
pub fn unwrap_data(body: Value) -> Value {
    unwrap_key(body, "data")
}

/// Return `body[key]` when present and non-null, otherwise the body itself.
pub fn unwrap_key(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(inner) if !inner.is_null() => inner,
            Some(_) | None => Value::Object(map),
        },
        other => other,
    }
}

/// Unwrap a single-record mutation response.
///
/// Empty 2xx bodies decode to `null`. Those, `{}`, and bodies holding only
/// a status message carry no record and yield `None`.
pub fn record(body: Value) -> Option<Value> {
    match unwrap_data(body) {
        Value::Object(map) if map.keys().any(|key| !STATUS_KEYS.contains(&key.as_str())) => {
            Some(Value::Object(map))
        }
        _ => None,
    }
}

const STATUS_KEYS: [&str; 3] = ["message", "success", "status"];

/// Extract a list of records from a collection response.
///
/// Anything that is not a list once unwrapped yields an empty collection.
pub fn collection(body: Value) -> Vec<Value> {
    match unwrap_data(body) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
