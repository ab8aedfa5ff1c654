//! Field lookups over loosely shaped API records.
//!
//! The API is inconsistent about key casing and about whether related labels
//! are flattened (`division_name`) or nested (`division.name`). A [`Lookup`]
//! collects candidate values in precedence order and a terminal method picks
//! the first usable one, falling back to a literal default.
//!
//! ```
//! use client::domain::normalize::RawRecord;
//! use serde_json::json;
//!
//! let raw = RawRecord::new(&json!({ "division": { "id": 4, "name": "Ops" } }));
//! let name = raw.field("divisionName").or("division_name").or_nested("division", "name");
//! assert_eq!(name.text(), "Ops");
//! ```

use serde_json::{Map, Value};

use super::ids::EntityId;

/// A JSON object viewed as a bag of optional fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Copy the fields of `value`; anything but an object reads as empty.
    pub fn new(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self(map.clone()),
            _ => Self::default(),
        }
    }

    /// Return whether `key` is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|value| !value.is_null())
    }

    /// Start a lookup at `key`.
    pub fn field(&self, key: &str) -> Lookup<'_> {
        Lookup {
            record: self,
            candidates: Vec::new(),
        }
        .or(key)
    }
}

/// Candidate values for one logical field, in precedence order.
#[derive(Debug, Clone)]
pub struct Lookup<'a> {
    record: &'a RawRecord,
    candidates: Vec<&'a Value>,
}

impl<'a> Lookup<'a> {
    /// Add `record[key]` as the next candidate.
    #[must_use]
    pub fn or(mut self, key: &str) -> Self {
        let record = self.record;
        if let Some(value) = record.0.get(key).filter(|value| !value.is_null()) {
            self.candidates.push(value);
        }
        self
    }

    /// Add `record[object][key]` as the next candidate.
    #[must_use]
    pub fn or_nested(mut self, object: &str, key: &str) -> Self {
        let record = self.record;
        if let Some(value) = record
            .0
            .get(object)
            .and_then(|nested| nested.get(key))
            .filter(|value| !value.is_null())
        {
            self.candidates.push(value);
        }
        self
    }

    /// First non-empty text candidate, numbers rendered, else `""`.
    pub fn text(&self) -> String {
        self.text_or("")
    }

    /// First non-empty text candidate, numbers rendered, else `default`.
    pub fn text_or(&self, default: &str) -> String {
        self.candidates
            .iter()
            .find_map(|value| match value {
                Value::String(text) if !text.is_empty() => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| default.to_owned())
    }

    /// First candidate that is a non-empty string, or `None`.
    pub fn optional_text(&self) -> Option<String> {
        let text = self.text();
        (!text.is_empty()).then_some(text)
    }

    /// First candidate that coerces to a positive id.
    pub fn id(&self) -> Option<EntityId> {
        self.candidates
            .iter()
            .find_map(|value| EntityId::from_value(value))
    }

    /// First numeric candidate (numeric strings accepted), else `default`.
    pub fn number_or(&self, default: f64) -> f64 {
        self.candidates
            .iter()
            .find_map(|value| match value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse::<f64>().ok(),
                _ => None,
            })
            .unwrap_or(default)
    }

    /// First integral candidate, else `default`.
    pub fn integer_or(&self, default: i64) -> i64 {
        self.candidates
            .iter()
            .find_map(|value| match value {
                Value::Number(number) => number.as_i64(),
                Value::String(text) => text.trim().parse::<i64>().ok(),
                _ => None,
            })
            .unwrap_or(default)
    }

    /// First boolean candidate, else `default`.
    pub fn flag_or(&self, default: bool) -> bool {
        self.candidates
            .iter()
            .find_map(|value| value.as_bool())
            .unwrap_or(default)
    }
}
