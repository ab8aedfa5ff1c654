//! Record identifiers and batch-delete id lists.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Positive integer identifier assigned by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id, rejecting zero.
    pub fn new(raw: u64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Raw integer value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Coerce a JSON value into an id.
    ///
    /// Accepts positive integers, integral floats, and strings holding a
    /// positive integer. Everything else yields `None`.
    ///
    /// # Examples
    /// ```
    /// use client::domain::EntityId;
    /// use serde_json::json;
    ///
    /// assert_eq!(EntityId::from_value(&json!("12")).map(EntityId::get), Some(12));
    /// assert!(EntityId::from_value(&json!(2.5)).is_none());
    /// assert!(EntityId::from_value(&json!(-1)).is_none());
    /// ```
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => {
                if let Some(raw) = number.as_u64() {
                    return Self::new(raw);
                }
                let float = number.as_f64()?;
                let integral = float.fract() == 0.0 && float > 0.0 && float < u64::MAX as f64;
                // Range and integrality are checked, so the cast is exact.
                integral.then(|| Self(float as u64))
            }
            Value::String(text) => text.trim().parse::<u64>().ok().and_then(Self::new),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityId> for u64 {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// Deduplicated ids for a batch delete.
///
/// Raw selections from tables routinely contain junk (placeholder strings,
/// fractional values). Only valid ids survive; an empty batch never reaches
/// the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdBatch(BTreeSet<EntityId>);

impl IdBatch {
    /// Keep the valid ids from a raw selection.
    ///
    /// # Examples
    /// ```
    /// use client::domain::IdBatch;
    /// use serde_json::json;
    ///
    /// let batch = IdBatch::from_raw(&[json!(1), json!("x"), json!(2.5), json!(3)]);
    /// assert_eq!(batch.to_payload(), json!({ "ids": [1, 3] }));
    /// ```
    pub fn from_raw(values: &[Value]) -> Self {
        Self(values.iter().filter_map(EntityId::from_value).collect())
    }

    /// Build a batch from already-typed ids.
    pub fn from_ids<I: IntoIterator<Item = EntityId>>(ids: I) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Return whether no valid id survived.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether `id` is part of the batch.
    pub fn contains(&self, id: Option<EntityId>) -> bool {
        id.is_some_and(|id| self.0.contains(&id))
    }

    /// Request body for `DELETE <collection>`.
    pub fn to_payload(&self) -> Value {
        let ids: Vec<u64> = self.0.iter().map(|id| id.get()).collect();
        json!({ "ids": ids })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(json!(7), Some(7))]
    #[case(json!(7.0), Some(7))]
    #[case(json!(" 9 "), Some(9))]
    #[case(json!(0), None)]
    #[case(json!(-3), None)]
    #[case(json!(2.5), None)]
    #[case(json!(18_446_744_073_709_551_616.0), None)]
    #[case(json!(1.0e300), None)]
    #[case(json!("x"), None)]
    #[case(json!(null), None)]
    #[case(json!(true), None)]
    fn coerces_raw_ids(#[case] raw: Value, #[case] expected: Option<u64>) {
        assert_eq!(EntityId::from_value(&raw).map(EntityId::get), expected);
    }

    #[test]
    fn batch_deduplicates_and_orders() {
        let batch = IdBatch::from_raw(&[json!(5), json!("5"), json!(2)]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.to_payload(), json!({ "ids": [2, 5] }));
        assert!(batch.contains(EntityId::new(2)));
        assert!(!batch.contains(None));
    }

    #[test]
    fn all_invalid_selection_is_empty() {
        assert!(IdBatch::from_raw(&[json!("x"), json!(null)]).is_empty());
    }
}
