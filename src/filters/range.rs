//! Range filters for numeric and temporal fields

use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower and upper bound of a range, both optional and inclusive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Range {
    pub from: Option<FieldValue>,
    pub to: Option<FieldValue>,
}

impl Range {
    pub fn new(from: Option<FieldValue>, to: Option<FieldValue>) -> Self {
        Self { from, to }
    }

    pub fn between(from: impl Into<FieldValue>, to: impl Into<FieldValue>) -> Self {
        Self::new(Some(from.into()), Some(to.into()))
    }

    pub fn at_least(from: impl Into<FieldValue>) -> Self {
        Self::new(Some(from.into()), None)
    }

    pub fn at_most(to: impl Into<FieldValue>) -> Self {
        Self::new(None, Some(to.into()))
    }
}

/// Map of field name to range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFilter {
    pub ranges: BTreeMap<String, Range>,
}

impl RangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, range: Range) -> Self {
        self.ranges.insert(field.into(), range);
        self
    }

    /// Mutable range for a field, created empty on first access
    pub fn range_mut(&mut self, field: &str) -> &mut Range {
        self.ranges.entry(field.to_string()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

macro_rules! field_value_from {
    ($($t:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::$variant(<$conv>::from(value))
                }
            }
        )*
    };
}

field_value_from!(
    i32 => Integer as i64,
    i64 => Integer as i64,
    u32 => Integer as i64,
    f32 => Float as f64,
    f64 => Float as f64,
    bool => Boolean as bool,
    String => String as String,
    &str => String as String,
    chrono::DateTime<chrono::Utc> => DateTime as chrono::DateTime<chrono::Utc>,
    uuid::Uuid => Uuid as uuid::Uuid,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let filter = RangeFilter::new()
            .with("count", Range::between(5, 15))
            .with("amount", Range::at_least(1.5))
            .with("created", Range::at_most("2024-01-01T00:00:00Z"));

        assert_eq!(
            filter.ranges["count"],
            Range::new(Some(FieldValue::Integer(5)), Some(FieldValue::Integer(15)))
        );
        assert_eq!(filter.ranges["amount"].to, None);
        assert_eq!(filter.ranges["created"].from, None);
    }

    #[test]
    fn test_deserialize_partial_range() {
        let filter: RangeFilter =
            serde_json::from_str(r#"{"ranges": {"count": {"from": 5}}}"#).unwrap();
        assert_eq!(filter.ranges["count"], Range::at_least(5));
    }

    #[test]
    fn test_range_mut_creates_entry() {
        let mut filter = RangeFilter::new();
        filter.range_mut("count").to = Some(FieldValue::Integer(3));
        assert_eq!(filter.ranges["count"], Range::at_most(3));
    }
}
