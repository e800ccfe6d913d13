//! Field values, value kinds and per-field filter state

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
///
/// This is the currency of the criteria tree: filter fields, range bounds
/// and stored record fields are all lowered to a `FieldValue` before they
/// are compared or rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    /// Symbolic name of an enumerated value
    Enum(String),
    List(Vec<FieldValue>),
    Null,
    Json(serde_json::Value),
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) | FieldValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the elements of a multi-value container
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Compare two values of compatible kinds
    ///
    /// Integers and floats compare numerically, strings and enum names
    /// compare lexically. Returns `None` for incomparable kinds or nulls.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::String(b))
            | (FieldValue::Uuid(a), FieldValue::Enum(b)) => {
                Uuid::parse_str(b).ok().map(|b| a.cmp(&b))
            }
            (FieldValue::String(_) | FieldValue::Enum(_), FieldValue::Uuid(_)) => {
                other.compare(self).map(Ordering::reverse)
            }
            (
                FieldValue::String(a) | FieldValue::Enum(a),
                FieldValue::String(b) | FieldValue::Enum(b),
            ) => Some(a.cmp(b)),
            (FieldValue::Json(a), FieldValue::Json(b)) => (a == b).then_some(Ordering::Equal),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// Equality across compatible kinds (an enum equals its name as a string)
    pub fn loosely_equals(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Parse a raw query-string value according to a value kind
    pub fn parse_as(kind: ValueKind, raw: &str) -> Result<FieldValue, String> {
        let raw = raw.trim();
        match kind {
            ValueKind::Number { integral: true } => raw
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| format!("'{}' is not an integer: {}", raw, e)),
            ValueKind::Number { integral: false } => raw
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|e| format!("'{}' is not a number: {}", raw, e)),
            ValueKind::Temporal => parse_temporal(raw).map(FieldValue::DateTime),
            ValueKind::Boolean => raw
                .parse::<bool>()
                .map(FieldValue::Boolean)
                .map_err(|e| format!("'{}' is not a boolean: {}", raw, e)),
            _ => Ok(Self::infer(raw)),
        }
    }

    /// Best-effort typing of a raw value when no declaration is known
    pub fn infer(raw: &str) -> FieldValue {
        if let Ok(i) = raw.parse::<i64>() {
            FieldValue::Integer(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            FieldValue::Float(f)
        } else if let Ok(dt) = parse_temporal(raw) {
            FieldValue::DateTime(dt)
        } else {
            FieldValue::String(raw.to_string())
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) | FieldValue::Enum(s) => {
                write!(f, "'{}'", s.replace('\'', "''"))
            }
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Uuid(u) => write!(f, "'{}'", u),
            FieldValue::DateTime(dt) => write!(f, "'{}'", dt.to_rfc3339()),
            FieldValue::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Json(v) => write!(f, "'{}'", v),
        }
    }
}

fn parse_temporal(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{}' is not a date-time", raw))
}

/// Kind of value a declared field holds
///
/// Drives both the compiler's predicate choice and the documentation
/// schema of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number { integral: bool },
    Boolean,
    Temporal,
    Enum { variants: &'static [&'static str] },
    Collection,
    Array,
    Other,
}

impl ValueKind {
    /// Numeric and temporal kinds support ordering
    pub fn is_rangeable(&self) -> bool {
        matches!(self, ValueKind::Number { .. } | ValueKind::Temporal)
    }
}

/// Types that can be declared as filter or record fields
pub trait FieldType: Sized + Clone + Send + Sync + 'static {
    fn kind() -> ValueKind;

    fn to_field_value(&self) -> FieldValue;

    /// Parse a single query-string value
    fn parse_param(raw: &str) -> Result<Self, String>;
}

macro_rules! integral_field_type {
    ($($t:ty),*) => {
        $(
            impl FieldType for $t {
                fn kind() -> ValueKind {
                    ValueKind::Number { integral: true }
                }

                fn to_field_value(&self) -> FieldValue {
                    match i64::try_from(*self) {
                        Ok(i) => FieldValue::Integer(i),
                        Err(_) => FieldValue::Float(*self as f64),
                    }
                }

                fn parse_param(raw: &str) -> Result<Self, String> {
                    raw.trim()
                        .parse::<$t>()
                        .map_err(|e| format!("'{}' is not an integer: {}", raw, e))
                }
            }
        )*
    };
}

integral_field_type!(i16, i32, i64, u16, u32, u64);

macro_rules! float_field_type {
    ($($t:ty),*) => {
        $(
            impl FieldType for $t {
                fn kind() -> ValueKind {
                    ValueKind::Number { integral: false }
                }

                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Float(*self as f64)
                }

                fn parse_param(raw: &str) -> Result<Self, String> {
                    raw.trim()
                        .parse::<$t>()
                        .map_err(|e| format!("'{}' is not a number: {}", raw, e))
                }
            }
        )*
    };
}

float_field_type!(f32, f64);

impl FieldType for String {
    fn kind() -> ValueKind {
        ValueKind::String
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.clone())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FieldType for bool {
    fn kind() -> ValueKind {
        ValueKind::Boolean
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse::<bool>()
            .map_err(|e| format!("'{}' is not a boolean: {}", raw, e))
    }
}

impl FieldType for Uuid {
    fn kind() -> ValueKind {
        ValueKind::Other
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        Uuid::parse_str(raw.trim()).map_err(|e| format!("'{}' is not a UUID: {}", raw, e))
    }
}

impl FieldType for DateTime<Utc> {
    fn kind() -> ValueKind {
        ValueKind::Temporal
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        parse_temporal(raw.trim())
    }
}

impl FieldType for NaiveDateTime {
    fn kind() -> ValueKind {
        ValueKind::Temporal
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(self.and_utc())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        parse_temporal(raw.trim()).map(|dt| dt.naive_utc())
    }
}

impl FieldType for NaiveDate {
    fn kind() -> ValueKind {
        ValueKind::Temporal
    }

    fn to_field_value(&self) -> FieldValue {
        self.and_hms_opt(0, 0, 0)
            .map(|naive| FieldValue::DateTime(naive.and_utc()))
            .unwrap_or(FieldValue::Null)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| format!("'{}' is not a date: {}", raw, e))
    }
}

impl FieldType for serde_json::Value {
    fn kind() -> ValueKind {
        ValueKind::Other
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Json(self.clone())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).or_else(|_| Ok(serde_json::Value::String(raw.to_string())))
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> ValueKind {
        T::kind()
    }

    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map(FieldType::to_field_value)
            .unwrap_or(FieldValue::Null)
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            Ok(None)
        } else {
            T::parse_param(raw).map(Some)
        }
    }
}

/// Split a comma-separated query value into parsed elements
fn parse_elements<T: FieldType>(raw: &str) -> Result<Vec<T>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(T::parse_param)
        .collect()
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::Collection
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldType::to_field_value).collect())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        parse_elements(raw)
    }
}

impl<T: FieldType + Eq + Hash> FieldType for HashSet<T> {
    fn kind() -> ValueKind {
        ValueKind::Collection
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldType::to_field_value).collect())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        parse_elements(raw).map(|items| items.into_iter().collect())
    }
}

impl<T: FieldType + Ord> FieldType for BTreeSet<T> {
    fn kind() -> ValueKind {
        ValueKind::Collection
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldType::to_field_value).collect())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        parse_elements(raw).map(|items| items.into_iter().collect())
    }
}

impl<T: FieldType> FieldType for Box<[T]> {
    fn kind() -> ValueKind {
        ValueKind::Array
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldType::to_field_value).collect())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        parse_elements(raw).map(Vec::into_boxed_slice)
    }
}

impl<T: FieldType, const N: usize> FieldType for [T; N] {
    fn kind() -> ValueKind {
        ValueKind::Array
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldType::to_field_value).collect())
    }

    fn parse_param(raw: &str) -> Result<Self, String> {
        let items = parse_elements::<T>(raw)?;
        let len = items.len();
        items
            .try_into()
            .map_err(|_| format!("expected {} comma-separated values, got {}", N, len))
    }
}

/// Out-of-band marker requesting a null or not-null match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Null,
    NotNull,
}

/// State of a single filter field
///
/// A field is either left unset (no predicate), holds a concrete value, or
/// carries a null / not-null sentinel. Setting a sentinel replaces any value
/// previously stored in the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterField<T> {
    Unset,
    Value(T),
    IsNull,
    IsNotNull,
}

impl<T> Default for FilterField<T> {
    fn default() -> Self {
        FilterField::Unset
    }
}

impl<T> From<T> for FilterField<T> {
    fn from(value: T) -> Self {
        FilterField::Value(value)
    }
}

impl<T> FilterField<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, FilterField::Unset)
    }

    /// The concrete value, if one is set
    pub fn value(&self) -> Option<&T> {
        match self {
            FilterField::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn set(&mut self, value: T) {
        *self = FilterField::Value(value);
    }

    pub fn mark(&mut self, sentinel: Sentinel) {
        *self = match sentinel {
            Sentinel::Null => FilterField::IsNull,
            Sentinel::NotNull => FilterField::IsNotNull,
        };
    }

    pub fn clear(&mut self) {
        *self = FilterField::Unset;
    }
}

impl<T: FieldType> FilterField<T> {
    /// Type-erased view used by the criteria compiler
    pub fn to_slot(&self) -> FilterField<FieldValue> {
        match self {
            FilterField::Unset => FilterField::Unset,
            FilterField::Value(v) => FilterField::Value(v.to_field_value()),
            FilterField::IsNull => FilterField::IsNull,
            FilterField::IsNotNull => FilterField::IsNotNull,
        }
    }
}

impl<T: Serialize> Serialize for FilterField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterField::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FilterField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?
            .map_or(FilterField::Unset, FilterField::Value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert_eq!(value.as_string(), None);
    }

    #[test]
    fn test_numeric_comparison_across_kinds() {
        let int = FieldValue::Integer(10);
        let float = FieldValue::Float(10.5);
        assert_eq!(int.compare(&float), Some(Ordering::Less));
        assert!(FieldValue::Integer(3).loosely_equals(&FieldValue::Float(3.0)));
    }

    #[test]
    fn test_enum_equals_its_name() {
        let stored = FieldValue::Enum("ACTIVE".to_string());
        assert!(stored.loosely_equals(&FieldValue::String("ACTIVE".to_string())));
        assert!(!stored.loosely_equals(&FieldValue::String("INACTIVE".to_string())));
    }

    #[test]
    fn test_uuid_compares_with_its_string_form() {
        let id = Uuid::new_v4();
        assert!(FieldValue::Uuid(id).loosely_equals(&FieldValue::String(id.to_string())));
        assert!(FieldValue::String(id.to_string()).loosely_equals(&FieldValue::Uuid(id)));
    }

    #[test]
    fn test_null_is_incomparable() {
        assert_eq!(FieldValue::Null.compare(&FieldValue::Integer(1)), None);
        assert!(!FieldValue::Null.loosely_equals(&FieldValue::Null));
    }

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(FieldValue::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(FieldValue::Integer(10).to_string(), "10");
        let list = FieldValue::List(vec!["a".to_string().to_field_value(), 2i32.to_field_value()]);
        assert_eq!(list.to_string(), "('a', 2)");
    }

    #[test]
    fn test_parse_as_kinds() {
        assert_eq!(
            FieldValue::parse_as(ValueKind::Number { integral: true }, "15").unwrap(),
            FieldValue::Integer(15)
        );
        assert_eq!(
            FieldValue::parse_as(ValueKind::Number { integral: false }, "1.5").unwrap(),
            FieldValue::Float(1.5)
        );
        assert!(FieldValue::parse_as(ValueKind::Number { integral: true }, "abc").is_err());
        assert!(matches!(
            FieldValue::parse_as(ValueKind::Temporal, "2024-01-31T10:00:00").unwrap(),
            FieldValue::DateTime(_)
        ));
        assert!(matches!(
            FieldValue::parse_as(ValueKind::Temporal, "2024-01-31").unwrap(),
            FieldValue::DateTime(_)
        ));
    }

    #[test]
    fn test_infer_without_declaration() {
        assert_eq!(FieldValue::infer("7"), FieldValue::Integer(7));
        assert_eq!(FieldValue::infer("7.25"), FieldValue::Float(7.25));
        assert_eq!(FieldValue::infer("abc"), FieldValue::String("abc".into()));
    }

    #[test]
    fn test_field_type_kinds() {
        assert_eq!(<i32 as FieldType>::kind(), ValueKind::Number { integral: true });
        assert_eq!(<f64 as FieldType>::kind(), ValueKind::Number { integral: false });
        assert_eq!(<Option<String> as FieldType>::kind(), ValueKind::String);
        assert_eq!(<Vec<String> as FieldType>::kind(), ValueKind::Collection);
        assert_eq!(<HashSet<i64> as FieldType>::kind(), ValueKind::Collection);
        assert_eq!(<[String; 2] as FieldType>::kind(), ValueKind::Array);
        assert_eq!(<NaiveDateTime as FieldType>::kind(), ValueKind::Temporal);
        assert_eq!(<Uuid as FieldType>::kind(), ValueKind::Other);
    }

    #[test]
    fn test_collection_parse_splits_commas() {
        let tags = <Vec<String> as FieldType>::parse_param("tag1, tag2,,tag3").unwrap();
        assert_eq!(tags, vec!["tag1", "tag2", "tag3"]);
        assert!(<Vec<i32> as FieldType>::parse_param("1,x").is_err());
        assert!(<[i32; 2] as FieldType>::parse_param("1,2,3").is_err());
    }

    #[test]
    fn test_optional_field_lowers_none_to_null() {
        let missing: Option<String> = None;
        assert_eq!(missing.to_field_value(), FieldValue::Null);
    }

    #[test]
    fn test_sentinel_replaces_value() {
        let mut field = FilterField::Value("test".to_string());
        field.mark(Sentinel::Null);
        assert_eq!(field, FilterField::IsNull);
        assert_eq!(field.value(), None);
    }

    #[test]
    fn test_filter_field_serde_maps_null_to_unset() {
        let field: FilterField<i32> = serde_json::from_str("null").unwrap();
        assert!(field.is_unset());
        let field: FilterField<i32> = serde_json::from_str("10").unwrap();
        assert_eq!(field, FilterField::Value(10));
        assert_eq!(serde_json::to_string(&FilterField::<i32>::IsNull).unwrap(), "null");
    }

    #[test]
    fn test_serde_roundtrip_integer() {
        let original = FieldValue::Integer(42);
        let json = serde_json::to_string(&original).expect("serialize should succeed");
        let restored: FieldValue =
            serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(original, restored);
    }
}
