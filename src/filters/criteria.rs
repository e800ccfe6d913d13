//! Compiled predicate tree
//!
//! A [`Criteria`] is a conjunction of [`Criterion`] leaves. An empty
//! conjunction matches every record.

use crate::core::field::FieldValue;
use crate::core::introspect::Record;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A single predicate on one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Criterion {
    Equals {
        field: String,
        value: FieldValue,
    },
    /// SQL `LIKE` with `%` and `_` wildcards
    Like {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    In {
        field: String,
        values: Vec<FieldValue>,
    },
    /// Inclusive of both bounds
    Between {
        field: String,
        from: FieldValue,
        to: FieldValue,
    },
    GreaterOrEqual {
        field: String,
        value: FieldValue,
    },
    LessOrEqual {
        field: String,
        value: FieldValue,
    },
    IsNull {
        field: String,
    },
    IsNotNull {
        field: String,
    },
}

impl Criterion {
    pub fn field(&self) -> &str {
        match self {
            Criterion::Equals { field, .. }
            | Criterion::Like { field, .. }
            | Criterion::In { field, .. }
            | Criterion::Between { field, .. }
            | Criterion::GreaterOrEqual { field, .. }
            | Criterion::LessOrEqual { field, .. }
            | Criterion::IsNull { field }
            | Criterion::IsNotNull { field } => field,
        }
    }

    /// Evaluate against a stored value (`None` when the field is absent)
    pub fn matches_value(&self, stored: Option<&FieldValue>) -> bool {
        self.evaluate(stored, self.like_regex().as_ref())
    }

    /// Compiled form of a `Like` pattern, `None` for other leaves
    fn like_regex(&self) -> Option<Regex> {
        let Criterion::Like {
            pattern,
            case_insensitive,
            ..
        } = self
        else {
            return None;
        };

        like_to_regex(pattern, *case_insensitive)
            .map_err(|e| tracing::warn!(pattern = %pattern, "Invalid LIKE pattern: {}", e))
            .ok()
    }

    fn evaluate(&self, stored: Option<&FieldValue>, like: Option<&Regex>) -> bool {
        let stored = match stored {
            Some(FieldValue::Null) | None => {
                return matches!(self, Criterion::IsNull { .. });
            }
            Some(value) => value,
        };

        match self {
            Criterion::IsNull { .. } => false,
            Criterion::IsNotNull { .. } => true,
            Criterion::Equals { value, .. } => stored.loosely_equals(value),
            Criterion::Like { .. } => match (stored.as_string(), like) {
                (Some(text), Some(regex)) => regex.is_match(text),
                _ => false,
            },
            Criterion::In { values, .. } => match stored.as_list() {
                Some(items) => items
                    .iter()
                    .any(|item| values.iter().any(|v| item.loosely_equals(v))),
                None => values.iter().any(|v| stored.loosely_equals(v)),
            },
            Criterion::Between { from, to, .. } => {
                matches!(
                    stored.compare(from),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(stored.compare(to), Some(Ordering::Less | Ordering::Equal))
            }
            Criterion::GreaterOrEqual { value, .. } => {
                matches!(
                    stored.compare(value),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }
            Criterion::LessOrEqual { value, .. } => {
                matches!(stored.compare(value), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Equals { field, value } => write!(f, "{} = {}", field, value),
            Criterion::Like {
                field,
                pattern,
                case_insensitive: false,
            } => write!(f, "{} LIKE {}", field, FieldValue::String(pattern.clone())),
            Criterion::Like {
                field,
                pattern,
                case_insensitive: true,
            } => write!(
                f,
                "LOWER({}) LIKE {}",
                field,
                FieldValue::String(pattern.to_lowercase())
            ),
            Criterion::In { field, values } => {
                write!(f, "{} IN {}", field, FieldValue::List(values.clone()))
            }
            Criterion::Between { field, from, to } => {
                write!(f, "{} BETWEEN {} AND {}", field, from, to)
            }
            Criterion::GreaterOrEqual { field, value } => write!(f, "{} >= {}", field, value),
            Criterion::LessOrEqual { field, value } => write!(f, "{} <= {}", field, value),
            Criterion::IsNull { field } => write!(f, "{} IS NULL", field),
            Criterion::IsNotNull { field } => write!(f, "{} IS NOT NULL", field),
        }
    }
}

/// Translate a SQL `LIKE` pattern into an anchored regular expression
pub fn like_to_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, regex::Error> {
    let mut expression = String::with_capacity(pattern.len() + 8);
    if case_insensitive {
        expression.push_str("(?i)");
    }
    expression.push_str("(?s)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                expression.push_str(&regex::escape(&literal));
                literal.clear();
                expression.push_str(if c == '%' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    expression.push_str(&regex::escape(&literal));
    expression.push('$');
    Regex::new(&expression)
}

/// Conjunction of criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Criteria {
    criteria: Vec<Criterion>,
}

impl Criteria {
    /// The identity predicate matching every record
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_criteria(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    pub fn and(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }

    /// All leaves constraining the given field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Criterion> + 'a {
        self.criteria.iter().filter(move |c| c.field() == field)
    }

    /// Evaluate the conjunction against a record
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.matcher().matches(record)
    }

    /// Prepare the conjunction for evaluation over many records
    pub fn matcher(&self) -> CriteriaMatcher<'_> {
        CriteriaMatcher {
            leaves: self
                .criteria
                .iter()
                .map(|criterion| (criterion, criterion.like_regex()))
                .collect(),
        }
    }
}

/// Criteria with their LIKE patterns compiled once
#[derive(Debug)]
pub struct CriteriaMatcher<'a> {
    leaves: Vec<(&'a Criterion, Option<Regex>)>,
}

impl CriteriaMatcher<'_> {
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.leaves.iter().all(|(criterion, like)| {
            criterion.evaluate(record.field_value(criterion.field()).as_ref(), like.as_ref())
        })
    }
}

impl<'a> IntoIterator for &'a Criteria {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.criteria.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, criterion) in self.criteria.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", criterion)?;
        }
        Ok(())
    }
}
