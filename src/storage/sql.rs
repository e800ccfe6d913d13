//! SQL rendering of compiled criteria
//!
//! Renders a [`Criteria`] into a parameterized `WHERE` condition so a
//! relational engine can bind it. Field names come from registered type
//! descriptors and are quoted; values are always passed as parameters.
//!
//! # Differences between dialects
//!
//! - `$1`, `$2` placeholders on PostgreSQL, `?` on MySQL
//! - `"field"` quoting on PostgreSQL, `` `field` `` on MySQL
//! - case-insensitive `LIKE` uses `ILIKE` on PostgreSQL and
//!   `LOWER(field) LIKE LOWER(?)` on MySQL

use crate::core::field::FieldValue;
use crate::core::query::Pageable;
use crate::filters::criteria::{Criteria, Criterion};

/// Placeholder and quoting conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    Postgres,
    MySql,
}

impl SqlDialect {
    /// Quote an identifier, doubling any embedded quote character
    pub fn quote(&self, identifier: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("\"{}\"", identifier.replace('"', "\"\"")),
            SqlDialect::MySql => format!("`{}`", identifier.replace('`', "``")),
        }
    }

    fn placeholder(&self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", index),
            SqlDialect::MySql => "?".to_string(),
        }
    }
}

/// A rendered condition and the values to bind, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

struct Renderer {
    dialect: SqlDialect,
    params: Vec<FieldValue>,
}

impl Renderer {
    fn bind(&mut self, value: &FieldValue) -> String {
        self.params.push(value.clone());
        self.dialect.placeholder(self.params.len())
    }

    fn render(&mut self, criterion: &Criterion) -> String {
        let column = self.dialect.quote(criterion.field());
        match criterion {
            Criterion::Equals { value, .. } => format!("{} = {}", column, self.bind(value)),
            Criterion::Like {
                pattern,
                case_insensitive: false,
                ..
            } => format!("{} LIKE {}", column, self.bind(&FieldValue::String(pattern.clone()))),
            Criterion::Like {
                pattern,
                case_insensitive: true,
                ..
            } => {
                let placeholder = self.bind(&FieldValue::String(pattern.clone()));
                match self.dialect {
                    SqlDialect::Postgres => format!("{} ILIKE {}", column, placeholder),
                    SqlDialect::MySql => {
                        format!("LOWER({}) LIKE LOWER({})", column, placeholder)
                    }
                }
            }
            Criterion::In { values, .. } => {
                let placeholders: Vec<String> = values.iter().map(|v| self.bind(v)).collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
            Criterion::Between { from, to, .. } => {
                let from = self.bind(from);
                let to = self.bind(to);
                format!("{} BETWEEN {} AND {}", column, from, to)
            }
            Criterion::GreaterOrEqual { value, .. } => {
                format!("{} >= {}", column, self.bind(value))
            }
            Criterion::LessOrEqual { value, .. } => {
                format!("{} <= {}", column, self.bind(value))
            }
            Criterion::IsNull { .. } => format!("{} IS NULL", column),
            Criterion::IsNotNull { .. } => format!("{} IS NOT NULL", column),
        }
    }
}

/// Render criteria as a `WHERE` condition (without the keyword)
///
/// An empty conjunction renders as `TRUE`.
pub fn render_where(criteria: &Criteria, dialect: SqlDialect) -> SqlFragment {
    if criteria.is_empty() {
        return SqlFragment {
            sql: "TRUE".to_string(),
            params: Vec::new(),
        };
    }

    let mut renderer = Renderer {
        dialect,
        params: Vec::new(),
    };
    let conditions: Vec<String> = criteria.iter().map(|c| renderer.render(c)).collect();

    SqlFragment {
        sql: conditions.join(" AND "),
        params: renderer.params,
    }
}

/// Render the `ORDER BY` / `LIMIT` / `OFFSET` tail of a page query
pub fn render_page(pageable: &Pageable, dialect: SqlDialect) -> String {
    let mut sql = String::new();
    if let Some(sort) = &pageable.sort {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            dialect.quote(&sort.field),
            sort.direction.as_str()
        ));
    }
    sql.push_str(&format!(
        " LIMIT {} OFFSET {}",
        pageable.page_size,
        pageable.offset()
    ));
    sql
}
