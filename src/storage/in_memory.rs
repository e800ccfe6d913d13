//! In-memory execution engine for testing and development

use crate::core::field::FieldValue;
use crate::core::introspect::Record;
use crate::core::query::{Pageable, SortDirection};
use crate::core::service::ExecutionEngine;
use crate::filters::criteria::Criteria;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory execution engine
///
/// Records are kept as JSON documents per table, in insertion order, and
/// decoded into the requested entity type on every query. Uses RwLock for
/// thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryEngine {
    tables: Arc<RwLock<HashMap<String, Vec<serde_json::Value>>>>,
}

impl InMemoryEngine {
    /// Create a new, empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record in its entity's table
    pub fn insert<E: Record + Serialize>(&self, record: &E) -> Result<()> {
        let document = serde_json::to_value(record)?;
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        tables
            .entry(E::table_name().to_string())
            .or_default()
            .push(document);

        Ok(())
    }

    /// Store several records of the same entity
    pub fn insert_all<'a, E, I>(&self, records: I) -> Result<()>
    where
        E: Record + Serialize + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        for record in records {
            self.insert(record)?;
        }
        Ok(())
    }

    /// Number of stored records of `E`
    pub fn len<E: Record>(&self) -> Result<usize> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.get(E::table_name()).map_or(0, Vec::len))
    }

    /// Remove every record of `E`
    pub fn clear<E: Record>(&self) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        tables.remove(E::table_name());
        Ok(())
    }

    fn matching<E>(&self, criteria: &Criteria) -> Result<Vec<E>>
    where
        E: Record + DeserializeOwned,
    {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let Some(documents) = tables.get(E::table_name()) else {
            return Ok(Vec::new());
        };

        let matcher = criteria.matcher();
        let mut records = Vec::new();
        for document in documents {
            let record: E = serde_json::from_value(document.clone()).map_err(|e| {
                anyhow!("Failed to decode record from '{}': {}", E::table_name(), e)
            })?;
            if matcher.matches(&record) {
                records.push(record);
            }
        }

        Ok(records)
    }
}

/// Order two stored values the way SQL does: nulls sort after everything
fn compare_stored(a: Option<FieldValue>, b: Option<FieldValue>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(a), Some(b)) => a.compare(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl ExecutionEngine for InMemoryEngine {
    async fn select<E>(&self, criteria: &Criteria, pageable: &Pageable) -> Result<Vec<E>>
    where
        E: Record + DeserializeOwned,
    {
        let mut records = self.matching::<E>(criteria)?;

        if let Some(sort) = &pageable.sort {
            records.sort_by(|a, b| {
                let ordering = compare_stored(a.field_value(&sort.field), b.field_value(&sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let offset = usize::try_from(pageable.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(pageable.page_size).unwrap_or(usize::MAX);

        tracing::debug!(
            table = E::table_name(),
            matched = records.len(),
            offset,
            size,
            "Selecting page from memory"
        );

        Ok(records.into_iter().skip(offset).take(size).collect())
    }

    async fn count<E>(&self, criteria: &Criteria) -> Result<u64>
    where
        E: Record + DeserializeOwned,
    {
        Ok(self.matching::<E>(criteria)?.len() as u64)
    }
}
