//! Execution engine trait

use crate::core::introspect::Record;
use crate::core::query::Pageable;
use crate::filters::criteria::Criteria;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Runs compiled criteria against a data source
///
/// Implementations decide how a [`Criteria`] is evaluated (in memory,
/// rendered to SQL, ...). Both operations must apply the same criteria so
/// the page and the total count agree.
#[async_trait]
pub trait ExecutionEngine: Send + Sync + 'static {
    /// Fetch one page of matching records of `E`
    async fn select<E>(&self, criteria: &Criteria, pageable: &Pageable) -> Result<Vec<E>>
    where
        E: Record + DeserializeOwned;

    /// Count all matching records of `E`
    async fn count<E>(&self, criteria: &Criteria) -> Result<u64>
    where
        E: Record + DeserializeOwned;
}
