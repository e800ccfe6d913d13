//! # Sieve
//!
//! A dynamic filter-to-query compiler for paged entity listings.
//!
//! ## Features
//!
//! - **Field Classification**: Identifier, range and container fields detected from declarations
//! - **Criteria Compilation**: Filter value objects and range bounds lowered to one conjunction
//! - **Pagination**: Page fetch and total count run concurrently against the same criteria
//! - **Parameter Docs**: Query parameter descriptors generated for every filter type
//! - **Pluggable Engines**: In-memory engine built in, PostgreSQL behind the `postgres` feature
//! - **Configuration-Based**: Default options and page settings loaded from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sieve::prelude::*;
//!
//! impl_record!(Account, "accounts", {
//!     #[primary_id]
//!     id: Uuid,
//!     name: String,
//!     balance: f64,
//! });
//!
//! impl_filter_spec!(AccountFilter, {
//!     name: String,
//!     balance: f64,
//! });
//!
//! let factory = FilterFactory::new();
//! factory.initialize(Arc::new(InMemoryEngine::new()));
//! let accounts = factory.create_filter::<Account, Account>(|a| a)?;
//!
//! let mut filters = AccountFilter::default();
//! filters.name.set("acme".to_string());
//! let request = FilterRequest::new()
//!     .with_filters(filters)
//!     .with_ranges(RangeFilter::new().with("balance", Range::at_least(100.0)));
//!
//! let page = accounts.filter(&request).await?;
//! ```

pub mod config;
pub mod core;
pub mod docs;
pub mod entities;
pub mod filters;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ConfigError, FilterError, FilterResult, StorageError, ValidationError},
        extractors::{FilterBody, FilterQuery},
        field::{FieldType, FieldValue, FilterField, Sentinel, ValueKind},
        introspect::{FilterSpec, Introspect, Record},
        query::{Pageable, PaginationRequest, PaginationResponse, SortDirection},
        service::ExecutionEngine,
    };

    // === Macros ===
    pub use crate::{impl_field_enum, impl_filter_spec, impl_record};

    // === Filters ===
    pub use crate::filters::{
        Criteria, Criterion, FilterFactory, FilterOptions, FilterRequest, GenericFilter,
        OptionOverrides, Range, RangeFilter, classify, compile,
    };

    // === Docs ===
    pub use crate::docs::{ParameterDescriptor, customize, describe};

    // === Storage ===
    pub use crate::storage::InMemoryEngine;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresEngine;

    // === Config ===
    pub use crate::config::{FilterConfig, PaginationDefaults};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
