//! Core module containing the value model, type introspection, errors and
//! the execution engine seam

pub mod error;
pub mod extractors;
pub mod field;
pub mod introspect;
pub mod query;
pub mod service;

pub use error::{ConfigError, FilterError, FilterResult, StorageError, ValidationError};
pub use extractors::{FilterBody, FilterQuery};
pub use field::{FieldType, FieldValue, FilterField, Sentinel, ValueKind};
pub use introspect::{FieldDeclaration, FieldMarker, FilterSpec, Introspect, Record, TypeDescriptor};
pub use query::{Pageable, PaginationRequest, PaginationResponse, Sort, SortDirection, paginate};
pub use service::ExecutionEngine;
