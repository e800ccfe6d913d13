//! Typed error handling for sieve
//!
//! Compilation itself never fails: unreadable fields are logged and
//! skipped. Errors surface at the edges, when a request cannot be bound,
//! when configuration is missing or malformed, or when an execution engine
//! fails.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: missing engine registration and configuration parsing
//! - [`ValidationError`]: malformed query parameters and pagination requests
//! - [`StorageError`]: failures reported by an execution engine
//!
//! # Example
//!
//! ```rust,ignore
//! use sieve::prelude::*;
//!
//! match factory.create_filter::<Account, AccountDto>(AccountDto::from) {
//!     Ok(filter) => { /* ... */ }
//!     Err(FilterError::Config(ConfigError::NotInitialized)) => {
//!         eprintln!("register an execution engine first");
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type of the crate
#[derive(Debug)]
pub enum FilterError {
    /// Configuration and initialization errors
    Config(ConfigError),

    /// Request binding and validation errors
    Validation(ValidationError),

    /// Execution engine errors
    Storage(StorageError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Config(e) => write!(f, "{}", e),
            FilterError::Validation(e) => write!(f, "{}", e),
            FilterError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Config(e) => Some(e),
            FilterError::Validation(e) => Some(e),
            FilterError::Storage(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl FilterError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FilterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FilterError::Validation(_) => StatusCode::BAD_REQUEST,
            FilterError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::Config(e) => e.error_code(),
            FilterError::Validation(e) => e.error_code(),
            FilterError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            FilterError::Validation(ValidationError::InvalidParameter { parameter, value, .. }) => {
                Some(serde_json::json!({
                    "parameter": parameter,
                    "value": value
                }))
            }
            FilterError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration and initialization
#[derive(Debug)]
pub enum ConfigError {
    /// No execution engine has been registered with the factory
    NotInitialized,

    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotInitialized => {
                write!(f, "Filter factory is not initialized with an execution engine")
            }
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::NotInitialized => "NOT_INITIALIZED",
            _ => "CONFIG_ERROR",
        }
    }
}

impl From<ConfigError> for FilterError {
    fn from(err: ConfigError) -> Self {
        FilterError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to request binding and validation
#[derive(Debug)]
pub enum ValidationError {
    /// A query parameter could not be parsed
    InvalidParameter {
        parameter: String,
        value: String,
        message: String,
    },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidParameter {
                parameter,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for parameter '{}': {}",
                    value, parameter, message
                )
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidParameter { .. } => "INVALID_PARAMETER",
            _ => "VALIDATION_ERROR",
        }
    }
}

impl From<ValidationError> for FilterError {
    fn from(err: ValidationError) -> Self {
        FilterError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for FilterError {
    fn from(errors: validator::ValidationErrors) -> Self {
        FilterError::Validation(errors.into())
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by an execution engine
#[derive(Debug)]
pub enum StorageError {
    /// Query execution failed
    QueryFailed { message: String },

    /// A stored record could not be decoded
    Serialization { table: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QueryFailed { message } => {
                write!(f, "Query failed: {}", message)
            }
            StorageError::Serialization { table, message } => {
                write!(f, "Failed to decode record from '{}': {}", table, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for FilterError {
    fn from(err: StorageError) -> Self {
        FilterError::Storage(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        FilterError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for FilterError {
    fn from(err: serde_yaml::Error) -> Self {
        FilterError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Engines report failures through `anyhow`; they surface as storage errors
impl From<anyhow::Error> for FilterError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<FilterError>() {
            Ok(filter_err) => filter_err,
            Err(err) => FilterError::Storage(StorageError::QueryFailed {
                message: format!("{:#}", err),
            }),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for sieve operations
pub type FilterResult<T> = Result<T, FilterError>;

// =============================================================================
// Tests
// =============================================================================
