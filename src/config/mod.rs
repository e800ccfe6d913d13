//! Configuration loading and management

use crate::core::error::{ConfigError, FilterResult};
use crate::core::query::{PaginationRequest, SortDirection};
use crate::filters::options::FilterOptions;
use serde::{Deserialize, Serialize};

/// Defaults applied when a request carries no page request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationDefaults {
    /// Page size used when the client does not send one
    pub page_size: u64,

    pub sort_direction: SortDirection,

    /// Upper bound on the page size a client may request
    pub max_page_size: u64,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            page_size: 10,
            sort_direction: SortDirection::Desc,
            max_page_size: 100,
        }
    }
}

/// Filter configuration
///
/// # Example
///
/// ```yaml
/// default_options:
///   caseInsensitiveStrings: true
/// pagination:
///   page_size: 20
///   sort_direction: ASC
///   max_page_size: 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Options used when a request does not carry its own
    pub default_options: FilterOptions,

    pub pagination: PaginationDefaults,
}

impl FilterConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> FilterResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> FilterResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the pagination defaults are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pagination = &self.pagination;
        if pagination.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_page_size".to_string(),
                value: pagination.max_page_size.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if pagination.page_size == 0 || pagination.page_size > pagination.max_page_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                value: pagination.page_size.to_string(),
                message: format!("must be between 1 and {}", pagination.max_page_size),
            });
        }
        Ok(())
    }

    /// The page request used when a request carries none
    pub fn default_page_request(&self) -> PaginationRequest {
        PaginationRequest {
            page_size: self.pagination.page_size,
            sort_direction: self.pagination.sort_direction,
            ..PaginationRequest::default()
        }
    }
}
