//! Options controlling how a filter is compiled

use serde::{Deserialize, Serialize};

/// Filter behaviour switches
///
/// Both options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// Match text filters regardless of case
    pub case_insensitive_strings: bool,

    /// Also consider fields declared on the filter's ancestors
    pub include_inherited_fields: bool,
}

impl FilterOptions {
    pub fn defaults() -> Self {
        Self::default()
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive_strings = true;
        self
    }

    pub fn with_inherited_fields(mut self) -> Self {
        self.include_inherited_fields = true;
        self
    }
}

/// Options sent with a single request
///
/// Only the switches that were actually sent are `Some`; the rest keep the
/// filter's configured values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_insensitive_strings: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_inherited_fields: Option<bool>,
}

impl OptionOverrides {
    pub fn apply(&self, base: FilterOptions) -> FilterOptions {
        FilterOptions {
            case_insensitive_strings: self
                .case_insensitive_strings
                .unwrap_or(base.case_insensitive_strings),
            include_inherited_fields: self
                .include_inherited_fields
                .unwrap_or(base.include_inherited_fields),
        }
    }
}

impl From<FilterOptions> for OptionOverrides {
    fn from(options: FilterOptions) -> Self {
        Self {
            case_insensitive_strings: Some(options.case_insensitive_strings),
            include_inherited_fields: Some(options.include_inherited_fields),
        }
    }
}
