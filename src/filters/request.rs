//! Filter requests and query-string binding
//!
//! A [`FilterRequest`] bundles everything a caller can send for one
//! listing: the filter value object, range bounds, a page request and
//! options. It can be deserialized from JSON or bound from the documented
//! query parameters:
//!
//! ```text
//! filters.<field>=<value>
//! rangeFilters.ranges[<field>].from=<value>
//! rangeFilters.ranges[<field>].to=<value>
//! pagination.pageNumber | pageSize | sortBy | sortDirection
//! options.caseInsensitiveStrings | includeInheritedFields
//! ```

use crate::core::error::{FilterError, FilterResult, ValidationError};
use crate::core::field::FieldValue;
use crate::core::introspect::FilterSpec;
use crate::core::query::PaginationRequest;
use crate::filters::classifier::find_field;
use crate::filters::options::{FilterOptions, OptionOverrides};
use crate::filters::range::RangeFilter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const FILTERS_PREFIX: &str = "filters.";
const RANGES_PREFIX: &str = "rangeFilters.ranges[";
const PAGINATION_PREFIX: &str = "pagination.";
const OPTIONS_PREFIX: &str = "options.";

/// Everything needed to run one filtered, paged listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest<F> {
    pub filters: Option<F>,
    pub range_filters: Option<RangeFilter>,
    pub pagination: Option<PaginationRequest>,
    pub options: Option<OptionOverrides>,
}

impl<F> Default for FilterRequest<F> {
    fn default() -> Self {
        Self {
            filters: None,
            range_filters: None,
            pagination: None,
            options: None,
        }
    }
}

impl<F> FilterRequest<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: F) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_ranges(mut self, ranges: RangeFilter) -> Self {
        self.range_filters = Some(ranges);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationRequest) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Override every option for this request
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Override only the options set in `overrides`
    pub fn with_option_overrides(mut self, overrides: OptionOverrides) -> Self {
        self.options = Some(overrides);
        self
    }

    /// Options in effect for this request, starting from `base`
    pub fn effective_options(&self, base: FilterOptions) -> FilterOptions {
        self.options.map_or(base, |overrides| overrides.apply(base))
    }
}

impl<F: FilterSpec + Default> FilterRequest<F> {
    /// Bind a request from decoded query-string pairs
    ///
    /// Unknown parameter names and empty values are ignored. A value that
    /// cannot be parsed for its field yields a validation error.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> FilterResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if value.trim().is_empty() {
                continue;
            }

            if let Some(field) = key.strip_prefix(FILTERS_PREFIX) {
                request.bind_filter(key, field, value)?;
            } else if let Some(rest) = key.strip_prefix(RANGES_PREFIX) {
                request.bind_range(key, rest, value)?;
            } else if let Some(name) = key.strip_prefix(PAGINATION_PREFIX) {
                request.bind_pagination(key, name, value)?;
            } else if let Some(name) = key.strip_prefix(OPTIONS_PREFIX) {
                request.bind_option(key, name, value)?;
            } else {
                tracing::debug!(parameter = key, "Ignoring unknown query parameter");
            }
        }

        Ok(request)
    }

    fn bind_filter(&mut self, key: &str, field: &str, value: &str) -> FilterResult<()> {
        let filters = self.filters.get_or_insert_with(F::default);
        match filters.set_param(field, value) {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!(parameter = key, "Ignoring unknown filter field");
                Ok(())
            }
            Err(message) => Err(invalid(key, value, message)),
        }
    }

    fn bind_range(&mut self, key: &str, rest: &str, value: &str) -> FilterResult<()> {
        let Some((field, bound)) = rest.split_once(']') else {
            return Err(invalid(key, value, "malformed range parameter"));
        };

        let parsed = match find_field::<F>(field, true) {
            Some(descriptor) if descriptor.value_kind.is_rangeable() => {
                FieldValue::parse_as(descriptor.value_kind, value)
                    .map_err(|message| invalid(key, value, message))?
            }
            _ => FieldValue::infer(value.trim()),
        };

        let range = self
            .range_filters
            .get_or_insert_with(RangeFilter::default)
            .range_mut(field);
        match bound {
            ".from" => range.from = Some(parsed),
            ".to" => range.to = Some(parsed),
            _ => return Err(invalid(key, value, "expected '.from' or '.to'")),
        }
        Ok(())
    }

    fn bind_pagination(&mut self, key: &str, name: &str, value: &str) -> FilterResult<()> {
        let pagination = self
            .pagination
            .get_or_insert_with(PaginationRequest::default);
        match name {
            "pageNumber" => pagination.page_number = parse(key, value)?,
            "pageSize" => pagination.page_size = parse(key, value)?,
            "sortBy" => pagination.sort_by = Some(value.trim().to_string()),
            "sortDirection" => pagination.sort_direction = parse(key, value)?,
            _ => tracing::debug!(parameter = key, "Ignoring unknown pagination parameter"),
        }
        Ok(())
    }

    fn bind_option(&mut self, key: &str, name: &str, value: &str) -> FilterResult<()> {
        let options = self.options.get_or_insert_with(OptionOverrides::default);
        match name {
            "caseInsensitiveStrings" => options.case_insensitive_strings = Some(parse(key, value)?),
            "includeInheritedFields" => options.include_inherited_fields = Some(parse(key, value)?),
            _ => tracing::debug!(parameter = key, "Ignoring unknown option"),
        }
        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> FilterResult<T>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, e.to_string()))
}

fn invalid(key: &str, value: &str, message: impl Into<String>) -> FilterError {
    ValidationError::InvalidParameter {
        parameter: key.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
    .into()
}
