//! Page requests and the pagination composer
//!
//! A [`PaginationRequest`] is what the client sends; it becomes a
//! [`Pageable`] for the execution engine, and the engine's page plus total
//! count are assembled into a [`PaginationResponse`].

use crate::core::error::FilterResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use validator::Validate;

/// Sort direction of a page request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(format!("'{}' is not a sort direction (ASC or DESC)", raw)),
        }
    }
}

/// Page request sent by the client
///
/// # Example
/// ```rust,ignore
/// GET /accounts?pagination.pageNumber=2&pagination.pageSize=20&pagination.sortBy=name
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationRequest {
    /// Zero-based page number
    pub page_number: u64,

    /// Number of items per page
    #[validate(range(min = 1, message = "page size must be at least 1"))]
    pub page_size: u64,

    /// Field to sort by; unsorted when absent or empty
    pub sort_by: Option<String>,

    pub sort_direction: SortDirection,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: 10,
            sort_by: None,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl PaginationRequest {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_direction = direction;
        self
    }

    /// The engine-facing page descriptor
    pub fn to_pageable(&self) -> Pageable {
        let sort = self
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(|field| Sort {
                field: field.to_string(),
                direction: self.sort_direction,
            });

        Pageable {
            page_number: self.page_number,
            page_size: self.page_size,
            sort,
        }
    }
}

/// Sort order applied by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Page descriptor handed to an execution engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pageable {
    pub page_number: u64,
    pub page_size: u64,
    pub sort: Option<Sort>,
}

impl Pageable {
    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        self.page_number.saturating_mul(self.page_size)
    }

    pub fn is_unsorted(&self) -> bool {
        self.sort.is_none()
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse<T> {
    pub content: Vec<T>,

    /// Total number of matching records
    pub total_elements: u64,

    pub total_pages: u64,

    /// The requested page number
    pub current_page: u64,
}

impl<T> PaginationResponse<T> {
    pub fn new(content: Vec<T>, total_elements: u64, page_size: u64, current_page: u64) -> Self {
        let page_size = page_size.max(1);
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(page_size),
            current_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResponse<U> {
        PaginationResponse {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            current_page: self.current_page,
        }
    }
}

/// Run a paged fetch and a total count concurrently and assemble the page
///
/// The request is validated first. The first failure of either query
/// aborts the whole operation.
pub async fn paginate<E, D, M, Fetch, FetchFut, Count, CountFut>(
    request: &PaginationRequest,
    mapper: M,
    fetch: Fetch,
    count: Count,
) -> FilterResult<PaginationResponse<D>>
where
    M: Fn(E) -> D,
    Fetch: FnOnce(Pageable) -> FetchFut,
    FetchFut: Future<Output = anyhow::Result<Vec<E>>>,
    Count: FnOnce() -> CountFut,
    CountFut: Future<Output = anyhow::Result<u64>>,
{
    request.validate()?;

    let pageable = request.to_pageable();
    tracing::info!(
        page_number = pageable.page_number,
        page_size = pageable.page_size,
        sort_by = pageable.sort.as_ref().map(|s| s.field.as_str()),
        sort_direction = %request.sort_direction,
        "Processing paginated request"
    );

    let (page, total) = futures::try_join!(fetch(pageable), count())?;

    Ok(PaginationResponse::new(page, total, request.page_size, request.page_number).map(mapper))
}
