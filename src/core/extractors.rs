//! Axum extractors for filter requests
//!
//! - [`FilterQuery`] binds a [`FilterRequest`] from the query string
//! - [`FilterBody`] reads it from a JSON body
//!
//! Both reject with a [`FilterError`], so a bad request renders as the usual
//! `400` error response.

use std::ops::Deref;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::core::error::{FilterError, ValidationError};
use crate::core::introspect::FilterSpec;
use crate::filters::request::FilterRequest;

/// Filter request bound from query parameters
///
/// # Example
///
/// ```rust,ignore
/// async fn list_accounts(
///     State(filter): State<AccountFilterHandle>,
///     FilterQuery(request): FilterQuery<AccountFilter>,
/// ) -> Result<Json<PaginationResponse<AccountDto>>, FilterError> {
///     Ok(Json(filter.filter(&request).await?))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FilterQuery<F>(pub FilterRequest<F>);

impl<F> FilterQuery<F> {
    pub fn into_inner(self) -> FilterRequest<F> {
        self.0
    }
}

impl<F> Deref for FilterQuery<F> {
    type Target = FilterRequest<F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, F> FromRequestParts<S> for FilterQuery<F>
where
    S: Send + Sync,
    F: FilterSpec + Default,
{
    type Rejection = FilterError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(
            |rejection| ValidationError::InvalidParameter {
                parameter: "query".to_string(),
                value: parts.uri.query().unwrap_or_default().to_string(),
                message: rejection.body_text(),
            },
        )?;

        Ok(Self(FilterRequest::from_query_pairs(pairs)?))
    }
}

/// Filter request read from a JSON body
#[derive(Debug, Clone)]
pub struct FilterBody<F>(pub FilterRequest<F>);

impl<F> FilterBody<F> {
    pub fn into_inner(self) -> FilterRequest<F> {
        self.0
    }
}

impl<F> Deref for FilterBody<F> {
    type Target = FilterRequest<F>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, F> FromRequest<S> for FilterBody<F>
where
    S: Send + Sync,
    F: FilterSpec + DeserializeOwned,
{
    type Rejection = FilterError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<FilterRequest<F>>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::InvalidJson {
                message: rejection.body_text(),
            })?;

        Ok(Self(request))
    }
}
