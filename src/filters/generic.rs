//! Filter factory and the per-entity generic filter
//!
//! The [`FilterFactory`] holds the registered execution engine. Every
//! [`GenericFilter`] it creates compiles a [`FilterRequest`] and runs the
//! paged fetch and count against that engine.
//!
//! # Example
//!
//! ```rust,ignore
//! let factory = FilterFactory::with_config(FilterConfig::from_yaml_file("filters.yaml")?);
//! factory.initialize(Arc::new(InMemoryEngine::new()));
//!
//! let accounts = factory.create_filter::<Account, AccountDto>(AccountDto::from)?;
//! let page = accounts.filter(&request).await?;
//! ```

use crate::config::FilterConfig;
use crate::core::error::{ConfigError, FilterResult};
use crate::core::introspect::{FilterSpec, Record};
use crate::core::query::{PaginationRequest, PaginationResponse, paginate};
use crate::core::service::ExecutionEngine;
use crate::filters::compiler::compile;
use crate::filters::criteria::Criteria;
use crate::filters::options::FilterOptions;
use crate::filters::request::FilterRequest;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

type Mapper<E, D> = Arc<dyn Fn(E) -> D + Send + Sync>;

/// Creates generic filters bound to one execution engine
pub struct FilterFactory<X: ExecutionEngine> {
    engine: OnceLock<Arc<X>>,
    config: FilterConfig,
}

impl<X: ExecutionEngine> Default for FilterFactory<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: ExecutionEngine> FilterFactory<X> {
    pub fn new() -> Self {
        Self::with_config(FilterConfig::default())
    }

    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            engine: OnceLock::new(),
            config,
        }
    }

    /// Register the execution engine
    ///
    /// Only the first registration takes effect.
    pub fn initialize(&self, engine: Arc<X>) {
        if self.engine.set(engine).is_err() {
            tracing::warn!("Filter factory already initialized, keeping the existing engine");
        } else {
            tracing::info!("Filter factory initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn engine(&self) -> FilterResult<Arc<X>> {
        self.engine
            .get()
            .cloned()
            .ok_or_else(|| ConfigError::NotInitialized.into())
    }

    /// Create a filter for entity `E` using the configured default options
    pub fn create_filter<E, D>(
        &self,
        mapper: impl Fn(E) -> D + Send + Sync + 'static,
    ) -> FilterResult<GenericFilter<E, D, X>>
    where
        E: Record + DeserializeOwned,
    {
        self.create_filter_with_options(mapper, self.config.default_options)
    }

    /// Create a filter for entity `E` with explicit options
    pub fn create_filter_with_options<E, D>(
        &self,
        mapper: impl Fn(E) -> D + Send + Sync + 'static,
        options: FilterOptions,
    ) -> FilterResult<GenericFilter<E, D, X>>
    where
        E: Record + DeserializeOwned,
    {
        let engine = self.engine()?;
        tracing::debug!(table = E::table_name(), "Creating generic filter");

        Ok(GenericFilter {
            engine,
            mapper: Arc::new(mapper),
            options,
            default_page: self.config.default_page_request(),
            max_page_size: self.config.pagination.max_page_size,
            _entity: PhantomData,
        })
    }
}

/// Filters one entity type and maps results to `D`
pub struct GenericFilter<E, D, X> {
    engine: Arc<X>,
    mapper: Mapper<E, D>,
    options: FilterOptions,
    default_page: PaginationRequest,
    max_page_size: u64,
    _entity: PhantomData<fn() -> E>,
}

impl<E, D, X> Clone for GenericFilter<E, D, X> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            mapper: Arc::clone(&self.mapper),
            options: self.options,
            default_page: self.default_page.clone(),
            max_page_size: self.max_page_size,
            _entity: PhantomData,
        }
    }
}

impl<E, D, X> GenericFilter<E, D, X>
where
    E: Record + DeserializeOwned,
    X: ExecutionEngine,
{
    pub fn options(&self) -> FilterOptions {
        self.options
    }

    /// Compile a request; options it sends win over the filter's
    pub fn criteria<F: FilterSpec>(&self, request: &FilterRequest<F>) -> Criteria {
        let options = request.effective_options(self.options);
        compile::<F, E>(
            request.filters.as_ref(),
            request.range_filters.as_ref(),
            &options,
        )
    }

    /// Compile a request and fetch the requested page
    pub async fn filter<F: FilterSpec>(
        &self,
        request: &FilterRequest<F>,
    ) -> FilterResult<PaginationResponse<D>> {
        let criteria = self.criteria(request);
        let mut page = request
            .pagination
            .clone()
            .unwrap_or_else(|| self.default_page.clone());

        if page.page_size > self.max_page_size {
            tracing::debug!(
                requested = page.page_size,
                max = self.max_page_size,
                "Clamping page size"
            );
            page.page_size = self.max_page_size;
        }

        tracing::debug!(
            table = E::table_name(),
            criteria = %criteria,
            "Running filter"
        );

        let engine = &self.engine;
        let criteria = &criteria;
        paginate(
            &page,
            |entity| (self.mapper)(entity),
            move |pageable| async move { engine.select::<E>(criteria, &pageable).await },
            move || engine.count::<E>(criteria),
        )
        .await
    }
}
