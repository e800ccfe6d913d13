//! Filtered account listing served over HTTP
//!
//! This example demonstrates:
//! - Declaring a record and its filter value object
//! - Registering an in-memory engine with the filter factory
//! - Binding filter requests from query parameters or a JSON body
//! - Serving the generated query parameter docs
//!
//! Try:
//! - `GET /accounts?filters.name=ac&pagination.sortBy=balance`
//! - `GET /accounts?rangeFilters.ranges[balance].from=1000`
//! - `GET /accounts/parameters`

use anyhow::Result;
use axum::Json;
use axum::extract::State;
use axum::routing::{get, post};
use sieve::docs::ParameterDescriptor;
use sieve::prelude::*;
use std::net::SocketAddr;

impl_field_enum!(AccountStatus {
    Active => "ACTIVE",
    Frozen => "FROZEN",
    Closed => "CLOSED",
});

impl_record!(Account, "accounts", {
    #[primary_id]
    id: Uuid,
    name: String,
    balance: f64,
    status: AccountStatus,
    opened_at: DateTime<Utc>,
});

impl_filter_spec!(AccountFilter, {
    name: String,
    balance: f64,
    status: AccountStatus,
    opened_at: DateTime<Utc>,
});

type AccountListing = GenericFilter<Account, Account, InMemoryEngine>;

async fn list_accounts(
    State(accounts): State<AccountListing>,
    FilterQuery(request): FilterQuery<AccountFilter>,
) -> Result<Json<PaginationResponse<Account>>, FilterError> {
    Ok(Json(accounts.filter(&request).await?))
}

async fn search_accounts(
    State(accounts): State<AccountListing>,
    FilterBody(request): FilterBody<AccountFilter>,
) -> Result<Json<PaginationResponse<Account>>, FilterError> {
    Ok(Json(accounts.filter(&request).await?))
}

async fn account_parameters() -> Json<Vec<ParameterDescriptor>> {
    Json(describe::<AccountFilter>())
}

fn seed(engine: &InMemoryEngine) -> Result<()> {
    let accounts = [
        ("Acme Corp", 12_500.0, AccountStatus::Active),
        ("Globex", 830.0, AccountStatus::Frozen),
        ("Initech", 4_200.0, AccountStatus::Active),
        ("Umbrella", 0.0, AccountStatus::Closed),
    ];

    for (name, balance, status) in accounts {
        engine.insert(&Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            balance,
            status,
            opened_at: Utc::now(),
        })?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = match FilterConfig::from_yaml_file("filters.yaml") {
        Ok(config) => config,
        Err(e) => {
            tracing::info!("Using default filter configuration: {}", e);
            FilterConfig::default()
        }
    };

    let engine = InMemoryEngine::new();
    seed(&engine)?;

    let factory = FilterFactory::with_config(config);
    factory.initialize(Arc::new(engine));
    let accounts = factory.create_filter::<Account, Account>(|account| account)?;

    let app = axum::Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/search", post(search_accounts))
        .route("/accounts/parameters", get(account_parameters))
        .with_state(accounts);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
