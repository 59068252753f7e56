//! # Starmap HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET|POST /systems`, `GET|PUT|DELETE /systems/{system_id}`
//! - `GET /systems/system_population_sum/{system_id}` - Sum of planet populations
//! - `GET /systems/get_system_by_name/{system_name}` - Name to id lookup
//! - `GET|POST /planets`, `GET|PUT|DELETE /planets/{planet_id}`
//! - `GET|POST /stations`, `GET|PUT|DELETE /stations/{station_id}`
//!
//! Every handler runs against a shared [`RedbStore`]; system writes consult the
//! [`CommanderDirectory`] first.

pub mod error;
pub mod extract;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use error::{ApiError, ErrorResponse};
pub use middleware::{build_cors_layer, create_rate_limiter};

// Re-export handlers and types for integration tests (via `starmap::api::*`)
pub use handlers::{health_handler, planets, stations, systems};
pub use types::{CommanderQuery, HealthResponse, PopulationSumResponse, SystemNameResponse};

use crate::config::HttpConfig;
use crate::enrichment::CommanderDirectory;
use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware, routing::get};
use starmap_core::RedbStore;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the store and the commander directory.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RedbStore>,
    pub directory: Arc<dyn CommanderDirectory>,
}

impl AppState {
    #[must_use]
    pub fn new(store: RedbStore, directory: Arc<dyn CommanderDirectory>) -> Self {
        Self {
            store: Arc::new(store),
            directory,
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting - global quota (if enabled)
pub fn create_router(state: AppState, http: &HttpConfig) -> Router {
    let cors = build_cors_layer(&http.cors_origins);

    let rate_limiter = if http.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", http.rate_limit);
        Some(create_rate_limiter(http.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/systems",
            get(systems::list_systems).post(systems::create_system),
        )
        .route(
            "/systems/{system_id}",
            get(systems::get_system)
                .put(systems::update_system)
                .delete(systems::delete_system),
        )
        .route(
            "/systems/system_population_sum/{system_id}",
            get(systems::population_sum),
        )
        .route(
            "/systems/get_system_by_name/{system_name}",
            get(systems::get_system_by_name),
        )
        .route(
            "/planets",
            get(planets::list_planets).post(planets::create_planet),
        )
        .route(
            "/planets/{planet_id}",
            get(planets::get_planet)
                .put(planets::update_planet)
                .delete(planets::delete_planet),
        )
        .route(
            "/stations",
            get(stations::list_stations).post(stations::create_station),
        )
        .route(
            "/stations/{station_id}",
            get(stations::get_station)
                .put(stations::update_station)
                .delete(stations::delete_station),
        );

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server(addr: &str, state: AppState, http: &HttpConfig) -> std::io::Result<()> {
    let router = create_router(state, http);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Starmap HTTP server listening on {}", addr);
    axum::serve(listener, router).await
}
