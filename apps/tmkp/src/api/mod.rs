//! # tmkp HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `POST /query?strict=&limit=` - Answer a query graph
//! - `POST /transpile?strict=&limit=` - Compile a query graph to SPARQL
//! - `POST /subquery` - Relax a query graph by one edge
//! - `GET /status` - Store endpoint and prefix table
//! - `GET /health` - Health check
//!
//! ## Security Configuration
//!
//! - `cors_origins` / `TMKP_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `rate_limit` / `TMKP_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `api_key` / `TMKP_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::ApiKey;
pub use middleware::create_rate_limiter;
// Re-export handlers and types for integration tests (via `tmkp::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    health_handler, query_handler, status_handler, subquery_handler, transpile_handler,
};
#[allow(unused_imports)]
pub use types::{
    ErrorResponse, HealthResponse, QueryInput, QueryMessage, QueryParams, QueryRequest,
    StatusResponse,
};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tmkp_core::TmkpError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// The translation pipeline bound to the store.
    pub pipeline: Pipeline,
    /// Effective configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pipeline: Pipeline, config: AppConfig) -> Self {
        Self {
            pipeline,
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `"*"`: allows all origins
/// - not set: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (TMKP_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit (2 MB)
/// 4. Rate Limiting - if enabled
/// 5. Authentication - if a key is configured
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = build_cors_layer(server.cors_origins.as_deref());

    let rate_limiter = create_rate_limiter(server.rate_limit);
    match rate_limiter {
        Some(_) => tracing::info!("Rate limiting enabled: {} requests/second", server.rate_limit),
        None => tracing::info!("Rate limiting disabled"),
    }

    let api_key = ApiKey::from_config(server.api_key.as_deref());
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set TMKP_API_KEY to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/query", post(handlers::query_handler))
        .route("/transpile", post(handlers::transpile_handler))
        .route("/subquery", post(handlers::subquery_handler));

    if let Some(key) = api_key {
        router = router.layer(axum_middleware::from_fn_with_state(
            key,
            auth::api_key_auth_middleware,
        ));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), TmkpError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TmkpError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("tmkp HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| TmkpError::Io(format!("Server error: {}", e)))
}
