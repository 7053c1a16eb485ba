//! HTTP route handlers.
//!
//! Probe and identity routes are marked `no-store` so that no intermediary
//! ever answers an orchestrator probe from cache. The dashboard is private and
//! revalidated on every view since each view bumps the counter.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod dashboard;
pub mod health;
pub mod whoami;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use http::Method;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CorsConfig, CACHE_CONTROL_DASHBOARD, CACHE_CONTROL_NO_STORE};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Build the CORS policy from the configured origin allow-list.
///
/// Credentials are never allowed, which keeps the `*` wildcard valid.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origin = match cors {
        CorsConfig::AnyOrigin => {
            tracing::debug!("CORS: Allowing any origin");
            AllowOrigin::any()
        }
        CorsConfig::Origins(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!(origin = %origin, error = %e, "Skipping invalid CORS origin");
                        None
                    }
                })
                .collect();
            tracing::debug!(origins = ?origins, "CORS: Allowed origins");
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Creates the Axum router with all routes, cache headers and CORS.
pub fn create_router(state: AppState) -> Router {
    // Probes and identity - never cached
    let probe_routes = Router::new()
        .route("/live", get(health::live))
        .route("/ready", get(health::ready))
        .route("/health", get(health::health))
        .route("/whoami", get(whoami::whoami))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ));

    // Dashboard - per-visit content
    let dashboard_routes = Router::new()
        .route("/", get(dashboard::index))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_DASHBOARD),
        ));

    let cors = cors_layer(&state.config.cors);

    Router::new()
        .merge(probe_routes)
        .merge(dashboard_routes)
        .with_state(state)
        .layer(cors)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
