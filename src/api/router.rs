use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::catalog;
use super::health;
use super::middleware::{
    api_key_middleware, logging_middleware, metrics_middleware, security_headers_middleware,
};
use super::profiles;
use super::state::AppState;

/// Health probes only, for contexts without application state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/auth", auth::create_auth_router())
        .nest(
            "/profiles",
            profiles::create_profiles_router().merge(catalog::create_catalog_router()),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ));

    Router::new()
        // Health endpoints skip the API key check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .merge(protected)
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
