//! HTTP routes for Vertex Relay
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod generate;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{middleware::auth::proxy_auth_middleware, AppState};

/// Largest accepted request body; inline images make Gemini payloads big
pub const MAX_REQUEST_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rotating endpoint, guarded by the proxy API key
    let protected_routes = Router::new()
        .route("/v1beta/models/*model_path", post(generate::proxy_generate))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            proxy_auth_middleware,
        ));

    // Frontend endpoint brings its own express key; probes and metrics are open
    let public_routes = Router::new()
        .route(
            "/frontend/v1beta/models/:model_op",
            post(generate::frontend_generate),
        )
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (applied to all routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
