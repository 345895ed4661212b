//! API Routes
//!
//! Configures the Axum router with the cache admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, health_handler, invalidate_handler, stats_handler, sweep_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /stats` - Per-cache statistics
/// - `POST /invalidate` - Remove entries whose key contains a tag
/// - `DELETE /caches/:name` - Clear one cache
/// - `POST /sweep` - Run an expiry sweep on every cache
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/caches/:name", delete(clear_handler))
        .route("/sweep", post(sweep_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
