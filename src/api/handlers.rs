//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse,
    SweepResponse,
};
use crate::registry::{CacheName, StorefrontCaches};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub caches: Arc<StorefrontCaches>,
}

impl AppState {
    pub fn new(caches: StorefrontCaches) -> Self {
        Self {
            caches: Arc::new(caches),
        }
    }

    /// Builds the caches (and starts their sweepers) from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(StorefrontCaches::init(config))
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        caches: state.caches.stats().await,
    })
}

/// Handler for POST /invalidate
///
/// Removes entries whose key contains the tag from every cache.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.caches.invalidate(&req.tag).await;
    Ok(Json(InvalidateResponse {
        tag: req.tag,
        removed,
    }))
}

/// Handler for DELETE /caches/:name
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache: CacheName = name.parse()?;
    state.caches.clear(cache).await;

    Ok(Json(ClearResponse::new(cache)))
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    let removed = state.caches.sweep().await;
    Json(SweepResponse { removed })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
