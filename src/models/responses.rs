//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::StatsSnapshot;
use crate::registry::CacheName;

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// One snapshot per cache, keyed by cache name
    pub caches: BTreeMap<CacheName, StatsSnapshot>,
}

/// Response body for POST /invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub tag: String,
    /// Entries removed across all caches
    pub removed: usize,
}

/// Response body for DELETE /caches/:name
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub cache: CacheName,
    pub message: String,
}

impl ClearResponse {
    pub fn new(cache: CacheName) -> Self {
        Self {
            message: format!("Cache '{}' cleared", cache),
            cache,
        }
    }
}

/// Response body for POST /sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    /// Expired entries removed across all caches
    pub removed: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
