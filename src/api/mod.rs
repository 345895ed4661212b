//! API Module
//!
//! HTTP handlers and routing for the cache admin/diagnostics API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Per-cache statistics
//! - `POST /invalidate` - Tag-based invalidation across caches
//! - `DELETE /caches/:name` - Clear one cache
//! - `POST /sweep` - Force an expiry sweep

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
