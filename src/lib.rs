//! Storefront Cache - bounded in-memory caches for a storefront
//!
//! Provides expiring caches with hybrid recency/frequency eviction for
//! recommendation lists, API responses and graph query results, plus an
//! admin HTTP surface for statistics and invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod tasks;

pub use api::AppState;
pub use cache::{memoize, BoundedCache, RecommendationCache, SharedCache};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
pub use registry::{CacheName, StorefrontCaches};
pub use tasks::spawn_sweep_task;
