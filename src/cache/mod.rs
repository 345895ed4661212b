//! Cache Module
//!
//! Bounded in-memory caches with TTL expiry and hybrid recency/frequency
//! eviction, plus key construction for structured lookups.

mod entry;
pub mod keys;
mod memoize;
mod recommendation;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use keys::{
    category_tag, graph_query_key, product_tag, recommendation_key, request_fingerprint,
    GraphQueryKind, KeyBuilder, PriceRange, RecommendationContext, UserProfile,
};
pub use memoize::{memoize, Memoized};
pub use recommendation::{RecommendationCache, ScoredProduct};
pub use shared::SharedCache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{BoundedCache, ENTRY_OVERHEAD_BYTES, FALLBACK_ENTRY_SIZE};
