//! Recommendation Cache Module
//!
//! Caches scored product lists keyed by shopper profile, page context and
//! request parameters.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::keys::{category_tag, product_tag, recommendation_key};
use crate::cache::{RecommendationContext, SharedCache, StatsSnapshot, UserProfile};
use crate::config::CacheConfig;

/// One recommended product with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product_id: String,
    pub score: f64,
    /// Why the product was picked, e.g. `frequently_bought_together`
    pub reason: String,
}

impl ScoredProduct {
    pub fn new(product_id: impl Into<String>, score: f64, reason: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            score,
            reason: reason.into(),
        }
    }
}

/// Recommendation lists cached under [`recommendation_key`].
#[derive(Debug, Clone)]
pub struct RecommendationCache {
    inner: SharedCache<String, Vec<ScoredProduct>>,
}

impl RecommendationCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: SharedCache::new(config),
        }
    }

    pub async fn get<'a, I, S>(
        &self,
        profile: &UserProfile,
        context: &RecommendationContext,
        params: I,
    ) -> Option<Vec<ScoredProduct>>
    where
        I: IntoIterator<Item = (S, &'a Value)>,
        S: AsRef<str>,
    {
        let key = recommendation_key(profile, context, params);
        self.inner.get(&key).await
    }

    pub async fn set<'a, I, S>(
        &self,
        profile: &UserProfile,
        context: &RecommendationContext,
        params: I,
        products: Vec<ScoredProduct>,
        ttl: Option<Duration>,
    ) where
        I: IntoIterator<Item = (S, &'a Value)>,
        S: AsRef<str>,
    {
        let key = recommendation_key(profile, context, params);
        self.inner.set(key, products, ttl).await;
    }

    // == Get Or Compute ==
    /// Returns the cached list, or runs `compute` and caches its `Ok` result.
    pub async fn get_or_compute<'a, I, S, F, Fut, E>(
        &self,
        profile: &UserProfile,
        context: &RecommendationContext,
        params: I,
        compute: F,
    ) -> Result<Vec<ScoredProduct>, E>
    where
        I: IntoIterator<Item = (S, &'a Value)>,
        S: AsRef<str>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ScoredProduct>, E>>,
    {
        let key = recommendation_key(profile, context, params);
        debug!(key = %key, "recommendation lookup");
        self.inner.get_or_try_insert_with(key, None, compute).await
    }

    // == Invalidation ==
    /// Drops every cached list whose key mentions `product_id`.
    pub async fn invalidate_product(&self, product_id: &str) -> usize {
        let removed = self.inner.invalidate_matching(&product_tag(product_id)).await;
        info!(product_id, removed, "invalidated recommendations for product");
        removed
    }

    /// Drops every cached list whose key mentions `category`.
    pub async fn invalidate_category(&self, category: &str) -> usize {
        let removed = self.inner.invalidate_matching(&category_tag(category)).await;
        info!(category, removed, "invalidated recommendations for category");
        removed
    }

    pub async fn invalidate_matching(&self, tag: &str) -> usize {
        self.inner.invalidate_matching(tag).await
    }

    pub async fn clear(&self) {
        self.inner.clear().await;
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.stats().await
    }

    pub fn shared(&self) -> &SharedCache<String, Vec<ScoredProduct>> {
        &self.inner
    }
}
